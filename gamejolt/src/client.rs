use gamejolt_core::utils::redact_url;
use gamejolt_core::{Context, Error, ProvideCredential, Result};
use log::{debug, info, warn};

use crate::constants::*;
use crate::credential::Credential;
use crate::data_store::{DataStoreOperation, DataStoreRecord, DataStoreScope};
use crate::highscore::{Highscore, HighscoreTable, NewHighscore};
use crate::parser::{ensure_successful, parse_dump, ResponseParser};
use crate::provide_credential::QuickPlayCredentialProvider;
use crate::server_time::ServerTime;
use crate::sign_request::{ApiRequest, RequestSigner};
use crate::trophy::{Trophy, TrophyFilter};
use crate::user::User;
use crate::{Config, Format};

/// Client for the Game Jolt game API.
///
/// The client owns the session of one player: the user verified with
/// [`Client::verify`] is attached to every call that acts on their behalf.
/// Calls that need a verified user return their failure value right away,
/// without touching the network, while nobody is verified.
///
/// Every operation sends exactly one request and waits for its response,
/// except [`Client::get_data_store_records`]. Failures of any kind are
/// reported as `None`, `false` or `-1`; enable [`Config::verbose`] to have
/// them logged at `warn` level, they are logged at `debug` level otherwise.
#[derive(Debug)]
pub struct Client {
    ctx: Context,
    signer: RequestSigner,
    format: Format,
    verbose: bool,
    quick_play_provider: QuickPlayCredentialProvider,
    quick_play: Option<Credential>,
    verified: Option<Credential>,
}

impl Client {
    /// Create a client for the game described by `config`.
    ///
    /// Fails when the game id or the private key is missing. The quick play
    /// credentials file is not read: use [`Client::load`] for that.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let signer = config.signer()?;

        let mut quick_play_provider = QuickPlayCredentialProvider::new();
        if let Some(path) = &config.credentials_file {
            quick_play_provider = quick_play_provider.with_credentials_file(path);
        }

        Ok(Self {
            ctx,
            signer,
            format: config.format.unwrap_or_default(),
            verbose: config.verbose,
            quick_play_provider,
            quick_play: None,
            verified: None,
        })
    }

    /// Create a client and read the quick play credentials file.
    ///
    /// A missing or incomplete file is not an error, [`Client::has_quick_play`]
    /// then returns `false`.
    pub async fn load(ctx: Context, config: Config) -> Result<Self> {
        let mut client = Self::new(ctx, config)?;
        client.reload_quick_play().await;
        Ok(client)
    }

    /// The format responses are requested and parsed in.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Switch the response format. Takes effect from the next call.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// The API version requests are sent to.
    pub fn api_version(&self) -> &str {
        self.signer.api_version()
    }

    /// Switch the API version, e.g. `1_2`.
    pub fn set_api_version(&mut self, version: impl Into<String>) {
        self.signer = self.signer.clone().with_api_version(version);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Check whether a user is verified.
    pub fn is_verified(&self) -> bool {
        self.verified.is_some()
    }

    /// Credential of the verified user.
    pub fn verified_credential(&self) -> Option<&Credential> {
        self.verified.as_ref()
    }

    fn parser(&self) -> &'static dyn ResponseParser {
        self.format.parser()
    }

    /// Sign and send `req`, returning the raw response text.
    ///
    /// The verified user is attached when `req` asks for it. This is the
    /// building block of every other operation and can be used to reach API
    /// methods the client does not wrap.
    pub async fn request(&self, req: ApiRequest) -> Result<String> {
        let mut req = req;
        req.authorize(self.verified.as_ref())?;

        let http_req = self.signer.build(&req, self.format)?;
        let url = redact_url(&http_req.uri().to_string());
        if self.verbose {
            info!("{} {url}", http_req.method());
        }

        let raw = self.ctx.http_send_as_string(http_req).await?;
        if self.verbose {
            info!("response of {}: {raw}", req.path());
        } else {
            debug!("response of {}: {raw}", req.path());
        }
        Ok(raw)
    }

    /// Send `req` and read the response with `parse`.
    async fn fetch<T>(&self, req: ApiRequest, parse: impl FnOnce(&str) -> Result<T>) -> Result<T> {
        let raw = self.request(req).await?;
        parse(&raw)
    }

    /// Send `req` and check the success flag of the response.
    async fn request_successful(&self, req: ApiRequest) -> Result<()> {
        let raw = self.request(req).await?;
        ensure_successful(self.parser(), &raw)
    }

    /// Turn a failed call into its failure value, logging why.
    fn settle<T>(&self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(err) => {
                self.report(what, &err);
                None
            }
        }
    }

    fn report(&self, what: &str, err: &Error) {
        if self.verbose {
            warn!("could not {what}: {err:?}");
        } else {
            debug!("could not {what}: {err:?}");
        }
    }

    /// Verify a user with their name and game token.
    ///
    /// The previous user, if any, is forgotten first: after a failed attempt
    /// nobody is verified.
    pub async fn verify(&mut self, username: &str, token: &str) -> bool {
        self.verified = None;

        let req = ApiRequest::new("users/auth/")
            .with_param(PARAM_USERNAME, username)
            .with_param(PARAM_USER_TOKEN, token);
        let result = self.request_successful(req).await;
        if self.settle("verify user", result).is_none() {
            return false;
        }

        debug!("verified user {username}");
        self.verified = Some(Credential::new(username, token));
        true
    }

    /// Verify the user given by `provider`.
    ///
    /// Nobody is verified afterwards when the provider has no complete
    /// credential.
    pub async fn verify_with<P>(&mut self, provider: &P) -> bool
    where
        P: ProvideCredential<Credential = Credential>,
    {
        self.verified = None;

        let result = provider.provide_credential(&self.ctx).await;
        match self.settle("load user credential", result).flatten() {
            Some(cred) if cred.is_valid() => self.verify(&cred.username, &cred.token).await,
            _ => {
                debug!("no user credential to verify with");
                false
            }
        }
    }

    /// Check whether quick play credentials are loaded.
    pub fn has_quick_play(&self) -> bool {
        self.quick_play.is_some()
    }

    /// Credentials read from the quick play file.
    pub fn quick_play_credential(&self) -> Option<&Credential> {
        self.quick_play.as_ref()
    }

    /// Read the quick play credentials file again.
    ///
    /// The verified user is forgotten. Returns whether credentials were found.
    pub async fn reload_quick_play(&mut self) -> bool {
        self.verified = None;

        let result = self
            .quick_play_provider
            .provide_credential(&self.ctx)
            .await;
        self.quick_play = self.settle("load quick play credentials", result).flatten();
        self.quick_play.is_some()
    }

    /// Verify the quick play user.
    pub async fn verify_quick_play(&mut self) -> bool {
        let Some(cred) = self.quick_play.clone() else {
            debug!("no quick play credentials loaded");
            return false;
        };
        self.verify(&cred.username, &cred.token).await
    }

    /// Look up the quick play user, with their token attached.
    pub async fn quick_play_user(&self) -> Option<User> {
        let cred = self.quick_play.as_ref()?;
        let user = self.get_user(&cred.username).await?;
        Some(user.with_token(&cred.token))
    }

    /// Look up the verified user, with their token attached.
    pub async fn verified_user(&self) -> Option<User> {
        let Some(cred) = self.verified.as_ref() else {
            self.report("get the verified user", &Error::authentication_required());
            return None;
        };
        let user = self.get_user(&cred.username).await?;
        Some(user.with_token(&cred.token))
    }

    /// Look up a user by name.
    pub async fn get_user(&self, username: &str) -> Option<User> {
        let req = ApiRequest::new("users/").with_param(PARAM_USERNAME, username);
        self.fetch_user(req).await
    }

    /// Look up a user by id.
    pub async fn get_user_by_id(&self, user_id: u64) -> Option<User> {
        let req = ApiRequest::new("users/").with_param("user_id", user_id);
        self.fetch_user(req).await
    }

    async fn fetch_user(&self, req: ApiRequest) -> Option<User> {
        let result = self.fetch(req, |raw| self.parser().parse_user(raw)).await;
        self.settle("get user", result)
    }

    /// List the trophies of the game as seen by the verified user.
    pub async fn get_trophies(&self, filter: TrophyFilter) -> Option<Vec<Trophy>> {
        let mut req = ApiRequest::new("trophies/").with_verification();
        if let Some(achieved) = filter.as_param() {
            req = req.with_param("achieved", achieved);
        }

        let result = self.fetch(req, |raw| self.parser().parse_trophies(raw)).await;
        self.settle("get trophies", result)
    }

    /// Look up one trophy as seen by the verified user.
    pub async fn get_trophy(&self, trophy_id: u64) -> Option<Trophy> {
        let req = ApiRequest::new("trophies/")
            .with_param("trophy_id", trophy_id)
            .with_verification();

        let result = self.fetch(req, |raw| self.parser().parse_trophies(raw)).await;
        let trophy = self.settle("get trophy", result)?.into_iter().next();
        if trophy.is_none() {
            debug!("no trophy with id {trophy_id}");
        }
        trophy
    }

    /// Give a trophy to the verified user.
    pub async fn achieve_trophy(&self, trophy_id: u64) -> bool {
        let req = ApiRequest::new("trophies/add-achieved")
            .with_param("trophy_id", trophy_id)
            .with_verification();

        let result = self.request_successful(req).await;
        self.settle("achieve trophy", result).is_some()
    }

    /// List highscores of a table; `0` selects the primary table.
    ///
    /// With `all` the best scores of everyone are listed, otherwise only the
    /// scores of the verified user.
    pub async fn get_highscores(
        &self,
        table_id: u64,
        all: bool,
        limit: u32,
    ) -> Option<Vec<Highscore>> {
        let mut req = ApiRequest::new("scores").with_param("limit", limit);
        if table_id != 0 {
            req = req.with_param("table_id", table_id);
        }
        if !all {
            req = req.with_verification();
        }

        let result = self.fetch(req, |raw| self.parser().parse_highscores(raw)).await;
        self.settle("get highscores", result)
    }

    /// List the best 100 highscores of the primary table.
    pub async fn get_top_highscores(&self) -> Option<Vec<Highscore>> {
        self.get_highscores(0, true, DEFAULT_HIGHSCORE_LIMIT).await
    }

    /// Submit a highscore, for the verified user or for a guest.
    pub async fn add_highscore(&self, highscore: &NewHighscore) -> bool {
        let mut req = ApiRequest::new("scores/add")
            .with_param("score", &highscore.score)
            .with_param("sort", highscore.sort)
            .with_param("extra_data", &highscore.extra_data);
        if let Some(table_id) = highscore.table_id {
            req = req.with_param("table_id", table_id);
        }
        req = match &highscore.guest {
            Some(guest) => req.with_param("guest", guest),
            None => req.with_verification(),
        };

        let result = self.request_successful(req).await;
        self.settle("add highscore", result).is_some()
    }

    /// Rank the `sort` value would have in a table; `0` selects the primary
    /// table. Returns `-1` on failure.
    pub async fn get_highscore_rank(&self, sort: i64, table_id: u64) -> i64 {
        let mut req = ApiRequest::new("scores/get-rank").with_param("sort", sort);
        if table_id != 0 {
            req = req.with_param("table_id", table_id);
        }

        let result = self.fetch(req, |raw| self.parser().parse_highscore_rank(raw)).await;
        self.settle("get highscore rank", result)
            .and_then(|rank| i64::try_from(rank).ok())
            .unwrap_or(-1)
    }

    /// List the highscore tables of the game.
    pub async fn get_highscore_tables(&self) -> Option<Vec<HighscoreTable>> {
        let req = ApiRequest::new("scores/tables");

        let result = self.fetch(req, |raw| self.parser().parse_highscore_tables(raw)).await;
        self.settle("get highscore tables", result)
    }

    fn data_store_request(path: &str, scope: DataStoreScope) -> ApiRequest {
        let req = ApiRequest::new(path);
        if scope.requires_verification() {
            req.with_verification()
        } else {
            req
        }
    }

    /// Read one item of the data store.
    pub async fn get_data_store(&self, scope: DataStoreScope, key: &str) -> Option<DataStoreRecord> {
        let req = Self::data_store_request("data-store/", scope)
            .with_param("key", key)
            .with_param(PARAM_FORMAT, FORMAT_DUMP);

        let result = self.fetch(req, parse_dump).await;
        let data = self.settle(&format!("get {scope} data store item `{key}`"), result)?;
        Some(DataStoreRecord::new(key, data, scope))
    }

    /// Store `data` under `key`, replacing what was there.
    ///
    /// The data travels in the request body, so it may be large.
    pub async fn set_data_store(
        &self,
        scope: DataStoreScope,
        key: &str,
        data: &str,
    ) -> Option<DataStoreRecord> {
        let req = Self::data_store_request("data-store/set", scope)
            .with_param("key", key)
            .with_form("data", data);

        let result = self.request_successful(req).await;
        self.settle(&format!("set {scope} data store item `{key}`"), result)?;
        Some(DataStoreRecord::new(key, data, scope))
    }

    /// Apply `operation` with `value` to the item under `key`, returning the
    /// item as stored afterwards.
    pub async fn update_data_store(
        &self,
        scope: DataStoreScope,
        key: &str,
        operation: DataStoreOperation,
        value: impl ToString,
    ) -> Option<DataStoreRecord> {
        let req = Self::data_store_request("data-store/update/", scope)
            .with_param("key", key)
            .with_param("operation", operation.as_str())
            .with_param("value", value)
            .with_param(PARAM_FORMAT, FORMAT_DUMP);

        let result = self.fetch(req, parse_dump).await;
        let data = self.settle(&format!("update {scope} data store item `{key}`"), result)?;
        Some(DataStoreRecord::new(key, data, scope))
    }

    /// Remove the item under `key`. Fails when there is no such item.
    pub async fn remove_data_store(&self, scope: DataStoreScope, key: &str) -> bool {
        let req = Self::data_store_request("data-store/remove", scope).with_param("key", key);

        let result = self.request_successful(req).await;
        self.settle(&format!("remove {scope} data store item `{key}`"), result)
            .is_some()
    }

    /// List the keys of the data store.
    pub async fn get_data_store_keys(&self, scope: DataStoreScope) -> Option<Vec<String>> {
        let req = Self::data_store_request("data-store/get-keys", scope);

        let result = self.fetch(req, |raw| self.parser().parse_data_store_keys(raw)).await;
        self.settle(&format!("get {scope} data store keys"), result)
    }

    /// Read every item of the data store.
    ///
    /// Lists the keys, then reads the items one request at a time. Items that
    /// cannot be read are left out.
    pub async fn get_data_store_records(&self, scope: DataStoreScope) -> Option<Vec<DataStoreRecord>> {
        let keys = self.get_data_store_keys(scope).await?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(record) = self.get_data_store(scope, &key).await {
                records.push(record);
            }
        }
        Some(records)
    }

    /// Open a play session for the verified user.
    pub async fn open_session(&self) -> bool {
        let req = ApiRequest::new("sessions/open/").with_verification();

        let result = self.request_successful(req).await;
        self.settle("open session", result).is_some()
    }

    /// Check whether the verified user has an open play session.
    pub async fn check_session(&self) -> bool {
        let req = ApiRequest::new("sessions/check/").with_verification();

        let result = self.request_successful(req).await;
        self.settle("check session", result).is_some()
    }

    /// Keep the play session open, marking the player active or idle.
    pub async fn ping_session(&self, active: bool) -> bool {
        let status = if active { "active" } else { "idle" };
        let req = ApiRequest::new("sessions/ping/")
            .with_param("status", status)
            .with_verification();

        let result = self.request_successful(req).await;
        self.settle("ping session", result).is_some()
    }

    /// Close the play session of the verified user.
    pub async fn close_session(&self) -> bool {
        let req = ApiRequest::new("sessions/close/").with_verification();

        let result = self.request_successful(req).await;
        self.settle("close session", result).is_some()
    }

    /// Read the time of the Game Jolt servers.
    pub async fn get_server_time(&self) -> Option<ServerTime> {
        let req = ApiRequest::new("get-time");

        let result = self.fetch(req, |raw| self.parser().parse_server_time(raw)).await;
        self.settle("get server time", result)
    }
}
