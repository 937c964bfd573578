use std::fmt::{Debug, Formatter};

use gamejolt_core::utils::Redact;
use gamejolt_core::{Context, Error, Result};
use log::warn;

use crate::constants::*;
use crate::sign_request::RequestSigner;
use crate::Format;

/// Config carries all the configuration of a Game Jolt client.
#[derive(Clone, Default)]
pub struct Config {
    /// `game_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GAMEJOLT_GAME_ID`]
    pub game_id: Option<String>,
    /// `private_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GAMEJOLT_PRIVATE_KEY`]
    pub private_key: Option<String>,
    /// `api_version` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GAMEJOLT_API_VERSION`]
    /// - default to `1_1`
    pub api_version: Option<String>,
    /// `format` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GAMEJOLT_FORMAT`]
    /// - default to [`Format::Keypair`]
    pub format: Option<Format>,
    /// `credentials_file` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GAMEJOLT_CREDENTIALS_FILE`]
    /// - default to `gjapi-credentials.txt`
    pub credentials_file: Option<String>,
    /// Endpoint of the API, default to `http://gamejolt.com/api/game/`.
    pub endpoint: Option<String>,
    /// Log every request, raw response and failure.
    pub verbose: bool,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set game_id
    pub fn with_game_id(mut self, game_id: impl ToString) -> Self {
        self.game_id = Some(game_id.to_string());
        self
    }

    /// Set private_key
    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    /// Set api_version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Set format
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Set credentials_file
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set verbose
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(GAMEJOLT_GAME_ID) {
            self.game_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(GAMEJOLT_PRIVATE_KEY) {
            self.private_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(GAMEJOLT_API_VERSION) {
            self.api_version.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(GAMEJOLT_FORMAT) {
            match v.parse::<Format>() {
                Ok(format) => {
                    self.format.get_or_insert(format);
                }
                Err(err) => warn!("ignoring {GAMEJOLT_FORMAT}: {err}"),
            }
        }
        if let Some(v) = ctx.env_var(GAMEJOLT_CREDENTIALS_FILE) {
            self.credentials_file.get_or_insert(v);
        }

        self
    }

    /// Build the request signer for the configured game.
    ///
    /// Fails when the game id or the private key is missing or blank.
    pub fn signer(&self) -> Result<RequestSigner> {
        let game_id = required(&self.game_id, "game_id")?;
        let private_key = required(&self.private_key, "private_key")?;

        let mut signer = RequestSigner::new(game_id, private_key);
        if let Some(endpoint) = &self.endpoint {
            signer = signer.with_endpoint(endpoint);
        }
        if let Some(version) = &self.api_version {
            signer = signer.with_api_version(version);
        }
        Ok(signer)
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::config_invalid(format!("{name} is required"))),
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("game_id", &self.game_id)
            .field("private_key", &self.private_key.as_ref().map(Redact::from))
            .field("api_version", &self.api_version)
            .field("format", &self.format)
            .field("credentials_file", &self.credentials_file)
            .field("endpoint", &self.endpoint)
            .field("verbose", &self.verbose)
            .finish()
    }
}
