//! Game Jolt request signing.
//!
//! Every call is a URL of the form
//!
//! ```text
//! http://gamejolt.com/api/game/v1_1/<path>?game_id=<id>&<k>=<v>...&user_token=<token>&signature=<md5>
//! ```
//!
//! where the signature is the lowercase hex MD5 of everything before
//! `&signature=` followed by the game's private key.
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use bytes::Bytes;
use gamejolt_core::hash::hex_md5_with_secret;
use gamejolt_core::utils::{redact_url, Redact};
use gamejolt_core::{Error, Result};
use http::header::CONTENT_TYPE;
use http::Method;
use log::debug;

use crate::constants::*;
use crate::credential::Credential;
use crate::Format;

/// One call to the API before it is signed.
///
/// Parameters are kept sorted by name, so the same request always produces
/// the same URL and signature.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    params: BTreeMap<String, String>,
    form: Option<BTreeMap<String, String>>,
    requires_verification: bool,
}

impl ApiRequest {
    /// Create a request for `path`, e.g. `scores/` or `data-store/set`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
            form: None,
            requires_verification: false,
        }
    }

    /// Add a query parameter, replacing any previous value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add a form field to the body. Requests with a body are sent as `POST`.
    ///
    /// Form fields are not covered by the signature.
    pub fn with_form(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.form
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.to_string());
        self
    }

    /// Mark the request as acting on behalf of the verified user.
    pub fn with_verification(mut self) -> Self {
        self.requires_verification = true;
        self
    }

    /// Method path of the request.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value of the query parameter `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Value of the form field `key`.
    pub fn form(&self, key: &str) -> Option<&str> {
        self.form.as_ref()?.get(key).map(String::as_str)
    }

    /// Check whether the request needs a verified user.
    pub fn requires_verification(&self) -> bool {
        self.requires_verification
    }

    /// Check whether the request is sent as `POST`.
    pub fn is_post(&self) -> bool {
        self.form.is_some()
    }

    /// Attach the verified user to a request that needs one.
    ///
    /// The user is attached as a pair: when the caller already gave
    /// `username` or `user_token`, both are left as given. Without a
    /// verified user the request fails with
    /// [`ErrorKind::AuthenticationRequired`](gamejolt_core::ErrorKind::AuthenticationRequired)
    /// before anything is sent.
    pub fn authorize(&mut self, verified: Option<&Credential>) -> Result<()> {
        if !self.requires_verification {
            return Ok(());
        }

        let cred = verified.ok_or_else(|| {
            debug!("{} needs a verified user", self.path);
            Error::authentication_required()
        })?;
        if self.params.contains_key(PARAM_USERNAME) || self.params.contains_key(PARAM_USER_TOKEN) {
            return Ok(());
        }
        self.params
            .insert(PARAM_USERNAME.to_string(), cred.username.clone());
        self.params
            .insert(PARAM_USER_TOKEN.to_string(), cred.token.clone());
        Ok(())
    }
}

impl Debug for ApiRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let params: BTreeMap<_, _> = self
            .params
            .iter()
            .map(|(k, v)| {
                let v = if k == PARAM_USER_TOKEN {
                    format!("{:?}", Redact::from(v))
                } else {
                    v.clone()
                };
                (k.as_str(), v)
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("path", &self.path)
            .field("params", &params)
            .field("form", &self.form)
            .field("requires_verification", &self.requires_verification)
            .finish()
    }
}

/// RequestSigner turns [`ApiRequest`]s into signed HTTP requests for one game.
#[derive(Clone)]
pub struct RequestSigner {
    endpoint: String,
    api_version: String,
    game_id: String,
    private_key: String,
}

impl RequestSigner {
    /// Create a signer for the game, talking to the public endpoint.
    pub fn new(game_id: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            game_id: game_id.into(),
            private_key: private_key.into(),
        }
    }

    /// Use another endpoint, e.g. a staging host. It must end with `/`.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use another API version, e.g. `1_2`.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// The API version requests are sent to.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build the string the signature is computed over.
    ///
    /// `format` is added unless the request names one. Values are form
    /// encoded, except the user token which always comes last and as is.
    pub fn canonical_url(&self, req: &ApiRequest, format: Format) -> String {
        let mut url = format!(
            "{}v{}/{}?{}={}",
            self.endpoint, self.api_version, req.path, PARAM_GAME_ID, self.game_id
        );

        let mut params: BTreeMap<&str, &str> = req
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        params.entry(PARAM_FORMAT).or_insert(format.as_str());

        let user_token = params.remove(PARAM_USER_TOKEN);
        for (k, v) in params {
            if k == PARAM_GAME_ID || k == PARAM_SIGNATURE {
                debug!("ignoring reserved parameter `{k}`");
                continue;
            }
            url.push('&');
            url.push_str(k);
            url.push('=');
            url.extend(form_urlencoded::byte_serialize(v.as_bytes()));
        }
        if let Some(token) = user_token {
            url.push('&');
            url.push_str(PARAM_USER_TOKEN);
            url.push('=');
            url.push_str(token);
        }

        url
    }

    /// Compute the signature of a canonical URL.
    pub fn signature(&self, canonical_url: &str) -> String {
        hex_md5_with_secret(canonical_url, &self.private_key)
    }

    /// Build the final URL: the canonical URL followed by its signature.
    pub fn signed_url(&self, req: &ApiRequest, format: Format) -> String {
        let canonical = self.canonical_url(req, format);
        let signature = self.signature(&canonical);
        format!("{canonical}&{PARAM_SIGNATURE}={signature}")
    }

    /// Build the HTTP request for `req`.
    ///
    /// Requests with form fields become a `POST` with an urlencoded body,
    /// everything else a `GET`.
    pub fn build(&self, req: &ApiRequest, format: Format) -> Result<http::Request<Bytes>> {
        let url = self.signed_url(req, format);
        debug!("signed request: {}", redact_url(&url));

        let builder = http::Request::builder();
        let request = match &req.form {
            Some(form) => {
                let body = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(form)
                    .finish();
                builder
                    .method(Method::POST)
                    .uri(url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Bytes::from(body))?
            }
            None => builder.method(Method::GET).uri(url).body(Bytes::new())?,
        };

        Ok(request)
    }
}

impl Debug for RequestSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("game_id", &self.game_id)
            .field("private_key", &Redact::from(&self.private_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamejolt_core::hash::hex_md5;
    use gamejolt_core::ErrorKind;
    use pretty_assertions::assert_eq;

    fn signer() -> RequestSigner {
        RequestSigner::new("1234", "secret")
    }

    fn query(url: &str) -> Vec<(String, String)> {
        let (_, query) = url.split_once('?').unwrap();
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn test_canonical_url() {
        let req = ApiRequest::new("scores/").with_param("limit", 10);

        assert_eq!(
            signer().canonical_url(&req, Format::Json),
            "http://gamejolt.com/api/game/v1_1/scores/?game_id=1234&format=json&limit=10"
        );
    }

    #[test]
    fn test_params_round_trip() {
        let req = ApiRequest::new("data-store/")
            .with_param("b", "x y")
            .with_param("a", "1");

        let url = signer().canonical_url(&req, Format::Keypair);
        assert!(url.contains("&b=x+y"));
        assert_eq!(
            query(&url),
            vec![
                ("game_id".to_string(), "1234".to_string()),
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "x y".to_string()),
                ("format".to_string(), "keypair".to_string()),
            ]
        );
    }

    #[test]
    fn test_explicit_format_is_kept() {
        let req = ApiRequest::new("data-store/").with_param("format", "dump");

        let url = signer().canonical_url(&req, Format::Xml);
        assert!(url.ends_with("&format=dump"));
        assert!(!url.contains("format=xml"));
    }

    #[test]
    fn test_user_token_is_last_and_once() {
        let mut req = ApiRequest::new("trophies/")
            .with_param("achieved", "true")
            .with_param("zzz", "last?")
            .with_verification();
        req.authorize(Some(&Credential::new("CROS", "t0k3n"))).unwrap();

        let url = signer().canonical_url(&req, Format::Keypair);
        assert!(url.ends_with("&user_token=t0k3n"));
        assert_eq!(url.matches("user_token=").count(), 1);
        assert!(url.contains("&username=CROS"));
    }

    #[test]
    fn test_signature() {
        let req = ApiRequest::new("get-time/");
        let s = signer();

        let canonical = s.canonical_url(&req, Format::Keypair);
        let signed = s.signed_url(&req, Format::Keypair);
        let expected = hex_md5(format!("{canonical}secret").as_bytes());

        assert_eq!(signed, format!("{canonical}&signature={expected}"));
        assert_eq!(expected.len(), 32);
        assert!(expected.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_authorize() {
        let mut req = ApiRequest::new("sessions/open/").with_verification();
        assert_eq!(
            req.authorize(None).unwrap_err().kind(),
            ErrorKind::AuthenticationRequired
        );

        let mut req = ApiRequest::new("users/auth/")
            .with_param("username", "other")
            .with_verification();
        req.authorize(Some(&Credential::new("CROS", "t0k3n"))).unwrap();
        assert_eq!(req.param("username"), Some("other"));
        assert_eq!(req.param("user_token"), None);

        let mut req = ApiRequest::new("users/auth/")
            .with_param("username", "other")
            .with_param("user_token", "other-token")
            .with_verification();
        req.authorize(Some(&Credential::new("CROS", "t0k3n"))).unwrap();
        assert_eq!(req.param("username"), Some("other"));
        assert_eq!(req.param("user_token"), Some("other-token"));

        let mut req = ApiRequest::new("sessions/open/").with_verification();
        req.authorize(Some(&Credential::new("CROS", "t0k3n"))).unwrap();
        assert_eq!(req.param("username"), Some("CROS"));
        assert_eq!(req.param("user_token"), Some("t0k3n"));

        let mut req = ApiRequest::new("get-time/");
        req.authorize(None).unwrap();
        assert_eq!(req.param("username"), None);
    }

    #[test]
    fn test_build_post() {
        let req = ApiRequest::new("data-store/set")
            .with_param("key", "save")
            .with_form("data", "a&b=c");
        let http_req = signer().build(&req, Format::Keypair).unwrap();

        assert_eq!(*http_req.method(), Method::POST);
        assert_eq!(
            http_req.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(&http_req.body()[..], b"data=a%26b%3Dc");
        assert!(!http_req.uri().to_string().contains("data="));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut req = ApiRequest::new("trophies/").with_verification();
        req.authorize(Some(&Credential::new("CROS", "0123456789abcdef"))).unwrap();

        assert!(!format!("{req:?}").contains("0123456789abcdef"));
        assert!(!format!("{:?}", RequestSigner::new("1", "0123456789abcdef")).contains("0123456789abcdef"));
    }
}
