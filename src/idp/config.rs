use crate::Error;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

const DEFAULT_SCOPES: &str = "openid profile email";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

const AUTHORIZE_PATH: &str = "/authorize";
const TOKEN_PATH: &str = "/oauth/token";
const USERINFO_PATH: &str = "/userinfo";
const LOGOUT_PATH: &str = "/v2/logout";

/// IdP registration for this gateway.
///
/// Required fields are constructor parameters; optional ones use `with_*`.
#[derive(Clone, Debug)]
pub struct IdpConfig {
    base_url: Url,
    client_id: String,
    client_secret: SecretString,
    scopes: Vec<String>,
    timeout: Duration,
}

impl IdpConfig {
    /// Create a config from the IdP base URL and client credentials.
    ///
    /// A bare domain (`tenant.example.com`) is accepted and served over `https`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the base URL or client ID is empty,
    /// or the base URL cannot be parsed.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, Error> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(Error::Configuration("IdP base URL is required".to_string()));
        }

        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(Error::Configuration("IdP client ID is required".to_string()));
        }

        let base_url = normalize_base_url(base_url);
        let base_url = Url::parse(&base_url)
            .map_err(|e| Error::Configuration(format!("invalid IdP base URL {base_url}: {e}")))?;
        if base_url.host_str().is_none() {
            return Err(Error::Configuration(format!(
                "IdP base URL must include a host: {base_url}"
            )));
        }

        Ok(Self {
            base_url,
            client_id,
            client_secret,
            scopes: DEFAULT_SCOPES.split(' ').map(ToString::to_string).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        })
    }

    /// Override the requested scopes (default: `openid profile email`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Override the outbound request timeout (default: 10s).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn authorize_endpoint(&self) -> Result<Url, Error> {
        self.endpoint(AUTHORIZE_PATH)
    }

    pub(crate) fn token_endpoint(&self) -> Result<Url, Error> {
        self.endpoint(TOKEN_PATH)
    }

    pub(crate) fn userinfo_endpoint(&self) -> Result<Url, Error> {
        self.endpoint(USERINFO_PATH)
    }

    pub(crate) fn logout_endpoint(&self) -> Result<Url, Error> {
        self.endpoint(LOGOUT_PATH)
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| Error::Configuration(format!("invalid IdP endpoint {path}: {e}")))
    }
}

fn normalize_base_url(base_url: &str) -> String {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("https://{}", base_url.trim_end_matches('/'))
    }
}
