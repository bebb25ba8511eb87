use super::{IdentityProvider, IdpConfig, TokenResponse, TokenSet, UserClaims};
use crate::{Error, APP_USER_AGENT};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

/// Longest slice of an IdP error body kept for logs.
const MAX_ERROR_DETAIL: usize = 256;

/// `reqwest`-backed [`IdentityProvider`].
#[derive(Debug)]
pub struct HttpIdentityProvider {
    config: IdpConfig,
    http: Client,
}

impl HttpIdentityProvider {
    /// Build the provider with a client bound to the configured timeout.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: IdpConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &IdpConfig {
        &self.config
    }

    async fn ensure_success(response: Response, operation: &'static str) -> Result<Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                format!("token rejected ({status})")
            }
            _ => format!("{status}: {}", truncate(&body, MAX_ERROR_DETAIL)),
        };
        Err(Error::upstream(operation, Some(status.as_u16()), detail))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn authorization_url(&self, redirect_uri: &Url, state: &str) -> Result<Url, Error> {
        let mut url = self.config.authorize_endpoint()?;
        let scope = self.config.scopes().join(" ");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("state", state);
        Ok(url)
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str, redirect_uri: &Url) -> Result<TokenSet, Error> {
        const OPERATION: &str = "token exchange";

        let endpoint = self.config.token_endpoint()?;
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id()),
            ("client_secret", self.config.client_secret().expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
        ];

        debug!("token endpoint: {}", endpoint);

        let response = self
            .http
            .post(endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|source| classify(OPERATION, source))?;

        let response = Self::ensure_success(response, OPERATION).await?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|source| classify(OPERATION, source))?;

        TokenSet::from_response(body, Utc::now())
    }

    #[instrument(skip(self, access_token))]
    async fn fetch_user_claims(&self, access_token: &SecretString) -> Result<UserClaims, Error> {
        const OPERATION: &str = "userinfo request";

        let endpoint = self.config.userinfo_endpoint()?;

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|source| classify(OPERATION, source))?;

        let response = Self::ensure_success(response, OPERATION).await?;
        let claims: UserClaims = response
            .json()
            .await
            .map_err(|source| classify(OPERATION, source))?;

        claims.validate()
    }

    fn logout_url(&self, return_to: &Url) -> Result<Url, Error> {
        let mut url = self.config.logout_endpoint()?;
        url.query_pairs_mut()
            .append_pair("returnTo", return_to.as_str())
            .append_pair("client_id", self.config.client_id());
        Ok(url)
    }
}

/// Split transport failures from responses the IdP actually sent.
fn classify(operation: &'static str, source: reqwest::Error) -> Error {
    if source.is_decode() || source.is_status() {
        Error::upstream(operation, source.status().map(|s| s.as_u16()), "malformed response body")
    } else {
        Error::Network { operation, source }
    }
}

fn truncate(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
