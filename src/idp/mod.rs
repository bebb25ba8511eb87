//! Identity Provider client.
//!
//! The gateway talks to the IdP through [`IdentityProvider`] so the flow
//! controller can be exercised against an in-process stub. [`HttpIdentityProvider`]
//! is the production implementation over `reqwest`.

mod client;
mod config;
mod types;

pub use client::HttpIdentityProvider;
pub use config::IdpConfig;
pub use types::{TokenResponse, TokenSet, UserClaims};

use crate::Error;
use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;

/// The OAuth2/OIDC operations the gateway needs from an IdP.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the `/authorize` redirect for one login attempt. No network call.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the client ID or base URL is unset.
    fn authorization_url(&self, redirect_uri: &Url, state: &str) -> Result<Url, Error>;

    /// Exchange a single-use authorization code for tokens. Never retried.
    ///
    /// # Errors
    /// [`Error::UpstreamAuth`] on a non-2xx or malformed response,
    /// [`Error::Network`] on transport failure.
    async fn exchange_code(&self, code: &str, redirect_uri: &Url) -> Result<TokenSet, Error>;

    /// Fetch the userinfo claims for an access token.
    ///
    /// # Errors
    /// [`Error::UpstreamAuth`] if the token is rejected or the body lacks `sub`,
    /// [`Error::Network`] on transport failure.
    async fn fetch_user_claims(&self, access_token: &SecretString) -> Result<UserClaims, Error>;

    /// Build the IdP logout redirect that returns the browser to `return_to`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the client ID or base URL is unset.
    fn logout_url(&self, return_to: &Url) -> Result<Url, Error>;
}
