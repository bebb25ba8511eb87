use crate::Error;
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw token endpoint response.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Tokens issued by the code exchange.
///
/// Held server-side only; `Debug` output is redacted and the type is not
/// serializable, so it cannot end up in a response body.
#[derive(Clone, Debug)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub id_token: Option<SecretString>,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

impl TokenSet {
    /// Build a token set with only an access token (bearer, no expiry).
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            id_token: None,
            token_type: default_token_type(),
            expires_at: None,
            scope: None,
        }
    }

    /// Convert a token endpoint response, anchoring `expires_in` at `issued_at`.
    ///
    /// # Errors
    /// Returns [`Error::UpstreamAuth`] if the access token is empty.
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Result<Self, Error> {
        if response.access_token.trim().is_empty() {
            return Err(Error::upstream(
                "token exchange",
                None,
                "token response has an empty access_token",
            ));
        }

        let expires_at = response
            .expires_in
            .filter(|seconds| *seconds > 0)
            .and_then(Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl));

        Ok(Self {
            access_token: SecretString::from(response.access_token),
            id_token: response.id_token.map(SecretString::from),
            token_type: response.token_type,
            expires_at,
            scope: response.scope,
        })
    }
}

/// Identity claims from the IdP userinfo endpoint.
#[derive(ToSchema, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Stable subject identifier (`sub`).
    #[serde(rename = "sub", default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "picture", default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl UserClaims {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            name: None,
            email: None,
            picture_url: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_picture_url(mut self, picture_url: impl Into<String>) -> Self {
        self.picture_url = Some(picture_url.into());
        self
    }

    /// A claims set without a subject cannot identify anyone.
    ///
    /// # Errors
    /// Returns [`Error::UpstreamAuth`] if `sub` is missing or blank.
    pub fn validate(self) -> Result<Self, Error> {
        if self.subject.trim().is_empty() {
            return Err(Error::upstream(
                "userinfo request",
                None,
                "userinfo response is missing sub",
            ));
        }
        Ok(self)
    }
}
