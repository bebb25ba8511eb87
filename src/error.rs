//! Error taxonomy for the authentication flow.
//!
//! Every variant maps to a fixed HTTP status; response bodies are generic so
//! that IdP payloads and token material never reach the browser.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required IdP setting is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The callback `state` is missing, unknown, already consumed or expired.
    #[error("invalid or expired authorization state")]
    InvalidState,

    /// The callback matched a pending request but carried no `code`.
    #[error("authorization callback is missing the code parameter")]
    MissingCode,

    /// The IdP redirected back with an `error` parameter.
    #[error("authorization denied by identity provider: {0}")]
    AuthorizationDenied(String),

    /// The IdP answered, but rejected the call or returned an unusable body.
    #[error("identity provider rejected {operation}: {detail}")]
    UpstreamAuth {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    /// Transport failure talking to the IdP (timeout, DNS, connect, TLS).
    #[error("network error during {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The pending login table is full.
    #[error("too many logins in progress (limit {limit})")]
    TooManyPendingLogins { limit: usize },

    #[error("session store error: {0}")]
    SessionStore(String),
}

impl Error {
    pub(crate) fn upstream(operation: &'static str, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::UpstreamAuth {
            operation,
            status,
            detail: detail.into(),
        }
    }

    /// Status code returned to the browser for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidState | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
            Self::UpstreamAuth { .. } | Self::Network { .. } => StatusCode::BAD_GATEWAY,
            Self::TooManyPendingLogins { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Configuration(_) | Self::SessionStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::InvalidState | Self::MissingCode => {
                warn!(error = %self, "Rejected authorization callback");
                "Invalid authorization callback"
            }
            Self::AuthorizationDenied(_) => {
                warn!(error = %self, "Authorization denied");
                "Authorization denied"
            }
            Self::UpstreamAuth { .. } | Self::Network { .. } => {
                warn!(error = %self, "Authentication failed");
                "Authentication failed"
            }
            Self::TooManyPendingLogins { .. } => {
                warn!(error = %self, "Login rejected");
                "Too many logins in progress, try again later"
            }
            Self::Configuration(_) | Self::SessionStore(_) => {
                error!(error = %self, "Auth internal error");
                "Internal error"
            }
        };
        (status, message).into_response()
    }
}
