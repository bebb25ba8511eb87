use super::{pending::DEFAULT_MAX_PENDING, sanitize_return_to, PendingAuthorizations};
use crate::{
    idp::IdentityProvider,
    session::{Session, SessionId, SessionStore},
    Error,
};
use serde::Deserialize;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};
use url::Url;
use utoipa::IntoParams;

const DEFAULT_LANDING_PATH: &str = "/profile";
const DEFAULT_AUTHORIZATION_TTL: Duration = Duration::from_secs(600);

/// Settings for one registered OAuth2 client.
#[derive(Clone, Debug)]
pub struct FlowConfig {
    redirect_uri: Url,
    post_logout_redirect_uri: Url,
    landing_path: String,
    authorization_ttl: Duration,
    max_pending_authorizations: usize,
}

impl FlowConfig {
    /// The post-logout target defaults to the origin of `redirect_uri`.
    #[must_use]
    pub fn new(redirect_uri: Url) -> Self {
        let mut post_logout_redirect_uri = redirect_uri.clone();
        post_logout_redirect_uri.set_path("/");
        post_logout_redirect_uri.set_query(None);
        post_logout_redirect_uri.set_fragment(None);

        Self {
            redirect_uri,
            post_logout_redirect_uri,
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            authorization_ttl: DEFAULT_AUTHORIZATION_TTL,
            max_pending_authorizations: DEFAULT_MAX_PENDING,
        }
    }

    #[must_use]
    pub fn with_post_logout_redirect_uri(mut self, uri: Url) -> Self {
        self.post_logout_redirect_uri = uri;
        self
    }

    /// Non-local paths are ignored.
    #[must_use]
    pub fn with_landing_path(mut self, path: &str) -> Self {
        self.landing_path = sanitize_return_to(Some(path), &self.landing_path);
        self
    }

    #[must_use]
    pub fn with_authorization_ttl(mut self, ttl: Duration) -> Self {
        self.authorization_ttl = ttl;
        self
    }

    /// Cap on logins waiting for their callback.
    #[must_use]
    pub fn with_max_pending_authorizations(mut self, max: usize) -> Self {
        self.max_pending_authorizations = max;
        self
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn post_logout_redirect_uri(&self) -> &Url {
        &self.post_logout_redirect_uri
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    #[must_use]
    pub fn authorization_ttl(&self) -> Duration {
        self.authorization_ttl
    }

    #[must_use]
    pub fn max_pending_authorizations(&self) -> usize {
        self.max_pending_authorizations
    }
}

/// Query parameters the IdP sends back to `/callback`.
#[derive(Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Single-use authorization code.
    pub code: Option<String>,
    /// The `state` issued by `/login`.
    pub state: Option<String>,
    /// Set by the IdP when the user or policy denied the request.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// The code is a one-time credential.
impl fmt::Debug for CallbackParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackParams")
            .field("code", &self.code.as_ref().map(|_| "[REDACTED]"))
            .field("state", &self.state)
            .field("error", &self.error)
            .field("error_description", &self.error_description)
            .finish()
    }
}

#[derive(Debug)]
pub struct LoginRedirect {
    pub authorization_url: Url,
    pub state: String,
}

#[derive(Debug)]
pub struct CompletedLogin {
    pub session_id: SessionId,
    /// Local path to send the browser to.
    pub redirect_to: String,
}

pub struct AuthFlow {
    config: FlowConfig,
    idp: Arc<dyn IdentityProvider>,
    sessions: Arc<dyn SessionStore>,
    pending: PendingAuthorizations,
}

impl AuthFlow {
    #[must_use]
    pub fn new(
        config: FlowConfig,
        idp: Arc<dyn IdentityProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let pending = PendingAuthorizations::new(config.authorization_ttl())
            .with_max_entries(config.max_pending_authorizations());
        Self {
            config,
            idp,
            sessions,
            pending,
        }
    }

    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn pending(&self) -> &PendingAuthorizations {
        &self.pending
    }

    /// Start a login attempt.
    ///
    /// # Errors
    /// [`Error::TooManyPendingLogins`] when the pending table is full,
    /// [`Error::SessionStore`] if no `state` can be generated,
    /// [`Error::Configuration`] if the IdP client is misconfigured.
    #[instrument(skip(self))]
    pub async fn begin_login(&self, return_to: Option<&str>) -> Result<LoginRedirect, Error> {
        let return_to = sanitize_return_to(return_to, self.config.landing_path());
        let state = self
            .pending
            .insert(self.config.redirect_uri().clone(), return_to)
            .await?;

        let authorization_url = match self
            .idp
            .authorization_url(self.config.redirect_uri(), &state)
        {
            Ok(url) => url,
            Err(err) => {
                self.pending.take(&state).await;
                return Err(err);
            }
        };

        debug!("Issued authorization state");
        Ok(LoginRedirect {
            authorization_url,
            state,
        })
    }

    /// Consume the callback and create a session.
    ///
    /// The pending request is removed before any IdP call. Any failure after
    /// that leaves no session behind and the browser must start over.
    ///
    /// # Errors
    /// [`Error::InvalidState`], [`Error::AuthorizationDenied`] and
    /// [`Error::MissingCode`] for bad callbacks; IdP and store errors pass
    /// through unchanged.
    #[instrument(skip(self, params))]
    pub async fn complete_login(&self, params: CallbackParams) -> Result<CompletedLogin, Error> {
        let CallbackParams {
            code,
            state,
            error,
            error_description,
        } = params;

        let state = state.filter(|s| !s.is_empty()).ok_or(Error::InvalidState)?;
        let request = self
            .pending
            .take(&state)
            .await
            .ok_or(Error::InvalidState)?;

        if let Some(error) = error {
            let reason = match error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            };
            return Err(Error::AuthorizationDenied(reason));
        }

        let code = code.filter(|c| !c.is_empty()).ok_or(Error::MissingCode)?;

        let tokens = self
            .idp
            .exchange_code(&code, &request.redirect_uri)
            .await?;
        let claims = self
            .idp
            .fetch_user_claims(&tokens.access_token)
            .await?
            .validate()?;

        let subject = claims.subject.clone();
        let session_id = self.sessions.create(claims, tokens).await?;

        info!(subject = %subject, "User authenticated");
        Ok(CompletedLogin {
            session_id,
            redirect_to: request.return_to,
        })
    }

    /// Destroy the local session, if any, and return the IdP logout URL.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the IdP logout URL cannot be built;
    /// the local session is gone regardless.
    #[instrument(skip(self, session_id))]
    pub async fn logout(&self, session_id: Option<&SessionId>) -> Result<Url, Error> {
        if let Some(id) = session_id {
            self.sessions.destroy(id).await;
            debug!("Local session destroyed");
        }
        self.idp
            .logout_url(self.config.post_logout_redirect_uri())
            .inspect_err(|err| warn!("Failed to build IdP logout URL: {err}"))
    }

    /// Look up a live session and record the access.
    pub async fn resolve(&self, session_id: &SessionId) -> Option<Session> {
        let session = self.sessions.get(session_id).await?;
        if self.sessions.touch(session_id).await {
            Some(session)
        } else {
            None
        }
    }
}
