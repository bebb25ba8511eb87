use crate::auth::AuthFlow;
use std::time::Duration;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    session_ttl: Duration,
    reaper_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            reaper_interval: DEFAULT_REAPER_INTERVAL,
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookie `Max-Age`; keep it equal to the session store TTL.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_reaper_interval(mut self, interval: Duration) -> Self {
        self.reaper_interval = interval;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    #[must_use]
    pub fn reaper_interval(&self) -> Duration {
        self.reaper_interval
    }
}

/// Shared state injected into every handler as `Extension<Arc<GatewayState>>`.
pub struct GatewayState {
    config: GatewayConfig,
    flow: AuthFlow,
}

impl GatewayState {
    #[must_use]
    pub fn new(config: GatewayConfig, flow: AuthFlow) -> Self {
        Self { config, flow }
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn flow(&self) -> &AuthFlow {
        &self.flow
    }

    /// Only mark cookies secure when the callback is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.flow.config().redirect_uri().scheme() == "https"
    }
}
