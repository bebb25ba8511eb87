use crate::{session::generate_opaque_token, Error};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// 128-bit `state` values.
const STATE_BYTES: usize = 16;
const MAX_STATE_ATTEMPTS: usize = 4;
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// One login attempt waiting for its callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub state: String,
    pub redirect_uri: Url,
    pub return_to: String,
    created_at: Instant,
}

impl AuthorizationRequest {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Pending authorization requests keyed by `state`.
///
/// The table is bounded: once `max_entries` live requests exist, new logins
/// are refused until some complete or expire.
pub struct PendingAuthorizations {
    ttl: Duration,
    max_entries: usize,
    requests: Mutex<HashMap<String, AuthorizationRequest>>,
}

impl PendingAuthorizations {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: DEFAULT_MAX_PENDING,
            requests: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Store a new request under a fresh `state` and return it.
    ///
    /// # Errors
    /// Returns [`Error::TooManyPendingLogins`] if the table is full, and
    /// [`Error::SessionStore`] if the OS RNG fails or no unique `state` can be
    /// allocated.
    pub async fn insert(&self, redirect_uri: Url, return_to: String) -> Result<String, Error> {
        let mut requests = self.requests.lock().await;
        requests.retain(|_, request| !request.is_expired(self.ttl));

        if requests.len() >= self.max_entries {
            return Err(Error::TooManyPendingLogins {
                limit: self.max_entries,
            });
        }

        for _ in 0..MAX_STATE_ATTEMPTS {
            let state = generate_opaque_token::<STATE_BYTES>()?;
            if let Entry::Vacant(slot) = requests.entry(state.clone()) {
                slot.insert(AuthorizationRequest {
                    state: state.clone(),
                    redirect_uri,
                    return_to,
                    created_at: Instant::now(),
                });
                return Ok(state);
            }
        }

        Err(Error::SessionStore(
            "failed to allocate a unique authorization state".to_string(),
        ))
    }

    /// Remove and return the request for `state`.
    ///
    /// Lookup and removal happen under one lock, so at most one caller ever
    /// receives a given request. Expired requests are removed and reported as
    /// absent.
    pub async fn take(&self, state: &str) -> Option<AuthorizationRequest> {
        let mut requests = self.requests.lock().await;
        requests
            .remove(state)
            .filter(|request| !request.is_expired(self.ttl))
    }

    /// Drop expired requests, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut requests = self.requests.lock().await;
        let before = requests.len();
        requests.retain(|_, request| !request.is_expired(self.ttl));
        before - requests.len()
    }

    pub async fn len(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
