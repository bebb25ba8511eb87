//! Server-side session records and their store.
//!
//! The browser only holds a [`SessionId`]; claims and tokens stay here. The
//! store is injected as `Arc<dyn SessionStore>` so an external backend can
//! replace [`MemorySessionStore`] without touching the flow.

mod memory;
mod token;

pub use memory::MemorySessionStore;
pub(crate) use token::generate_opaque_token;

use crate::{
    idp::{TokenSet, UserClaims},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Opaque session identifier delivered in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// The identifier is a bearer credential; keep it out of logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId([REDACTED])")
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub id: SessionId,
    pub claims: UserClaims,
    pub tokens: TokenSet,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide session storage.
///
/// All operations are safe to call concurrently; operations on distinct
/// identifiers never interfere.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Allocate a new session under a fresh, unguessable identifier.
    ///
    /// # Errors
    /// Returns [`Error::SessionStore`] if no identifier can be generated.
    async fn create(&self, claims: UserClaims, tokens: TokenSet) -> Result<SessionId, Error>;

    /// Look up a live session. Does not update `last_seen_at`.
    async fn get(&self, id: &SessionId) -> Option<Session>;

    /// Mark a session as seen now. Returns `false` if it does not exist.
    async fn touch(&self, id: &SessionId) -> bool;

    /// Remove a session. Removing an unknown identifier is a no-op.
    async fn destroy(&self, id: &SessionId);

    /// Number of live sessions.
    async fn len(&self) -> usize;

    /// Drop expired sessions, returning how many were removed.
    async fn purge_expired(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_debug_is_redacted() {
        let id = SessionId::new("raw-session-value");
        assert_eq!(format!("{id:?}"), "SessionId([REDACTED])");
        assert_eq!(id.as_str(), "raw-session-value");
    }
}
