use super::{generate_opaque_token, Session, SessionId, SessionStore};
use crate::{
    idp::{TokenSet, UserClaims},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// 256-bit identifiers.
const SESSION_ID_BYTES: usize = 32;
const MAX_ID_ATTEMPTS: usize = 4;

/// In-process [`SessionStore`] guarded by a single mutex.
pub struct MemorySessionStore {
    ttl: TimeDelta,
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, claims: UserClaims, tokens: TokenSet) -> Result<SessionId, Error> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut sessions = self.sessions.lock().await;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = SessionId::new(generate_opaque_token::<SESSION_ID_BYTES>()?);
            if let Entry::Vacant(slot) = sessions.entry(id.clone()) {
                slot.insert(Session {
                    id: id.clone(),
                    claims,
                    tokens,
                    created_at: now,
                    last_seen_at: now,
                    expires_at,
                });
                return Ok(id);
            }
            debug!("session id collision, regenerating");
        }

        Err(Error::SessionStore(
            "failed to allocate a unique session id".to_string(),
        ))
    }

    async fn get(&self, id: &SessionId) -> Option<Session> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(id)
            .filter(|session| !session.is_expired(Utc::now()))
            .cloned()
    }

    async fn touch(&self, id: &SessionId) -> bool {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(id) {
            Some(session) if !session.is_expired(now) => {
                session.last_seen_at = now;
                true
            }
            _ => false,
        }
    }

    async fn destroy(&self, id: &SessionId) {
        self.sessions.lock().await.remove(id);
    }

    async fn len(&self) -> usize {
        let now = Utc::now();
        let sessions = self.sessions.lock().await;
        sessions.values().filter(|s| !s.is_expired(now)).count()
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store() -> MemorySessionStore {
        MemorySessionStore::new(Duration::from_secs(3600))
    }

    fn claims() -> UserClaims {
        UserClaims::new("u1").with_name("Alice")
    }

    #[tokio::test]
    async fn create_then_get_returns_the_record() -> Result<(), Error> {
        let store = store();
        let id = store.create(claims(), TokenSet::bearer("tok")).await?;

        let session = store.get(&id).await;
        assert_eq!(session.as_ref().map(|s| s.claims.clone()), Some(claims()));
        assert_eq!(session.map(|s| s.id), Some(id));
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn identifiers_are_unique_and_long() -> Result<(), Error> {
        let store = store();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let id = store.create(claims(), TokenSet::bearer("tok")).await?;
            assert_eq!(id.as_str().len(), 43);
            assert!(seen.insert(id));
        }
        assert_eq!(store.len().await, 100);
        Ok(())
    }

    #[tokio::test]
    async fn get_does_not_touch() -> Result<(), Error> {
        let store = store();
        let id = store.create(claims(), TokenSet::bearer("tok")).await?;
        let first = store.get(&id).await.map(|s| s.last_seen_at);
        let second = store.get(&id).await.map(|s| s.last_seen_at);
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn touch_updates_last_seen() -> Result<(), Error> {
        let store = store();
        let id = store.create(claims(), TokenSet::bearer("tok")).await?;
        let created = store.get(&id).await.map(|s| s.last_seen_at);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.touch(&id).await);

        let touched = store.get(&id).await.map(|s| s.last_seen_at);
        assert!(touched > created);
        assert!(!store.touch(&SessionId::new("missing")).await);
        Ok(())
    }

    #[tokio::test]
    async fn destroy_is_idempotent() -> Result<(), Error> {
        let store = store();
        let id = store.create(claims(), TokenSet::bearer("tok")).await?;

        store.destroy(&id).await;
        store.destroy(&id).await;
        store.destroy(&SessionId::new("never-issued")).await;

        assert!(store.get(&id).await.is_none());
        assert_eq!(store.len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn expired_sessions_read_as_absent_and_are_purged() -> Result<(), Error> {
        let store = MemorySessionStore::new(Duration::ZERO);
        let id = store.create(claims(), TokenSet::bearer("tok")).await?;

        assert!(store.get(&id).await.is_none());
        assert!(!store.touch(&id).await);
        assert_eq!(store.len().await, 0);
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.purge_expired().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_do_not_race() -> anyhow::Result<()> {
        let store = Arc::new(store());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(claims(), TokenSet::bearer("tok")).await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await??);
        }
        assert_eq!(ids.len(), 32);
        assert_eq!(store.len().await, 32);
        Ok(())
    }
}
