//! Live sign-in sessions keyed by token id, plus a broadcast feed of
//! session changes.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::navigation::GateState;

/// A signed-in session. The navigation gate is resolved once, at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub gate: GateState,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionChange {
    SignedIn { user_id: Uuid, token_id: String },
    SignedOut { user_id: Uuid, token_id: String },
}

#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: std::sync::Arc<DashMap<String, Session>>,
    changes: broadcast::Sender<SessionChange>,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            sessions: std::sync::Arc::new(DashMap::new()),
            changes,
        }
    }

    /// Registers `session`, first dropping every session that has expired.
    pub fn insert(&self, session: Session) {
        self.prune_expired();
        let change = SessionChange::SignedIn {
            user_id: session.user_id,
            token_id: session.token_id.clone(),
        };
        self.sessions.insert(session.token_id.clone(), session);
        crate::metrics::ACTIVE_SESSIONS.set(self.sessions.len() as i64);
        self.notify(change);
    }

    /// Returns the live session for `token_id`, dropping it if it has expired.
    pub fn get(&self, token_id: &str) -> Option<Session> {
        let session = self.sessions.get(token_id).map(|entry| entry.clone())?;
        if session.is_expired() {
            self.remove(token_id);
            return None;
        }
        Some(session)
    }

    pub fn remove(&self, token_id: &str) -> Option<Session> {
        let (_, session) = self.sessions.remove(token_id)?;
        crate::metrics::ACTIVE_SESSIONS.set(self.sessions.len() as i64);
        self.notify(SessionChange::SignedOut {
            user_id: session.user_id,
            token_id: session.token_id.clone(),
        });
        Some(session)
    }

    /// Drops expired sessions that were never looked up again. Returns how
    /// many were removed.
    pub fn prune_expired(&self) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.key().clone())
            .collect();
        let removed = expired
            .iter()
            .filter(|token| self.remove(token).is_some())
            .count();
        if removed > 0 {
            debug!(removed, "expired sessions pruned");
        }
        removed
    }

    /// Ends every session belonging to `user_id`. Returns how many were removed.
    pub fn remove_user(&self, user_id: Uuid) -> usize {
        let tokens: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.key().clone())
            .collect();
        tokens
            .iter()
            .filter(|token| self.remove(token).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    fn notify(&self, change: SessionChange) {
        // Nobody listening is fine.
        if self.changes.send(change).is_err() {
            debug!("session change dropped, no subscribers");
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(token: &str, user_id: Uuid, ttl: Duration) -> Session {
        let now = Utc::now();
        Session {
            token_id: token.to_string(),
            user_id,
            username: "ana.silva".into(),
            display_name: "Ana Silva".into(),
            is_admin: false,
            gate: GateState::None,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    #[tokio::test]
    async fn insert_and_remove_broadcast_changes() {
        let registry = SessionRegistry::new(8);
        let mut rx = registry.subscribe();
        let user_id = Uuid::new_v4();

        registry.insert(session("t1", user_id, Duration::hours(1)));
        assert!(registry.get("t1").is_some());
        registry.remove("t1");

        assert_eq!(
            rx.recv().await.unwrap(),
            SessionChange::SignedIn {
                user_id,
                token_id: "t1".into()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionChange::SignedOut {
                user_id,
                token_id: "t1".into()
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn expired_sessions_are_dropped_on_lookup() {
        let registry = SessionRegistry::default();
        registry.insert(session("old", Uuid::new_v4(), Duration::seconds(-1)));
        assert!(registry.get("old").is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn expired_sessions_are_pruned_on_next_sign_in() {
        let registry = SessionRegistry::default();
        registry.insert(session("stale", Uuid::new_v4(), Duration::seconds(-1)));
        registry.insert(session("fresh", Uuid::new_v4(), Duration::hours(1)));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("fresh").is_some());
        assert_eq!(registry.prune_expired(), 0);
    }

    #[test]
    fn remove_user_ends_all_of_their_sessions() {
        let registry = SessionRegistry::default();
        let user_id = Uuid::new_v4();
        registry.insert(session("a", user_id, Duration::hours(1)));
        registry.insert(session("b", user_id, Duration::hours(1)));
        registry.insert(session("c", Uuid::new_v4(), Duration::hours(1)));

        assert_eq!(registry.remove_user(user_id), 2);
        assert_eq!(registry.len(), 1);
    }
}
