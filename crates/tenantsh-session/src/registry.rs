//! Registry of live sessions, used to cancel every in-flight session on
//! process shutdown without per-session locking.
//!
//! Grounded in `skynet-gateway`'s `active_operations: DashMap<String,
//! CancellationToken>` and its `/stop` emergency-stop routine.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::session::Session;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, (Arc<Session>, CancellationToken)>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a new session and return the token its task should select
    /// on to notice a shutdown request.
    pub fn insert(&self, session: Arc<Session>) -> CancellationToken {
        let token = CancellationToken::new();
        self.sessions
            .insert(session.id.clone(), (session, token.clone()));
        token
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Cancel every registered session's token. Returns the number
    /// cancelled. Does not itself await teardown completion — each
    /// session's task observes cancellation and tears down on its own.
    pub fn cancel_all(&self) -> usize {
        let mut count = 0;
        for entry in self.sessions.iter() {
            entry.value().1.cancel();
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn insert_and_remove_tracks_count() {
        let registry = SessionRegistry::new();
        let session = Arc::new(Session::new("a", "alice", Duration::from_secs(60)));
        registry.insert(session.clone());
        assert_eq!(registry.len(), 1);
        registry.remove(&session.id);
        assert!(registry.is_empty());
    }

    #[test]
    fn cancel_all_cancels_every_token() {
        let registry = SessionRegistry::new();
        let s1 = Arc::new(Session::new("a", "alice", Duration::from_secs(60)));
        let s2 = Arc::new(Session::new("b", "bob", Duration::from_secs(60)));
        let t1 = registry.insert(s1);
        let t2 = registry.insert(s2);

        assert_eq!(registry.cancel_all(), 2);
        assert!(t1.is_cancelled());
        assert!(t2.is_cancelled());
    }
}
