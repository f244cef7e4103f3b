//! In-memory session store.

use async_trait::async_trait;
use dashmap::DashMap;

use tollgate_core::Session;

use crate::error::Result;
use crate::storage::SessionStore;

/// DashMap-backed [`SessionStore`] for tests and embedded deployments.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under an identity key.
    pub fn insert(&self, key: impl Into<String>, session: Session) {
        self.sessions.insert(key.into(), session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn lookup(&self, key: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(key).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_hits_and_misses() {
        let store = MemorySessionStore::new();
        store.insert(
            "org1key",
            Session {
                alias: "alice".to_string(),
                ..Session::default()
            },
        );

        let found = store.lookup("org1key").await.unwrap();
        assert_eq!(found.unwrap().alias, "alice");
        assert!(store.lookup("absent").await.unwrap().is_none());
    }
}
