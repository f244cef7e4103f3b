//! Identity resolution.
//!
//! Maps `(org, username)` to a stored session. The canonical key is
//! always tried first; when it misses and legacy compatibility is
//! enabled, the pre-hashing derivation is tried exactly once. Both
//! derivations are equally authoritative for matching purposes.

use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::storage::SessionStore;

use tollgate_core::Session;

/// Resolves credentials to stored sessions via a [`SessionStore`].
pub struct SessionResolver {
    store: Arc<dyn SessionStore>,
    legacy_key_format: bool,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn SessionStore>, legacy_key_format: bool) -> Self {
        Self {
            store,
            legacy_key_format,
        }
    }

    /// Look up the session for `(org_id, username)`.
    ///
    /// Returns the session together with the key it was found under, so
    /// callers can bind the matched key onto the request context.
    pub async fn resolve(
        &self,
        org_id: &str,
        username: &str,
    ) -> Result<Option<(Session, String)>> {
        let key = keys::canonical_key(org_id, username);
        if let Some(session) = self.store.lookup(&key).await? {
            return Ok(Some((session, key)));
        }

        if !self.legacy_key_format {
            return Ok(None);
        }

        tracing::debug!(org_id, "canonical key miss, falling back to legacy format key");
        let legacy = keys::legacy_key(org_id, username);
        match self.store.lookup(&legacy).await? {
            Some(session) => Ok(Some((session, legacy))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStore;

    fn session(alias: &str) -> Session {
        Session {
            alias: alias.to_string(),
            org_id: "org1".to_string(),
            ..Session::default()
        }
    }

    #[tokio::test]
    async fn canonical_lookup_wins() {
        let store = Arc::new(MemorySessionStore::new());
        store.insert(keys::canonical_key("org1", "alice"), session("canonical"));
        store.insert(keys::legacy_key("org1", "alice"), session("legacy"));

        let resolver = SessionResolver::new(store, true);
        let (found, key) = resolver.resolve("org1", "alice").await.unwrap().unwrap();
        assert_eq!(found.alias, "canonical");
        assert_eq!(key, keys::canonical_key("org1", "alice"));
    }

    #[tokio::test]
    async fn legacy_fallback_when_enabled() {
        let store = Arc::new(MemorySessionStore::new());
        store.insert(keys::legacy_key("org1", "org1alice"), session("legacy"));

        let resolver = SessionResolver::new(store, true);
        let (found, key) = resolver.resolve("org1", "org1alice").await.unwrap().unwrap();
        assert_eq!(found.alias, "legacy");
        assert_eq!(key, "org1alice");
    }

    #[tokio::test]
    async fn no_fallback_when_disabled() {
        let store = Arc::new(MemorySessionStore::new());
        store.insert(keys::legacy_key("org1", "alice"), session("legacy"));

        let resolver = SessionResolver::new(store, false);
        assert!(resolver.resolve("org1", "alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn miss_on_both_derivations() {
        let resolver = SessionResolver::new(Arc::new(MemorySessionStore::new()), true);
        assert!(resolver.resolve("org1", "ghost").await.unwrap().is_none());
    }
}
