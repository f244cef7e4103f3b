//! Identity-store contract.

mod memory;

pub use memory::MemorySessionStore;

use async_trait::async_trait;

use tollgate_core::Session;

use crate::error::Result;

/// Read-only lookup into the external identity store.
///
/// Implementations must be safe for concurrent reads; this core never
/// writes a session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a session by its identity key.
    ///
    /// Returns `Ok(None)` when no session exists for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn lookup(&self, key: &str) -> Result<Option<Session>>;
}
