//! Credential verification for the Tollgate hot path.
//!
//! This crate covers the authentication half of the gateway core:
//!
//! - [`credentials`] — pulling a username/password pair out of a request,
//!   from the `Authorization` header or a configured body pattern
//! - [`keys`] — deterministic identity-key derivation, canonical and legacy
//! - [`resolver`] — mapping `(org, username)` to a stored [`Session`]
//! - [`verifier`] — two-tier password verification: bcrypt the first time,
//!   a cached fingerprint comparison afterwards
//! - [`storage`] — the identity-store contract and an in-memory
//!   implementation
//!
//! All types are safe for unsynchronized concurrent use across request
//! workers; the [`cache::PasswordCache`] is the only shared mutable state.
//!
//! [`Session`]: tollgate_core::Session

pub mod cache;
pub mod credentials;
pub mod error;
pub mod keys;
pub mod resolver;
pub mod storage;
pub mod verifier;

pub use cache::{CacheStats, PasswordCache};
pub use credentials::{BodyExtractorPatterns, CredentialSource, Credentials};
pub use error::{AuthError, Result};
pub use resolver::SessionResolver;
pub use storage::{MemorySessionStore, SessionStore};
pub use verifier::PasswordVerifier;
