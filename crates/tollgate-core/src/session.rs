//! Stored identity types.
//!
//! A [`Session`] is the identity store's record for one credential as
//! this gateway reads it. The store owns the record; nothing here ever
//! writes one back.

use serde::{Deserialize, Serialize};

/// How the stored password representation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashKind {
    /// The stored value is the password itself.
    #[default]
    PlainText,
    /// The stored value is a bcrypt hash of the password.
    Bcrypt,
}

/// The credential material attached to a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAuthData {
    /// Password representation; interpretation depends on `hash`.
    pub password: String,
    pub hash: HashKind,
}

/// A stored identity record, read-only to the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub basic_auth: BasicAuthData,
    pub org_id: String,
    /// Human-readable alias carried into analytics records.
    pub alias: String,
    /// Free-form tags merged into analytics records.
    pub tags: Vec<String>,
}
