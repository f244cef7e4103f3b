//! Symbolic error registry.
//!
//! Client-facing error messages and codes are looked up by symbolic ID so
//! deployments can override either without touching code. The registry is
//! built once at startup — defaults merged with configured overrides —
//! and immutable afterwards.

use std::collections::HashMap;

use tollgate_core::ErrorOverride;

/// Credentials were never presented.
pub const ERR_AUTH_FIELD_MISSING: &str = "auth.authorization_field_missing";
/// Credentials were presented but unparseable.
pub const ERR_AUTH_MALFORMED_CREDENTIALS: &str = "auth.malformed_credentials";
/// Credentials did not resolve or did not verify; one message for both.
pub const ERR_AUTH_NOT_AUTHORISED: &str = "auth.user_not_authorised";
/// The presented key is known but access to the API is disallowed.
pub const ERR_AUTH_KEY_NOT_FOUND: &str = "auth.key_not_found";

/// One registered error: the message and HTTP code returned for its ID.
#[derive(Debug, Clone)]
pub struct RegisteredError {
    pub message: String,
    pub code: u16,
}

/// Immutable ID → error mapping.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    entries: HashMap<String, RegisteredError>,
}

impl ErrorRegistry {
    /// The built-in defaults.
    pub fn with_defaults() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            ERR_AUTH_FIELD_MISSING.to_string(),
            RegisteredError {
                message: "Authorization field missing".to_string(),
                code: 401,
            },
        );
        entries.insert(
            ERR_AUTH_MALFORMED_CREDENTIALS.to_string(),
            RegisteredError {
                message: "Attempted access with malformed header".to_string(),
                code: 400,
            },
        );
        entries.insert(
            ERR_AUTH_NOT_AUTHORISED.to_string(),
            RegisteredError {
                message: "User not authorised".to_string(),
                code: 401,
            },
        );
        entries.insert(
            ERR_AUTH_KEY_NOT_FOUND.to_string(),
            RegisteredError {
                message: "Access to this API has been disallowed".to_string(),
                code: 403,
            },
        );
        Self { entries }
    }

    /// Merge per-deployment overrides. Message and code apply
    /// independently; unknown IDs create new entries.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: &HashMap<String, ErrorOverride>) -> Self {
        for (id, over) in overrides {
            let entry = self
                .entries
                .entry(id.clone())
                .or_insert(RegisteredError {
                    message: String::new(),
                    code: 0,
                });
            if let Some(code) = over.code {
                entry.code = code;
            }
            if let Some(message) = &over.message {
                entry.message = message.clone();
            }
        }
        self
    }

    pub fn lookup(&self, id: &str) -> Option<&RegisteredError> {
        self.entries.get(id)
    }

    /// Message and code for an ID, with a generic 500 for unknown IDs.
    pub fn message_and_code(&self, id: &str) -> (String, u16) {
        match self.entries.get(id) {
            Some(entry) => (entry.message.clone(), entry.code),
            None => ("Internal server error".to_string(), 500),
        }
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
