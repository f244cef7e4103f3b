//! Identity key derivation.
//!
//! The canonical key is the org ID followed by the SHA-256 hex digest of
//! the username. The legacy scheme predates key hashing: the org ID
//! concatenated with the username, after stripping any duplicated org
//! prefix from the username. Both derivations are deterministic; the
//! canonical form is always tried first and the legacy form exists only
//! as a migration fallback.

use sha2::{Digest, Sha256};

/// Canonical identity key for `(org_id, username)`.
pub fn canonical_key(org_id: &str, username: &str) -> String {
    let digest = Sha256::digest(username.as_bytes());
    format!("{org_id}{}", hex::encode(digest))
}

/// Legacy identity key: plain concatenation, org prefix stripped from the
/// username when present.
pub fn legacy_key(org_id: &str, username: &str) -> String {
    let stripped = username.strip_prefix(org_id).unwrap_or(username);
    format!("{org_id}{stripped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_is_deterministic() {
        assert_eq!(canonical_key("org1", "alice"), canonical_key("org1", "alice"));
        assert_ne!(canonical_key("org1", "alice"), canonical_key("org1", "bob"));
        assert_ne!(canonical_key("org1", "alice"), canonical_key("org2", "alice"));
    }

    #[test]
    fn canonical_key_is_org_prefixed() {
        assert!(canonical_key("org1", "alice").starts_with("org1"));
        // org prefix + 32-byte digest in hex
        assert_eq!(canonical_key("org1", "alice").len(), "org1".len() + 64);
    }

    #[test]
    fn legacy_key_strips_org_prefix() {
        assert_eq!(legacy_key("org1", "org1alice"), "org1alice");
        assert_eq!(legacy_key("org1", "alice"), "org1alice");
    }

    #[test]
    fn derivations_differ() {
        assert_ne!(canonical_key("org1", "alice"), legacy_key("org1", "alice"));
    }
}
