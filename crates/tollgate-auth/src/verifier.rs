//! Two-tier password verification.
//!
//! Bcrypt verification is deliberately expensive; re-running it on every
//! request of a high-QPS API is prohibitive, and caching the plaintext
//! would be unacceptable. Instead, the first successful slow verification
//! caches a fast fingerprint of the plaintext keyed by the stored hash,
//! bounded by a per-API TTL. Within the window a matching fingerprint is
//! trusted; a mismatching one always falls back to the authoritative
//! bcrypt check. Failed verifications are never cached.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use tollgate_core::{BasicAuthConfig, BasicAuthData, HashKind};

use crate::cache::PasswordCache;
use crate::error::{AuthError, Result};

/// Cache TTL applied when the API does not configure one.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Fast fingerprint of a plaintext password.
///
/// Used only to detect repeated plaintexts inside the trusted cache
/// window; never a substitute for the slow hash.
pub fn fingerprint(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Verifies candidate passwords against stored credential material.
pub struct PasswordVerifier {
    cache: Arc<PasswordCache>,
}

impl PasswordVerifier {
    pub fn new(cache: Arc<PasswordCache>) -> Self {
        Self { cache }
    }

    /// Verify `password` against the stored representation.
    ///
    /// # Errors
    ///
    /// `PasswordMismatch` when the password does not match; `Internal`
    /// when the stored hash is unusable or the blocking task fails.
    pub async fn verify(
        &self,
        stored: &BasicAuthData,
        password: &str,
        options: &BasicAuthConfig,
    ) -> Result<()> {
        match stored.hash {
            HashKind::PlainText => {
                if stored.password == password {
                    Ok(())
                } else {
                    Err(AuthError::PasswordMismatch)
                }
            }
            HashKind::Bcrypt => self.verify_bcrypt(&stored.password, password, options).await,
        }
    }

    async fn verify_bcrypt(
        &self,
        hash: &str,
        password: &str,
        options: &BasicAuthConfig,
    ) -> Result<()> {
        if options.disable_caching {
            tracing::debug!("verification cache disabled");
            return slow_verify(hash, password).await;
        }

        let ttl = if options.cache_ttl > 0 {
            Duration::from_secs(options.cache_ttl)
        } else {
            DEFAULT_CACHE_TTL
        };

        let Some(cached) = self.cache.get(hash) else {
            tracing::debug!("cache miss, running bcrypt");
            slow_verify(hash, password).await?;
            self.cache.set(hash.to_string(), fingerprint(password), ttl);
            return Ok(());
        };

        if cached == fingerprint(password) {
            tracing::debug!("cache hit");
            return Ok(());
        }

        // A fingerprint mismatch is never trusted as a rejection: it may
        // be a wrong password or a fast-hash collision, and only the
        // authoritative check can tell.
        tracing::warn!("cache hit with fingerprint mismatch, running bcrypt");
        slow_verify(hash, password).await
    }
}

async fn slow_verify(hash: &str, password: &str) -> Result<()> {
    let hash = hash.to_owned();
    let password = password.to_owned();

    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash))
        .await
        .map_err(|e| AuthError::internal(format!("bcrypt task failed: {e}")))?
        .map_err(|e| AuthError::internal(format!("unusable stored hash: {e}")))?;

    if matched {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}
