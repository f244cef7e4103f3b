//! Credential extraction.
//!
//! Header mode parses `Authorization: <scheme> <base64(user:pass)>` with
//! the original wire strictness: exactly two space-separated tokens, and
//! exactly one `:` in the decoded payload. Body mode applies two
//! configured single-capture patterns against a buffered request body and
//! is only attempted by callers after header mode has failed.

use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;

use tollgate_core::BasicAuthConfig;

use crate::error::{AuthError, Result};

/// Where a credential pair was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Body,
}

/// A candidate username/password pair. Ephemeral: created per request and
/// dropped after verification.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub source: CredentialSource,
}

/// Parse credentials out of an `Authorization` header value.
///
/// An absent header is `MissingCredentials` (the client never attempted
/// basic auth); every malformation of a present header is a 400-class
/// `MalformedCredentials`.
pub fn from_authorization_header(header: Option<&str>) -> Result<Credentials> {
    let header = header.ok_or_else(|| {
        AuthError::missing_credentials("Authorization field missing")
    })?;

    let bits: Vec<&str> = header.split(' ').collect();
    if bits.len() != 2 {
        return Err(AuthError::malformed_credentials(
            "Attempted access with malformed header, header not in basic auth format",
        ));
    }

    let decoded = STANDARD.decode(bits[1]).map_err(|_| {
        AuthError::malformed_credentials(
            "Attempted access with malformed header, auth data not encoded correctly",
        )
    })?;
    let decoded = String::from_utf8(decoded).map_err(|_| {
        AuthError::malformed_credentials(
            "Attempted access with malformed header, auth data not encoded correctly",
        )
    })?;

    let values: Vec<&str> = decoded.split(':').collect();
    if values.len() != 2 {
        return Err(AuthError::malformed_credentials(
            "Attempted access with malformed header, values not in basic auth format",
        ));
    }

    Ok(Credentials {
        username: values[0].to_string(),
        password: values[1].to_string(),
        source: CredentialSource::Header,
    })
}

/// Pre-compiled body-extraction patterns.
///
/// Compiled once when the middleware is assembled; an API configured for
/// body extraction with empty or invalid patterns never gets the
/// middleware enabled, so per-request extraction cannot fail on pattern
/// syntax.
#[derive(Debug, Clone)]
pub struct BodyExtractorPatterns {
    user: Regex,
    password: Regex,
}

impl BodyExtractorPatterns {
    /// Compile the configured patterns. Fails when either pattern is
    /// empty or does not compile.
    pub fn compile(config: &BasicAuthConfig) -> Result<Self> {
        if config.body_user_regexp.is_empty() || config.body_password_regexp.is_empty() {
            return Err(AuthError::internal(
                "body extraction configured but regexps are empty",
            ));
        }

        let user = Regex::new(&config.body_user_regexp)
            .map_err(|e| AuthError::internal(format!("invalid user body regexp: {e}")))?;
        let password = Regex::new(&config.body_password_regexp)
            .map_err(|e| AuthError::internal(format!("invalid password body regexp: {e}")))?;

        Ok(Self { user, password })
    }

    /// Extract credentials from a buffered request body.
    pub fn extract(&self, body: &[u8]) -> Result<Credentials> {
        let text = String::from_utf8_lossy(body);

        let user_caps = self.user.captures(&text).ok_or_else(|| {
            AuthError::malformed_credentials("Body does not contain username")
        })?;
        let username = user_caps
            .get(1)
            .ok_or_else(|| {
                AuthError::malformed_credentials("username should be inside regexp match group")
            })?
            .as_str()
            .to_string();

        let pass_caps = self.password.captures(&text).ok_or_else(|| {
            AuthError::malformed_credentials("Body does not contain password")
        })?;
        let password = pass_caps
            .get(1)
            .ok_or_else(|| {
                AuthError::malformed_credentials("password should be inside regexp match group")
            })?
            .as_str()
            .to_string();

        Ok(Credentials {
            username,
            password,
            source: CredentialSource::Body,
        })
    }
}
