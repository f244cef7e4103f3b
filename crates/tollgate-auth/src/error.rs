//! Authentication error taxonomy.
//!
//! Client-facing text deliberately does not distinguish an unknown user
//! from a wrong password: both render the same generic message so the
//! gateway cannot be used to enumerate accounts. Malformed-input errors
//! carry specific diagnostics since no identity exists yet to enumerate.

/// Result alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors produced while extracting, resolving or verifying credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials were presented at all.
    #[error("{message}")]
    MissingCredentials {
        /// Challenge message returned to the client.
        message: String,
    },

    /// Credentials were presented but could not be parsed.
    #[error("{message}")]
    MalformedCredentials {
        /// Specific diagnostic; safe to surface.
        message: String,
    },

    /// The credentials did not resolve to a stored identity.
    #[error("User not authorised")]
    UnknownIdentity,

    /// The identity exists but the password check failed.
    #[error("User not authorised")]
    PasswordMismatch,

    /// The identity store failed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    /// Creates a new `MissingCredentials` error.
    #[must_use]
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::MissingCredentials {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedCredentials` error.
    #[must_use]
    pub fn malformed_credentials(message: impl Into<String>) -> Self {
        Self::MalformedCredentials {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingCredentials { .. } => 401,
            Self::MalformedCredentials { .. } => 400,
            Self::UnknownIdentity | Self::PasswordMismatch => 401,
            Self::Storage { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Whether the response should carry a `WWW-Authenticate` challenge.
    ///
    /// Malformed input gets no challenge: the client attempted basic auth
    /// and the problem is the encoding, not the absence of credentials.
    #[must_use]
    pub fn challenge(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials { .. } | Self::UnknownIdentity | Self::PasswordMismatch
        )
    }

    /// Whether this failure should count against the key-failure health metric.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::UnknownIdentity | Self::PasswordMismatch)
    }
}
