//! Security events.
//!
//! Authentication failures are surfaced as [`AuthEvent`]s handed to an
//! [`EventSink`]. Delivery is fire-and-forget: the sink must not block
//! the request path, and a lost event never fails a request.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Type of authentication event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventType {
    /// A request presented credentials that did not resolve to a valid
    /// identity, or failed the password check.
    AccessAttemptDenied,
    /// A request presented no credentials at all.
    CredentialsMissing,
}

impl AuthEventType {
    /// Returns the string representation of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventType::AccessAttemptDenied => "access_attempt_denied",
            AuthEventType::CredentialsMissing => "credentials_missing",
        }
    }
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event describing one denied access attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_id: Uuid,
    pub event_type: AuthEventType,
    pub api_id: String,
    pub org_id: String,
    /// The presented credential, as received. May be empty.
    pub key: String,
    /// Source address of the attempt.
    pub ip_address: String,
    pub reason: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl AuthEvent {
    pub fn denied(
        api_id: impl Into<String>,
        org_id: impl Into<String>,
        key: impl Into<String>,
        ip_address: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: AuthEventType::AccessAttemptDenied,
            api_id: api_id.into(),
            org_id: org_id.into(),
            key: key.into(),
            ip_address: ip_address.into(),
            reason: reason.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Receiver for security events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AuthEvent);
}

/// Default sink: structured warning via `tracing`.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: AuthEvent) {
        tracing::warn!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            api_id = %event.api_id,
            org_id = %event.org_id,
            ip = %event.ip_address,
            reason = %event.reason,
            "auth event"
        );
    }
}
