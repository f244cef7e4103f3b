//! Typed request-context values.
//!
//! Middleware communicates along the chain through request extensions;
//! each value here is a distinct newtype so unrelated middleware cannot
//! collide on a key.

use axum::http::HeaderMap;

use tollgate_core::Session;

/// Logical endpoint path to record for analytics instead of the literal
/// request path. Set by endpoint-tracking middleware earlier in the chain.
#[derive(Debug, Clone)]
pub struct TrackedPath(pub String);

/// Marker: endpoint tracking was explicitly suppressed for this request.
#[derive(Debug, Clone, Copy)]
pub struct SuppressTracking;

/// The identity key a successful authentication matched on.
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

/// The resolved identity bound onto the request after authentication.
#[derive(Debug, Clone)]
pub struct AuthedSession {
    pub session: Session,
    /// Key the session was found under (canonical or legacy).
    pub key: String,
}

/// Best-effort client address: `X-Real-IP`, then the first
/// `X-Forwarded-For` entry, then the transport address the caller saw.
pub fn real_ip(headers: &HeaderMap, remote_addr: Option<&str>) -> String {
    if let Some(value) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }

    if let Some(value) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok())
        && let Some(first) = value.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    remote_addr.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn real_ip_prefers_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(real_ip(&headers, Some("192.0.2.1")), "203.0.113.7");
    }

    #[test]
    fn real_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(real_ip(&headers, None), "203.0.113.7");
    }

    #[test]
    fn real_ip_falls_back_to_remote_addr() {
        assert_eq!(real_ip(&HeaderMap::new(), Some("192.0.2.1")), "192.0.2.1");
        assert_eq!(real_ip(&HeaderMap::new(), None), "");
    }
}
