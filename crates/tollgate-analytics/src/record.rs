//! The analytics record.
//!
//! An immutable snapshot of one request's outcome, created once per
//! terminal outcome and not mutated after dispatch.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Retention sentinel: zero seconds means "keep effectively forever",
/// expressed as one hundred years.
const FOREVER: Duration = Duration::days(365 * 100);

/// Snapshot of one request outcome, as handed to the recording backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub method: String,
    pub host: String,
    /// Logical endpoint path recorded for aggregation; equals `raw_path`
    /// unless an endpoint-tracking path was bound to the request.
    pub path: String,
    pub raw_path: String,
    pub content_length: i64,
    pub user_agent: String,
    pub day: u8,
    pub month: u8,
    pub year: i32,
    pub hour: u8,
    pub response_code: u16,
    pub api_key: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub api_version: String,
    pub api_name: String,
    pub api_id: String,
    pub org_id: String,
    /// Base64 wire-format request bytes; empty unless detail recording
    /// is enabled for the API.
    pub raw_request: String,
    /// Base64 wire-format response bytes; empty unless a caller that saw
    /// the response filled it in.
    pub raw_response: String,
    pub ip_address: String,
    pub tags: Vec<String>,
    pub alias: String,
    pub track_path: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub expire_at: OffsetDateTime,
}

impl AnalyticsRecord {
    /// A blank record stamped with the current wall clock.
    pub fn stamped_now() -> Self {
        Self::stamped(OffsetDateTime::now_utc())
    }

    /// A blank record stamped at `now`.
    pub fn stamped(now: OffsetDateTime) -> Self {
        Self {
            method: String::new(),
            host: String::new(),
            path: String::new(),
            raw_path: String::new(),
            content_length: 0,
            user_agent: String::new(),
            day: now.day(),
            month: u8::from(now.month()),
            year: now.year(),
            hour: now.hour(),
            response_code: 0,
            api_key: String::new(),
            timestamp: now,
            api_version: String::new(),
            api_name: String::new(),
            api_id: String::new(),
            org_id: String::new(),
            raw_request: String::new(),
            raw_response: String::new(),
            ip_address: String::new(),
            tags: Vec::new(),
            alias: String::new(),
            track_path: false,
            expire_at: now,
        }
    }

    /// Apply the resolved retention to this record.
    pub fn set_expiry(&mut self, retention_secs: i64) {
        self.expire_at = if retention_secs == 0 {
            self.timestamp + FOREVER
        } else {
            self.timestamp + Duration::seconds(retention_secs)
        };
    }
}

/// Resolve the effective retention: a positive organization data-age cap
/// wins over the API's own retention when enforcement is on.
pub fn resolve_retention(expire_after: i64, enforce_org_data_age: bool, org_data_age: i64) -> i64 {
    if enforce_org_data_age && org_data_age > 0 {
        org_data_age
    } else {
        expire_after
    }
}

/// Normalize a request path for recording: exactly one leading slash,
/// whatever accumulated upstream.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_breaks_out_clock_fields() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let record = AnalyticsRecord::stamped(now);
        assert_eq!(record.year, now.year());
        assert_eq!(record.month, u8::from(now.month()));
        assert_eq!(record.day, now.day());
        assert_eq!(record.hour, now.hour());
        assert_eq!(record.timestamp, now);
    }

    #[test]
    fn zero_retention_keeps_forever() {
        let mut record = AnalyticsRecord::stamped_now();
        record.set_expiry(0);
        let kept_for = record.expire_at - record.timestamp;
        assert_eq!(kept_for, Duration::days(365 * 100));
    }

    #[test]
    fn positive_retention_expires_after_it() {
        let mut record = AnalyticsRecord::stamped_now();
        record.set_expiry(3600);
        assert_eq!(record.expire_at - record.timestamp, Duration::seconds(3600));
    }

    #[test]
    fn org_cap_wins_when_positive_and_enforced() {
        assert_eq!(resolve_retention(3600, true, 60), 60);
        assert_eq!(resolve_retention(3600, true, 0), 3600);
        assert_eq!(resolve_retention(3600, false, 60), 3600);
    }

    #[test]
    fn path_normalization() {
        assert_eq!(normalize_path("//foo/bar"), "/foo/bar");
        assert_eq!(normalize_path("/foo/bar"), "/foo/bar");
        assert_eq!(normalize_path("foo/bar"), "/foo/bar");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn record_serializes_with_rfc3339_timestamps() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let mut record = AnalyticsRecord::stamped(now);
        record.set_expiry(60);

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert!(value["timestamp"].as_str().unwrap().starts_with("2023-"));
        assert!(value["expire_at"].as_str().is_some());
    }
}
