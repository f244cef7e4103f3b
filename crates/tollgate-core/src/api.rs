//! Per-API configuration surface.
//!
//! An [`ApiSpec`] describes one proxied API as the hot path reads it:
//! which authentication modes are active, how credentials may be pulled
//! out of a request body, how long verification results may be cached,
//! and what the analytics pipeline is allowed to keep. The spec is
//! populated by the configuration layer at startup and treated as
//! read-only afterwards.

use serde::{Deserialize, Serialize};

/// Which middleware provides the base identity bound onto the request
/// context. Basic-auth binding only happens when the spec designates
/// basic auth, or when nothing is designated at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthSource {
    /// No explicit provider configured; first authenticating middleware wins.
    #[default]
    Unset,
    /// Identity comes from HTTP Basic Auth.
    BasicAuth,
    /// Identity comes from a bearer/auth token middleware.
    AuthToken,
}

/// Basic-auth specific knobs for one API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAuthConfig {
    /// Fall back to extracting credentials from the request body when the
    /// `Authorization` header attempt fails.
    pub extract_from_body: bool,
    /// Pattern with one capture group yielding the username.
    pub body_user_regexp: String,
    /// Pattern with one capture group yielding the password.
    pub body_password_regexp: String,
    /// Skip the verification cache entirely for this API.
    pub disable_caching: bool,
    /// Cache TTL in seconds; `0` selects the built-in default.
    pub cache_ttl: u64,
}

/// The read-only per-API configuration consulted on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSpec {
    pub api_id: String,
    pub name: String,
    pub org_id: String,

    /// Master switch for the basic-auth middleware.
    pub use_basic_auth: bool,
    pub base_identity_provided_by: AuthSource,
    pub basic_auth: BasicAuthConfig,

    /// Opt this API out of analytics entirely.
    pub do_not_track: bool,
    /// Capture base64 wire-format request bytes into analytics records.
    pub enable_detail_recording: bool,
    /// Analytics retention in seconds; `0` keeps records effectively forever.
    pub expire_analytics_after: i64,
    /// Organization-level data-age cap in seconds, resolved by the
    /// configuration layer. Wins over `expire_analytics_after` when the
    /// gateway enforces org data age and the cap is positive.
    pub org_data_age: i64,
    /// Request headers copied into the record's tag list as `name-value`.
    pub tag_headers: Vec<String>,
    /// Header naming the API version for analytics.
    pub version_header: String,
    /// Upstream host recorded when the request URI carries none.
    pub target_host: String,
}

impl Default for ApiSpec {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            name: String::new(),
            org_id: String::new(),
            use_basic_auth: false,
            base_identity_provided_by: AuthSource::Unset,
            basic_auth: BasicAuthConfig::default(),
            do_not_track: false,
            enable_detail_recording: false,
            expire_analytics_after: 0,
            org_data_age: 0,
            tag_headers: Vec::new(),
            version_header: "x-api-version".to_string(),
            target_host: String::new(),
        }
    }
}
