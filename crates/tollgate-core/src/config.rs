//! Gateway-wide configuration.
//!
//! [`GatewayConfig`] holds the process-level knobs shared by every API:
//! legacy key-format compatibility, response-header behaviour, analytics
//! collection policy and per-deployment error-message overrides. Like the
//! per-API spec it is loaded once and read-only on the hot path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A per-deployment override for one registered error. Message and code
/// are overridable independently; an absent field keeps the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorOverride {
    pub message: Option<String>,
    pub code: Option<u16>,
}

/// Process-wide gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Retry identity lookups with the pre-hashing key derivation when the
    /// canonical lookup misses.
    pub legacy_key_format: bool,
    /// Suppress the `X-Generator` header on error responses.
    pub hide_generator_header: bool,
    /// Add `Connection: close` to error responses.
    pub close_connections: bool,
    /// Master switch for analytics collection.
    pub enable_analytics: bool,
    /// Client addresses excluded from analytics collection.
    pub analytics_ignored_ips: Vec<String>,
    /// Let a positive organization data-age cap win over API retention.
    pub enforce_org_data_age: bool,
    /// Error-registry overrides keyed by symbolic error ID.
    pub override_messages: HashMap<String, ErrorOverride>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            legacy_key_format: false,
            hide_generator_header: false,
            close_connections: false,
            enable_analytics: true,
            analytics_ignored_ips: Vec::new(),
            enforce_org_data_age: false,
            override_messages: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Whether an analytics record should be stored for a client address.
    pub fn store_analytics(&self, ip: &str) -> bool {
        self.enable_analytics && !self.analytics_ignored_ips.iter().any(|ignored| ignored == ip)
    }
}
