//! Health-check signals.
//!
//! Middleware reports request outcomes as `(metric, value)` pairs; the
//! aggregation window and rollup live outside this core. Auth failures
//! and recorded errors use a `-1` sentinel value.

use std::collections::HashMap;
use std::sync::Mutex;

/// The health metrics this core reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthMetric {
    /// A credential failed to resolve or verify.
    KeyFailure,
    /// A request was halted with an error response.
    BlockedRequest,
}

impl HealthMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthMetric::KeyFailure => "key_failure",
            HealthMetric::BlockedRequest => "blocked_request",
        }
    }
}

impl std::fmt::Display for HealthMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sink for health-check values.
pub trait HealthReporter: Send + Sync {
    fn report(&self, metric: HealthMetric, value: i64);
}

/// Discards all signals.
pub struct NoopHealthReporter;

impl HealthReporter for NoopHealthReporter {
    fn report(&self, _metric: HealthMetric, _value: i64) {}
}

/// Accumulates reported values per metric. Intended for tests and
/// embedders that aggregate in-process.
#[derive(Default)]
pub struct CountingHealthReporter {
    values: Mutex<HashMap<HealthMetric, Vec<i64>>>,
}

impl CountingHealthReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values reported so far for one metric.
    pub fn values(&self, metric: HealthMetric) -> Vec<i64> {
        self.values
            .lock()
            .expect("health reporter lock poisoned")
            .get(&metric)
            .cloned()
            .unwrap_or_default()
    }
}

impl HealthReporter for CountingHealthReporter {
    fn report(&self, metric: HealthMetric, value: i64) {
        self.values
            .lock()
            .expect("health reporter lock poisoned")
            .entry(metric)
            .or_default()
            .push(value);
    }
}
