//! Recording-backend contract.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::record::AnalyticsRecord;

/// Error from a recording backend. Never propagated to the client
/// response; the dispatcher logs and drops it.
#[derive(Debug, thiserror::Error)]
#[error("recording failed: {0}")]
pub struct RecordingError(pub String);

/// Destination for analytics records.
///
/// Delivery is best-effort from the gateway's perspective; retry and
/// batching policy belong to the backend.
#[async_trait]
pub trait RecordingBackend: Send + Sync {
    /// Accept one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be accepted; the caller
    /// will log and drop it.
    async fn record(&self, record: AnalyticsRecord) -> Result<(), RecordingError>;
}

/// Accumulating in-memory backend for tests.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<AnalyticsRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<AnalyticsRecord> {
        self.records.lock().expect("backend lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("backend lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordingBackend for MemoryBackend {
    async fn record(&self, record: AnalyticsRecord) -> Result<(), RecordingError> {
        self.records.lock().expect("backend lock poisoned").push(record);
        Ok(())
    }
}
