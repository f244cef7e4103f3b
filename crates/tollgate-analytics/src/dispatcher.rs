//! Asynchronous record dispatch.
//!
//! The dispatcher decouples record construction from delivery: callers
//! enqueue onto an unbounded channel and return immediately, a spawned
//! drain task forwards to the backend. Backend failures are logged and
//! dropped; the response to the client has already been committed by the
//! time recording runs.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::RecordingBackend;
use crate::record::AnalyticsRecord;

/// Fire-and-forget front end to a [`RecordingBackend`].
///
/// Cheap to clone; all clones feed the same drain task. Must be created
/// inside a tokio runtime.
#[derive(Clone)]
pub struct AnalyticsDispatcher {
    tx: mpsc::UnboundedSender<AnalyticsRecord>,
}

impl AnalyticsDispatcher {
    /// Spawn the drain task and return the dispatch handle.
    pub fn new(backend: Arc<dyn RecordingBackend>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AnalyticsRecord>();

        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = backend.record(record).await {
                    tracing::warn!(error = %e, "failed to deliver analytics record");
                }
            }
            tracing::debug!("analytics channel closed, drain task exiting");
        });

        Self { tx }
    }

    /// Enqueue one record. Never blocks and never fails the caller; a
    /// closed channel is logged and the record dropped.
    pub fn record(&self, record: AnalyticsRecord) {
        if self.tx.send(record).is_err() {
            tracing::warn!("analytics drain task gone, dropping record");
        }
    }
}
