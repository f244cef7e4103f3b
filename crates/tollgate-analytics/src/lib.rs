//! Request-outcome analytics for the Tollgate hot path.
//!
//! One [`AnalyticsRecord`] is produced per terminal request outcome and
//! handed to a [`RecordingBackend`] through the [`AnalyticsDispatcher`].
//! Dispatch is fire-and-forget: the record is queued on an unbounded
//! channel and delivered by a background task, so the recording backend
//! can never apply backpressure onto the client-facing response path.

pub mod backend;
pub mod dispatcher;
pub mod record;

pub use backend::{MemoryBackend, RecordingBackend, RecordingError};
pub use dispatcher::AnalyticsDispatcher;
pub use record::{AnalyticsRecord, normalize_path, resolve_retention};
