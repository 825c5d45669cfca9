//! Trait definitions for LikeRelay.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::HistoryRecord;

/// Destination for finished history records.
///
/// Implementations live outside the dispatch core (in-memory, file, remote
/// database). The dispatcher calls `record` from a detached task, logs any
/// error and never waits on it before returning to its caller.
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Short name for logging (e.g., "memory", "json-file").
    fn name(&self) -> &str;

    /// Stores one record. Ownership passes to the sink.
    async fn record(&self, record: HistoryRecord) -> Result<(), StorageError>;
}
