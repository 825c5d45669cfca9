//! Dispatch history sinks.
//!
//! Two [`HistorySink`] implementations: an in-memory ring that notifies
//! watchers on change, and a JSON file for history that survives restarts.
//! Both keep the newest records first and drop the oldest past capacity.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use likerelay_core::{HistoryRecord, HistorySink, StorageError};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_history_path, load_json, load_json_or_default, save_json};

/// Default number of records kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

// ============================================================================
// Stats
// ============================================================================

/// Aggregate view over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of records.
    pub total: usize,
    /// Records where likes were applied.
    pub successful: usize,
    /// Records where nothing was applied (daily cap).
    pub failed: usize,
    /// Likes sent, summed over successful records.
    pub total_likes: u64,
}

impl HistoryStats {
    /// Computes stats over `records`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HistoryRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut stats, record| {
                stats.total += 1;
                if record.success {
                    stats.successful += 1;
                    stats.total_likes += record.likes_sent;
                } else {
                    stats.failed += 1;
                }
                stats
            })
    }
}

// ============================================================================
// In-Memory History
// ============================================================================

/// Bounded in-memory history, newest first.
///
/// Observable via a watch channel carrying a change counter.
pub struct MemoryHistory {
    records: RwLock<VecDeque<HistoryRecord>>,
    capacity: usize,
    notify: watch::Sender<u64>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistory {
    /// Creates a history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a history keeping at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify,
        }
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Adds a record at the front, evicting the oldest past capacity.
    pub async fn push(&self, record: HistoryRecord) {
        let mut records = self.records.write().await;
        records.push_front(record);
        records.truncate(self.capacity);
        drop(records);
        self.bump();
    }

    /// Returns all records, newest first.
    pub async fn list(&self) -> Vec<HistoryRecord> {
        self.records.read().await.iter().cloned().collect()
    }

    /// Returns the number of records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if there are no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Returns aggregate stats.
    pub async fn stats(&self) -> HistoryStats {
        HistoryStats::from_records(self.records.read().await.iter())
    }

    /// Removes all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
        self.bump();
    }

    fn bump(&self) {
        self.notify.send_modify(|version| *version += 1);
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HistorySink for MemoryHistory {
    fn name(&self) -> &str {
        "memory"
    }

    async fn record(&self, record: HistoryRecord) -> Result<(), StorageError> {
        self.push(record).await;
        Ok(())
    }
}

// ============================================================================
// JSON File History
// ============================================================================

/// Bounded history persisted to a JSON file, newest first.
#[derive(Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
    capacity: usize,
    /// Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl JsonFileHistory {
    /// Creates a history at `path` keeping at most `capacity` records.
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a history at the default location.
    pub fn at_default_path(capacity: usize) -> Self {
        Self::new(default_history_path(), capacity)
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds a record at the front, evicting the oldest past capacity.
    ///
    /// # Errors
    ///
    /// Fails without touching the file if it exists but cannot be read or
    /// parsed. A missing file starts an empty history.
    pub async fn push(&self, record: HistoryRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut records: VecDeque<HistoryRecord> = match load_json(&self.path).await {
            Ok(records) => records,
            Err(e) if e.is_not_found() => VecDeque::new(),
            Err(e) => return Err(e),
        };
        records.push_front(record);
        records.truncate(self.capacity);
        save_json(&self.path, &records).await?;

        debug!(path = %self.path.display(), count = records.len(), "History saved");
        Ok(())
    }

    /// Returns all records, newest first.
    pub async fn list(&self) -> Vec<HistoryRecord> {
        load_json_or_default(&self.path).await
    }

    /// Returns aggregate stats.
    pub async fn stats(&self) -> HistoryStats {
        HistoryStats::from_records(&self.list().await)
    }

    /// Removes all records.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        save_json(&self.path, &Vec::<HistoryRecord>::new()).await?;
        info!(path = %self.path.display(), "History cleared");
        Ok(())
    }
}

#[async_trait]
impl HistorySink for JsonFileHistory {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn record(&self, record: HistoryRecord) -> Result<(), StorageError> {
        self.push(record).await.map_err(Into::into)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use likerelay_core::{LikeRequest, LikeResult};
    use tempfile::TempDir;

    fn record(player_id: &str, before: u64, after: u64) -> HistoryRecord {
        let request = LikeRequest::new(player_id, 100).unwrap();
        let result = LikeResult {
            likes_before: before,
            likes_after: after,
            likes_sent: after - before,
            player_exp: 1,
            player_level: 1,
            nickname: "DragonSlayer99".to_string(),
            region: "BR".to_string(),
        };
        HistoryRecord::from_result(&request, &result)
    }

    #[test]
    fn test_stats() {
        let records = [
            record("12345678", 500, 600),
            record("12345678", 600, 600),
            record("87654321", 0, 50),
        ];
        let stats = HistoryStats::from_records(&records);

        assert_eq!(
            stats,
            HistoryStats {
                total: 3,
                successful: 2,
                failed: 1,
                total_likes: 150,
            }
        );
    }

    #[tokio::test]
    async fn test_memory_newest_first_and_capped() {
        let history = MemoryHistory::with_capacity(2);
        history.push(record("10000001", 0, 1)).await;
        history.push(record("10000002", 0, 1)).await;
        history.push(record("10000003", 0, 1)).await;

        let ids: Vec<String> = history
            .list()
            .await
            .into_iter()
            .map(|r| r.player_id)
            .collect();
        assert_eq!(ids, vec!["10000003", "10000002"]);
    }

    #[tokio::test]
    async fn test_memory_notifies_and_clears() {
        let history = MemoryHistory::new();
        let rx = history.subscribe();

        history.record(record("12345678", 0, 100)).await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(history.len().await, 1);

        history.clear().await;
        assert!(history.is_empty().await);
        assert_eq!(*rx.borrow(), 2);
    }

    #[tokio::test]
    async fn test_json_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let history = JsonFileHistory::new(temp_dir.path().join("history.json"), 10);

        history.record(record("12345678", 500, 600)).await.unwrap();
        history.record(record("87654321", 500, 500)).await.unwrap();

        // A fresh handle sees the same file.
        let reopened = JsonFileHistory::new(history.path(), 10);
        let records = reopened.list().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].player_id, "87654321");
        assert!(!records[0].success);

        let stats = reopened.stats().await;
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.total_likes, 100);
    }

    #[tokio::test]
    async fn test_json_file_capped_and_cleared() {
        let temp_dir = TempDir::new().unwrap();
        let history = JsonFileHistory::new(temp_dir.path().join("history.json"), 2);

        for id in ["10000001", "10000002", "10000003"] {
            history.push(record(id, 0, 1)).await.unwrap();
        }
        assert_eq!(history.list().await.len(), 2);

        history.clear().await.unwrap();
        assert!(history.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_json_file_unwritable_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be.
        let path = temp_dir.path().join("history.json");
        std::fs::create_dir(&path).unwrap();
        let history = JsonFileHistory::new(&path, 10);

        assert!(history.record(record("12345678", 0, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_json_file_unreadable_history_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        let truncated = r#"[{"id":"old-record""#;
        std::fs::write(&path, truncated).unwrap();
        let history = JsonFileHistory::new(path.clone(), 10);

        let err = history.record(record("12345678", 500, 600)).await.unwrap_err();

        assert!(matches!(err, StorageError::Serialization(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), truncated);
    }
}
