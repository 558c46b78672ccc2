//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::extract::ExtractedItem;
use crate::storage::{ItemQuery, ItemStats, SessionRecord, SessionStatus, StoredItem};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Item not found: {0}")]
    NotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for extracted records
///
/// The crawler depends only on this trait. Implementations must enforce URL
/// uniqueness and be safe to call from several page tasks at once.
pub trait ItemSink: Send + Sync {
    /// Inserts the item or updates the row that already has its URL
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A new row was created
    /// * `Ok(false)` - An existing row was updated
    fn upsert_by_url(&self, item: &ExtractedItem) -> StorageResult<bool>;
}

/// Trait for storage backend implementations
///
/// Adds the read side and crawl session history on top of [`ItemSink`].
pub trait Storage: ItemSink {
    // ===== Item Queries =====

    /// Lists items with paging and sorting
    ///
    /// # Returns
    ///
    /// The page of items and the total row count
    fn list_items(&self, query: &ItemQuery) -> StorageResult<(Vec<StoredItem>, usize)>;

    /// Case-insensitive substring search over title and description, newest first
    fn search_items(
        &self,
        text: &str,
        limit: i64,
        offset: i64,
    ) -> StorageResult<(Vec<StoredItem>, usize)>;

    /// Gets an item by ID
    fn get_item(&self, id: i64) -> StorageResult<StoredItem>;

    /// Gets an item by its URL
    fn get_item_by_url(&self, url: &str) -> StorageResult<Option<StoredItem>>;

    /// Counts items and reports the most recent scrape time
    fn item_stats(&self) -> StorageResult<ItemStats>;

    // ===== Session History =====

    /// Records the start of a crawl session
    ///
    /// # Returns
    ///
    /// The ID of the newly created session
    fn create_session(
        &self,
        start_url: &str,
        max_depth: u32,
        config_hash: &str,
    ) -> StorageResult<i64>;

    /// Marks a session finished with its final status and item count
    fn complete_session(
        &self,
        session_id: i64,
        status: SessionStatus,
        items_processed: usize,
    ) -> StorageResult<()>;

    /// Gets the most recent session
    fn get_latest_session(&self) -> StorageResult<Option<SessionRecord>>;

    /// Lists sessions, newest first
    fn list_sessions(&self, limit: i64) -> StorageResult<Vec<SessionRecord>>;
}
