//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Upserting extracted items by URL
//! - Paged, sorted and searched item queries
//! - Crawl session history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ItemSink, Storage, StorageError, StorageResult};

use crate::extract::ExtractedItem;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Page size used when a list request gives none or an out-of-range one
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Page size used when a search request gives none or an out-of-range one
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Largest page size a query may ask for
pub const MAX_LIMIT: i64 = 1000;

/// An extracted item together with its storage identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredItem {
    pub id: i64,
    #[serde(flatten)]
    pub item: ExtractedItem,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns items may be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    ScrapedAt,
    Title,
    Price,
    Id,
}

impl SortField {
    /// Parses a sort key, accepting only whitelisted columns
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scraped_at" => Some(Self::ScrapedAt),
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::ScrapedAt => "scraped_at",
            Self::Title => "title",
            Self::Price => "price",
            Self::Id => "id",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A normalized list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemQuery {
    pub limit: i64,
    pub offset: i64,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl ItemQuery {
    /// Builds a query from raw request values
    ///
    /// Out-of-range or unknown values fall back to the defaults rather than
    /// failing: a limit outside `1..=1000` becomes 100, a negative offset
    /// becomes 0, an unknown sort key becomes `scraped_at` and an unknown
    /// order becomes `desc`.
    pub fn from_raw(limit: i64, offset: i64, sort: &str, order: &str) -> Self {
        Self {
            limit: clamp_limit(limit, DEFAULT_LIST_LIMIT),
            offset: offset.max(0),
            sort: SortField::parse(sort).unwrap_or_default(),
            order: SortOrder::parse(order).unwrap_or_default(),
        }
    }
}

/// Replaces a limit outside `1..=MAX_LIMIT` with `default`
pub fn clamp_limit(limit: i64, default: i64) -> i64 {
    if (1..=MAX_LIMIT).contains(&limit) {
        limit
    } else {
        default
    }
}

/// Aggregate item statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemStats {
    pub total_items: usize,
    pub latest_scrape: Option<DateTime<Utc>>,
}

/// Represents a crawl session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub start_url: String,
    pub max_depth: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub config_hash: String,
    pub items_processed: usize,
}

/// Status of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
