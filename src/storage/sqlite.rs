//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! The connection sits behind a mutex so page tasks can upsert concurrently
//! through a shared `Arc<SqliteStorage>`.

use crate::extract::ExtractedItem;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ItemSink, Storage, StorageError, StorageResult};
use crate::storage::{
    clamp_limit, ItemQuery, ItemStats, SessionRecord, SessionStatus, StoredItem,
    DEFAULT_SEARCH_LIMIT,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const ITEM_COLUMNS: &str =
    "id, title, description, url, image_url, price, scraped_at, metadata, created_at, updated_at";

const SESSION_COLUMNS: &str =
    "id, start_url, max_depth, started_at, finished_at, status, config_hash, items_processed";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened database at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

/// Formats a timestamp so that text order matches time order
fn to_db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_db_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<StoredItem> {
    let metadata_raw: String = row.get(7)?;
    let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(StoredItem {
        id: row.get(0)?,
        item: ExtractedItem {
            title: row.get(1)?,
            description: row.get(2)?,
            url: row.get(3)?,
            image_url: row.get(4)?,
            price: row.get(5)?,
            scraped_at: parse_db_time(6, &row.get::<_, String>(6)?)?,
            metadata,
        },
        created_at: parse_db_time(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_db_time(9, &row.get::<_, String>(9)?)?,
    })
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let finished_at = match row.get::<_, Option<String>>(4)? {
        Some(raw) => Some(parse_db_time(4, &raw)?),
        None => None,
    };

    Ok(SessionRecord {
        id: row.get(0)?,
        start_url: row.get(1)?,
        max_depth: row.get(2)?,
        started_at: parse_db_time(3, &row.get::<_, String>(3)?)?,
        finished_at,
        status: SessionStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(SessionStatus::Failed),
        config_hash: row.get(6)?,
        items_processed: row.get::<_, i64>(7)?.max(0) as usize,
    })
}

/// Escapes LIKE wildcards so user text matches literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl ItemSink for SqliteStorage {
    fn upsert_by_url(&self, item: &ExtractedItem) -> StorageResult<bool> {
        let metadata = serde_json::to_string(&item.metadata)?;
        let now = to_db_time(Utc::now());
        let scraped_at = to_db_time(item.scraped_at);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM scraped_items WHERE url = ?1",
                params![item.url],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE scraped_items
                     SET title = ?1, description = ?2, image_url = ?3, price = ?4,
                         scraped_at = ?5, metadata = ?6, updated_at = ?7
                     WHERE id = ?8",
                    params![
                        item.title,
                        item.description,
                        item.image_url,
                        item.price,
                        scraped_at,
                        metadata,
                        now,
                        id
                    ],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO scraped_items
                     (title, description, url, image_url, price, scraped_at, metadata, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                    params![
                        item.title,
                        item.description,
                        item.url,
                        item.image_url,
                        item.price,
                        scraped_at,
                        metadata,
                        now
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(existing.is_none())
    }
}

impl Storage for SqliteStorage {
    // ===== Item Queries =====

    fn list_items(&self, query: &ItemQuery) -> StorageResult<(Vec<StoredItem>, usize)> {
        let conn = self.lock()?;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM scraped_items", [], |row| {
            row.get(0)
        })?;

        // Column and direction come from whitelisted enums, never from input
        let sql = format!(
            "SELECT {} FROM scraped_items ORDER BY {} {}, id {} LIMIT ?1 OFFSET ?2",
            ITEM_COLUMNS,
            query.sort.column(),
            query.order.as_sql(),
            query.order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![query.limit, query.offset.max(0)], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((items, total.max(0) as usize))
    }

    fn search_items(
        &self,
        text: &str,
        limit: i64,
        offset: i64,
    ) -> StorageResult<(Vec<StoredItem>, usize)> {
        let pattern = like_pattern(text.trim());
        let limit = clamp_limit(limit, DEFAULT_SEARCH_LIMIT);
        let conn = self.lock()?;

        let filter = "lower(title) LIKE ?1 ESCAPE '\\' OR lower(description) LIKE ?1 ESCAPE '\\'";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM scraped_items WHERE {}", filter),
            params![pattern],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM scraped_items WHERE {} ORDER BY scraped_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            ITEM_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![pattern, limit, offset.max(0)], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((items, total.max(0) as usize))
    }

    fn get_item(&self, id: i64) -> StorageResult<StoredItem> {
        let conn = self.lock()?;
        let item = conn
            .query_row(
                &format!("SELECT {} FROM scraped_items WHERE id = ?1", ITEM_COLUMNS),
                params![id],
                row_to_item,
            )
            .optional()?;
        item.ok_or(StorageError::NotFound(id))
    }

    fn get_item_by_url(&self, url: &str) -> StorageResult<Option<StoredItem>> {
        let conn = self.lock()?;
        let item = conn
            .query_row(
                &format!("SELECT {} FROM scraped_items WHERE url = ?1", ITEM_COLUMNS),
                params![url],
                row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    fn item_stats(&self) -> StorageResult<ItemStats> {
        let conn = self.lock()?;
        let (total, latest): (i64, Option<String>) = conn.query_row(
            "SELECT COUNT(*), MAX(scraped_at) FROM scraped_items",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let latest_scrape = match latest {
            Some(raw) => Some(parse_db_time(1, &raw)?),
            None => None,
        };

        Ok(ItemStats {
            total_items: total.max(0) as usize,
            latest_scrape,
        })
    }

    // ===== Session History =====

    fn create_session(
        &self,
        start_url: &str,
        max_depth: u32,
        config_hash: &str,
    ) -> StorageResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO crawl_sessions (start_url, max_depth, started_at, status, config_hash)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                start_url,
                max_depth,
                to_db_time(Utc::now()),
                SessionStatus::Running.to_db_string(),
                config_hash
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn complete_session(
        &self,
        session_id: i64,
        status: SessionStatus,
        items_processed: usize,
    ) -> StorageResult<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE crawl_sessions SET status = ?1, finished_at = ?2, items_processed = ?3
             WHERE id = ?4",
            params![
                status.to_db_string(),
                to_db_time(Utc::now()),
                items_processed as i64,
                session_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::Database(format!(
                "Session {} does not exist",
                session_id
            )));
        }
        Ok(())
    }

    fn get_latest_session(&self) -> StorageResult<Option<SessionRecord>> {
        let conn = self.lock()?;
        let session = conn
            .query_row(
                &format!(
                    "SELECT {} FROM crawl_sessions ORDER BY id DESC LIMIT 1",
                    SESSION_COLUMNS
                ),
                [],
                row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    fn list_sessions(&self, limit: i64) -> StorageResult<Vec<SessionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM crawl_sessions ORDER BY id DESC LIMIT ?1",
            SESSION_COLUMNS
        ))?;
        let sessions = stmt
            .query_map(params![limit.max(0)], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }
}
