//! Lorekeeper Storage Layer
//!
//! Implements the `EntryStore` trait on SQLite and keeps resumable import
//! checkpoints alongside the entries.
//!
//! # Examples
//!
//! ```
//! use lorekeeper_domain::traits::EntryStore;
//! use lorekeeper_domain::{Category, KnowledgeEntry};
//! use lorekeeper_store::SqliteStore;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! let id = store
//!     .insert_entry(KnowledgeEntry::with_content(Category::Location, "Harbor", vec![], "Foggy."))
//!     .unwrap();
//! assert!(store.get_entry(id).unwrap().is_some());
//! ```

#![warn(missing_docs)]

use lorekeeper_domain::traits::EntryStore;
use lorekeeper_domain::{Category, EntryId, KnowledgeEntry};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const ENTRY_COLUMNS: &str = "id, category, title, keywords, details";

/// SQLite-based implementation of EntryStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn id_to_bytes(id: EntryId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_id(bytes: &[u8]) -> Result<EntryId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for EntryId, got {}", bytes.len()))
        })?;
        Ok(EntryId::from_value(u128::from_be_bytes(arr)))
    }

    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn conversion_error(
        column: usize,
        kind: rusqlite::types::Type,
        e: impl std::error::Error + Send + Sync + 'static,
    ) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(column, kind, Box::new(e))
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
        use rusqlite::types::Type;

        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes)
            .map_err(|e| Self::conversion_error(0, Type::Blob, e))?;

        let category: String = row.get(1)?;
        let category = Category::from_exact(&category).ok_or_else(|| {
            Self::conversion_error(
                1,
                Type::Text,
                StoreError::InvalidData(format!("Unknown category: {}", category)),
            )
        })?;

        let keywords: String = row.get(3)?;
        let keywords = serde_json::from_str::<Vec<String>>(&keywords)
            .map_err(|e| Self::conversion_error(3, Type::Text, e))?;

        let details: String = row.get(4)?;
        let details = serde_json::from_str::<BTreeMap<String, String>>(&details)
            .map_err(|e| Self::conversion_error(4, Type::Text, e))?;

        Ok(KnowledgeEntry {
            id,
            category,
            title: row.get(2)?,
            keywords,
            details,
        })
    }

    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<KnowledgeEntry>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Entries of `category` whose title equals `title`
    pub fn find_by_title(
        &self,
        category: Category,
        title: &str,
    ) -> Result<Vec<KnowledgeEntry>, StoreError> {
        self.query_entries(
            &format!(
                "SELECT {} FROM entries WHERE category = ?1 AND title = ?2 ORDER BY id",
                ENTRY_COLUMNS
            ),
            params![category.as_str(), title],
        )
    }

    /// Number of stored entries
    pub fn count_entries(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Persist `state` under `key`, replacing any previous value
    pub fn save_checkpoint<T: Serialize>(&mut self, key: &str, state: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO checkpoints (key, value, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, saved_at = excluded.saved_at",
            params![key, json, Self::now_millis()],
        )?;
        debug!("Saved checkpoint '{}' ({} bytes)", key, json.len());
        Ok(())
    }

    /// Load the state stored under `key`
    pub fn load_checkpoint<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM checkpoints WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| serde_json::from_str(&j).map_err(StoreError::from))
            .transpose()
    }

    /// Drop the state stored under `key`; returns whether it existed
    pub fn clear_checkpoint(&mut self, key: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM checkpoints WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}

impl EntryStore for SqliteStore {
    type Error = StoreError;

    fn list_entries(&self) -> Result<Vec<KnowledgeEntry>, Self::Error> {
        self.query_entries(
            &format!("SELECT {} FROM entries ORDER BY id", ENTRY_COLUMNS),
            [],
        )
    }

    fn list_by_category(&self, category: Category) -> Result<Vec<KnowledgeEntry>, Self::Error> {
        self.query_entries(
            &format!(
                "SELECT {} FROM entries WHERE category = ?1 ORDER BY id",
                ENTRY_COLUMNS
            ),
            params![category.as_str()],
        )
    }

    fn get_entry(&self, id: EntryId) -> Result<Option<KnowledgeEntry>, Self::Error> {
        let mut entries = self.query_entries(
            &format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS),
            params![Self::id_to_bytes(id)],
        )?;
        Ok(entries.pop())
    }

    fn insert_entry(&mut self, entry: KnowledgeEntry) -> Result<EntryId, Self::Error> {
        self.conn.execute(
            "INSERT INTO entries (id, category, title, keywords, details, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Self::id_to_bytes(entry.id),
                entry.category.as_str(),
                &entry.title,
                serde_json::to_string(&entry.keywords)?,
                serde_json::to_string(&entry.details)?,
                Self::now_millis(),
            ],
        )?;
        Ok(entry.id)
    }

    fn update_entry(&mut self, entry: &KnowledgeEntry) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE entries SET category = ?2, title = ?3, keywords = ?4, details = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                Self::id_to_bytes(entry.id),
                entry.category.as_str(),
                &entry.title,
                serde_json::to_string(&entry.keywords)?,
                serde_json::to_string(&entry.details)?,
                Self::now_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(entry.id.to_string()));
        }
        Ok(())
    }

    fn remove_entry(&mut self, id: EntryId) -> Result<bool, Self::Error> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![Self::id_to_bytes(id)])?;
        Ok(removed > 0)
    }
}
