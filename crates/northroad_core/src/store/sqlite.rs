//! SQLite-backed keyed-document store.
//!
//! # Responsibility
//! - Persist one JSON body per collection key in the `documents` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Writes are single-statement upserts; a failed write leaves the prior
//!   body intact.
//! - Connections are migrated before first use (see `db::open`).

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::store::{CollectionKey, DocumentStore, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Document store over one migrated SQLite connection.
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn read_document(&self, key: CollectionKey) -> StoreResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn write_document(&self, key: CollectionKey, body: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO documents (key, body, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![key.as_str(), body],
        )?;
        Ok(())
    }
}
