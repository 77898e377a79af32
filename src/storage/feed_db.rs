use rusqlite::{Result as SqlResult, Row, params};
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use super::database::Database;

/// One child of a feed path, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRow {
    pub seq: i64,
    pub key: String,
    pub value: String,
    pub revision: i64,
    pub created_at: i64,
}

impl FeedRow {
    fn from_row(row: &Row<'_>) -> SqlResult<Self> {
        Ok(Self {
            seq: row.get(0)?,
            key: row.get(1)?,
            value: row.get(2)?,
            revision: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// Cheap fingerprint of a feed path. Equal summaries mean nothing under the
/// path was added, edited or removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub count: usize,
    pub max_seq: i64,
    pub revisions: i64,
}

/// Ordered, append-only store of feed children shared by every client
/// that opens the same file.
pub struct FeedDatabase {
    db: Database,
}

impl FeedDatabase {
    /// Open (or create) the feed database at `path`
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let db = Database::new(path)?;
        let feed_db = Self { db };
        feed_db.init_schema()?;
        Ok(feed_db)
    }

    #[cfg(test)]
    pub fn in_memory() -> SqlResult<Self> {
        let feed_db = Self {
            db: Database::in_memory()?,
        };
        feed_db.init_schema()?;
        Ok(feed_db)
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = self.db.connection();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS children (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL,
                key TEXT NOT NULL UNIQUE,
                value TEXT NOT NULL,
                revision INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_children_path_seq ON children(path, seq)",
            [],
        )?;

        Ok(())
    }

    /// Append `value` under `path`, returning the stored row with its generated key
    pub fn push(&self, path: &str, value: &str) -> SqlResult<FeedRow> {
        let conn = self.db.connection();
        let key = Uuid::new_v4().simple().to_string();
        let created_at = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO children (path, key, value, revision, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![path, key, value, created_at],
        )?;

        Ok(FeedRow {
            seq: conn.last_insert_rowid(),
            key,
            value: value.to_string(),
            revision: 0,
            created_at,
        })
    }

    /// All children of `path`, oldest first
    pub fn children(&self, path: &str) -> SqlResult<Vec<FeedRow>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare_cached(
            "SELECT seq, key, value, revision, created_at
             FROM children
             WHERE path = ?1
             ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map(params![path], FeedRow::from_row)?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// Children of `path` appended after `seq`, oldest first
    pub fn children_after(&self, path: &str, seq: i64) -> SqlResult<Vec<FeedRow>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare_cached(
            "SELECT seq, key, value, revision, created_at
             FROM children
             WHERE path = ?1 AND seq > ?2
             ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map(params![path, seq], FeedRow::from_row)?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn summary(&self, path: &str) -> SqlResult<FeedSummary> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare_cached(
            "SELECT COUNT(*), COALESCE(MAX(seq), 0), COALESCE(SUM(revision), 0)
             FROM children
             WHERE path = ?1",
        )?;

        stmt.query_row(params![path], |row| {
            let count: i64 = row.get(0)?;
            Ok(FeedSummary {
                count: count as usize,
                max_seq: row.get(1)?,
                revisions: row.get(2)?,
            })
        })
    }

    /// Number of children under `path`
    pub fn count(&self, path: &str) -> SqlResult<usize> {
        let conn = self.db.connection();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM children WHERE path = ?1",
            params![path],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
