use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, params};
use std::sync::Mutex;

use super::{AuditEntry, AuditLog, AuditRecord};

/// SQLite-backed audit log. Append-only; nothing here mutates or deletes
/// existing rows.
pub struct SqliteAuditLog {
    conn: Mutex<Connection>,
}

impl SqliteAuditLog {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS enhancements (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    TEXT,
                raw_prompt TEXT NOT NULL,
                enhanced   TEXT NOT NULL,
                model      TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<AuditRecord> {
    Ok(AuditRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        raw_prompt: row.get(2)?,
        enhanced: row.get(3)?,
        model: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl AuditLog for SqliteAuditLog {
    async fn log(&self, entry: AuditEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO enhancements (user_id, raw_prompt, enhanced, model)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.user_id, entry.raw_prompt, entry.enhanced, entry.model],
        )?;
        Ok(())
    }

    async fn history(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<AuditRecord>> {
        let conn = self.conn.lock().unwrap();
        // id breaks ties within the same datetime('now') second.
        let records = match user_id {
            Some(user) => {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, raw_prompt, enhanced, model, created_at
                     FROM enhancements
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2",
                )?;
                stmt.query_map(params![user, limit as i64], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, raw_prompt, enhanced, model, created_at
                     FROM enhancements
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?1",
                )?;
                stmt.query_map(params![limit as i64], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(records)
    }
}
