//! Best-effort persistence of each enhancement transaction.
//!
//! Writes go through [`writer::AuditWriter`], a queue the response path
//! never waits on. Reads serve the history query and are the one place a
//! storage failure is allowed to surface.

pub mod sqlite;
pub mod writer;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A transaction handed to the writer. The store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: Option<String>,
    pub raw_prompt: String,
    pub enhanced: String,
    pub model: Option<String>,
}

/// A persisted transaction, as returned by history queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: Option<String>,
    pub raw_prompt: String,
    pub enhanced: String,
    pub model: Option<String>,
    pub created_at: String,
}

/// Where enhancement transactions land. Could be SQLite, or a test double.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one transaction.
    async fn log(&self, entry: AuditEntry) -> Result<()>;

    /// Newest first, at most `limit` records, optionally scoped to one
    /// user. Callers clamp `limit` before it gets here.
    async fn history(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<AuditRecord>>;
}
