//! The decoupled audit write path.
//!
//! [`AuditWriter::record`] enqueues and returns immediately; a single
//! worker task owns the store and performs the writes. A failed write is
//! warned about and dropped — the enhancement response never waits on, or
//! learns about, the log.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{AuditEntry, AuditLog};

pub struct AuditWriter {
    tx: mpsc::UnboundedSender<AuditEntry>,
    handle: JoinHandle<()>,
}

impl AuditWriter {
    /// Spawn the worker that drains entries into `store`.
    pub fn spawn(store: Arc<dyn AuditLog>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditEntry>();
        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = store.log(entry).await {
                    warn!("failed to log enhancement: {e:#}");
                }
            }
        });
        Self { tx, handle }
    }

    /// Enqueue one transaction. Never blocks and never fails the caller;
    /// if the worker is gone the entry is dropped.
    pub fn record(&self, entry: AuditEntry) {
        let _ = self.tx.send(entry);
    }

    /// Close the queue and wait for pending writes to land.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sqlite::SqliteAuditLog;
    use anyhow::bail;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl AuditLog for FailingStore {
        async fn log(&self, _entry: AuditEntry) -> anyhow::Result<()> {
            bail!("disk on fire")
        }

        async fn history(
            &self,
            _user_id: Option<&str>,
            _limit: usize,
        ) -> anyhow::Result<Vec<crate::audit::AuditRecord>> {
            bail!("disk on fire")
        }
    }

    fn entry(prompt: &str) -> AuditEntry {
        AuditEntry {
            user_id: None,
            raw_prompt: prompt.to_string(),
            enhanced: "enhanced".to_string(),
            model: None,
        }
    }

    #[tokio::test]
    async fn recorded_entries_land_in_the_store() {
        let store = Arc::new(SqliteAuditLog::in_memory().unwrap());
        let writer = AuditWriter::spawn(store.clone());

        writer.record(entry("one"));
        writer.record(entry("two"));
        writer.shutdown().await;

        let records = store.history(None, 50).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn store_failure_is_contained() {
        let writer = AuditWriter::spawn(Arc::new(FailingStore));

        writer.record(entry("doomed"));
        // The worker must survive the failure and keep draining.
        writer.record(entry("also doomed"));
        writer.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_with_empty_queue_returns() {
        let store = Arc::new(SqliteAuditLog::in_memory().unwrap());
        let writer = AuditWriter::spawn(store.clone());
        writer.shutdown().await;

        assert!(store.history(None, 50).await.unwrap().is_empty());
    }
}
