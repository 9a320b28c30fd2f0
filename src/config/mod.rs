//! Key-value settings storage backed by SQLite, plus the endpoint
//! resolution chain.
//!
//! Shares a database with the audit log
//! ([`SqliteAuditLog`](crate::audit::sqlite::SqliteAuditLog)) — pass the
//! same path to both.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::consts::{API_URL_ENV, DEFAULT_API_BASE_URL};

/// Explicit endpoint override; first link of the resolution chain.
pub const KEY_API_BASE_URL: &str = "api_base_url";
/// Fallback endpoint consulted after the environment.
pub const KEY_PRODUCTION_API_URL: &str = "production_api_url";
/// Preferred completion model.
pub const KEY_MODEL: &str = "model";

/// Keys the CLI accepts for `config set` and friends.
pub const SETTING_KEYS: &[&str] = &[KEY_API_BASE_URL, KEY_PRODUCTION_API_URL, KEY_MODEL];

/// Persistent key-value settings store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open settings database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a setting by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a setting (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a setting.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// All stored settings, sorted by key.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key ASC")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Resolve the enhancement endpoint from this store plus the process
    /// environment. See [`resolve_base_url`] for the chain.
    pub fn resolve_api_base_url(&self) -> Result<String> {
        Ok(resolve_base_url(
            self.get(KEY_API_BASE_URL)?,
            std::env::var(API_URL_ENV).ok(),
            self.get(KEY_PRODUCTION_API_URL)?,
        ))
    }
}

/// The endpoint resolution chain. First non-empty value wins: the explicit
/// override, then the environment, then the configured production URL,
/// then the hard-coded default. Trailing slashes are stripped so callers
/// can append paths directly.
pub fn resolve_base_url(
    override_url: Option<String>,
    env_url: Option<String>,
    production_url: Option<String>,
) -> String {
    [override_url, env_url, production_url]
        .into_iter()
        .flatten()
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_config() -> Config {
        Config::open(":memory:").unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let config = mem_config();
        assert!(config.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let config = mem_config();
        config.set(KEY_MODEL, "gpt-4o-mini").unwrap();
        assert_eq!(config.get(KEY_MODEL).unwrap().unwrap(), "gpt-4o-mini");
    }

    #[test]
    fn set_overwrites_existing() {
        let config = mem_config();
        config.set(KEY_MODEL, "old").unwrap();
        config.set(KEY_MODEL, "new").unwrap();
        assert_eq!(config.get(KEY_MODEL).unwrap().unwrap(), "new");
    }

    #[test]
    fn remove_deletes_key() {
        let config = mem_config();
        config.set(KEY_MODEL, "test").unwrap();
        config.remove(KEY_MODEL).unwrap();
        assert!(config.get(KEY_MODEL).unwrap().is_none());
    }

    #[test]
    fn remove_nonexistent_is_ok() {
        let config = mem_config();
        config.remove("nonexistent").unwrap();
    }

    #[test]
    fn entries_sorted_by_key() {
        let config = mem_config();
        config.set(KEY_PRODUCTION_API_URL, "https://api.example").unwrap();
        config.set(KEY_MODEL, "gpt-4o").unwrap();

        let entries = config.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, KEY_MODEL);
        assert_eq!(entries[1].0, KEY_PRODUCTION_API_URL);
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings-test.db");
        let path_str = path.to_str().unwrap();

        {
            let config = Config::open(path_str).unwrap();
            config.set(KEY_MODEL, "persisted").unwrap();
        }

        {
            let config = Config::open(path_str).unwrap();
            assert_eq!(config.get(KEY_MODEL).unwrap().unwrap(), "persisted");
        }
    }

    #[test]
    fn chain_override_wins() {
        let url = resolve_base_url(
            Some("http://localhost:4000".into()),
            Some("http://env.example".into()),
            Some("https://prod.example".into()),
        );
        assert_eq!(url, "http://localhost:4000");
    }

    #[test]
    fn chain_env_beats_production() {
        let url = resolve_base_url(
            None,
            Some("http://env.example".into()),
            Some("https://prod.example".into()),
        );
        assert_eq!(url, "http://env.example");
    }

    #[test]
    fn chain_production_when_rest_unset() {
        let url = resolve_base_url(None, None, Some("https://example.test".into()));
        assert_eq!(url, "https://example.test");
    }

    #[test]
    fn chain_falls_through_to_default() {
        assert_eq!(resolve_base_url(None, None, None), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn chain_skips_empty_and_whitespace_links() {
        let url = resolve_base_url(
            Some("   ".into()),
            Some(String::new()),
            Some("https://example.test".into()),
        );
        assert_eq!(url, "https://example.test");
    }

    #[test]
    fn chain_strips_trailing_slash() {
        let url = resolve_base_url(Some("https://example.test/".into()), None, None);
        assert_eq!(url, "https://example.test");
    }
}
