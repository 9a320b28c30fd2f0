//! Project-wide constants.

use std::path::PathBuf;

pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default completion model when the caller does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Hard-coded endpoint fallback, the last link of the resolution chain.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";

/// Environment variable consulted between the explicit override and the
/// configured production URL.
pub const API_URL_ENV: &str = "BURNISH_API_URL";

/// Default number of records returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Hard cap on records per history query.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Default database path: `~/.burnish/burnish.db`.
/// Single DB for settings and the audit log.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .expect("cannot determine home directory")
        .join(".burnish")
        .join("burnish.db")
}
