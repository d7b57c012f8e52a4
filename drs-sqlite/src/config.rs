//! Where the daterange service keeps its interval rows.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage settings for the interval table.
///
/// With no `database_path` the rows live in an in-memory database and are
/// gone when the process exits, which suits tests and quick demos.
///
/// ```
/// use drs_sqlite::config::SqliteConfig;
/// use std::path::PathBuf;
///
/// let scratch = SqliteConfig::default();
/// assert!(scratch.database_path.is_none());
///
/// let persistent = SqliteConfig {
///     database_path: Some(PathBuf::from("/var/lib/drserver/daterange.db")),
///     create_if_missing: true,
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    /// Path of the daterange database file. Unset means in-memory.
    pub database_path: Option<PathBuf>,

    /// Create the database file on first start.
    /// When false, a missing file is a startup error.
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            create_if_missing: true,
        }
    }
}
