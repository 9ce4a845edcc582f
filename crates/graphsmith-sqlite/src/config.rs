//! SQLite connection configuration

use std::path::{Path, PathBuf};

/// Configuration for a SQLite database connection
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:` for an in-memory database
    pub path: PathBuf,
    /// Enable WAL journal mode (multiple readers, single writer)
    pub wal_mode: bool,
    /// Enforce foreign key constraints
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds before a locked database errors
    pub busy_timeout_ms: u32,
}

impl SqliteConfig {
    /// Configuration for a file-backed database with default pragmas
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
        }
    }

    /// Configuration for an in-memory database (tests, scratch runs)
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            // WAL is meaningless for in-memory databases
            wal_mode: false,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
        }
    }
}
