//! Database module for `SQLite` storage of the session key/value pairs

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

use crate::paths;
use crate::session::SessionStore;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_path(&path)
    }

    /// Open or create the database at a specific path
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database")?;

        let db = Self { conn };
        db.init()?;

        Ok(db)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        paths::database_path()
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    /// Read a session value
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a session value
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO session (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a session value
    pub fn remove_value(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM session WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl SessionStore for Database {
    fn get(&self, key: &str) -> Option<String> {
        match self.get_value(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read session key {}: {}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = self.set_value(key, value) {
            tracing::warn!("Failed to write session key {}: {}", key, e);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.remove_value(key) {
            tracing::warn!("Failed to remove session key {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{KEY_TOKEN, Session};
    use tempfile::tempdir;

    #[test]
    fn test_database_init() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let _db = Database::open_path(&path).unwrap();
    }

    #[test]
    fn test_value_crud() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.get_value("theme").unwrap().is_none());
        db.set_value("theme", "light").unwrap();
        db.set_value("theme", "dark").unwrap();
        assert_eq!(db.get_value("theme").unwrap().as_deref(), Some("dark"));

        db.remove_value("theme").unwrap();
        assert!(db.get_value("theme").unwrap().is_none());
        db.remove_value("theme").unwrap();
    }

    #[test]
    fn test_session_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sqlite");

        {
            let mut session = Session::restore(Database::open_path(&path).unwrap());
            session.login("alice", Some("jwt-abc"));
            session.toggle_theme();
        }

        let mut session = Session::restore(Database::open_path(&path).unwrap());
        assert!(session.is_authenticated());
        assert_eq!(session.username(), "alice");
        assert_eq!(session.token().as_deref(), Some("jwt-abc"));

        session.logout();
        drop(session);

        let db = Database::open_path(&path).unwrap();
        assert!(db.get_value(KEY_TOKEN).unwrap().is_none());
        assert_eq!(db.get_value("theme").unwrap().as_deref(), Some("dark"));
    }
}
