// mapty-lib/src/storage.rs
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DATA_DIR: &str = "mapty";
const DB_FILE_NAME: &str = "mapty.sqlite";
const DATA_ENV_VAR: &str = "MAPTY_DATA_DIR";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed: {0}")]
    WriteFailed(rusqlite::Error),
}

/// String key-value storage, the shape of the browser's `localStorage`.
pub trait Storage {
    /// # Errors
    /// Returns `Error` if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Overwrites the value stored under `key`.
    /// # Errors
    /// Returns `Error` if the backing store cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// `Storage` backed by a single SQLite key-value table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Wraps an open connection, creating the table if needed.
    /// # Errors
    /// Returns `Error::Connection` if the schema cannot be created.
    pub fn new(conn: Connection) -> Result<Self, Error> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// # Errors
    /// Returns `Error` if the file cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::new(open_db(path)?)
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Storage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::QueryFailed)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(Error::WriteFailed)?;
        debug!("Stored {} bytes under '{key}'", value.len());
        Ok(())
    }
}

/// Directory holding the database and the TUI log file.
/// # Errors
/// Returns `Error::DataDir` if no data directory can be determined.
pub fn get_data_dir() -> Result<PathBuf, Error> {
    let app_dir = match std::env::var(DATA_ENV_VAR) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::data_dir().ok_or(Error::DataDir)?.join(APP_DATA_DIR),
    };
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir)
}

/// # Errors
/// Returns `Error` if the data directory cannot be determined or created.
pub fn get_db_path() -> Result<PathBuf, Error> {
    Ok(get_data_dir()?.join(DB_FILE_NAME))
}

/// # Errors
/// Returns `Error::Connection` if the file cannot be opened.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// # Errors
/// Returns `Error::Connection` if the table cannot be created.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(Error::Connection)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_item_overwrites() {
        let mut storage = SqliteStorage::new(Connection::open_in_memory().unwrap()).unwrap();
        assert_eq!(storage.get_item("workouts").unwrap(), None);

        storage.set_item("workouts", "[1]").unwrap();
        storage.set_item("workouts", "[]").unwrap();
        assert_eq!(storage.get_item("workouts").unwrap().as_deref(), Some("[]"));
    }
}
