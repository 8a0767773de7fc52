use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;

/// Keys under which the application persists its state
pub mod keys {
    pub const MOOD_ENTRIES: &str = "moodEntries";
    pub const EVENTS: &str = "events";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const USER_PREFERENCES: &str = "userPreferences";
    pub const AUTH: &str = "auth";
    pub const USERS: &str = "users";

    /// Key of the credential marker stored for `email`
    pub fn password(email: &str) -> String {
        format!("password_{}", email)
    }

    /// Key holding the last unreadable copy of `key`
    pub fn malformed(key: &str) -> String {
        format!("{}_malformed", key)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create storage directory: {0}")]
    DirectoryError(String),
    #[error("Failed to serialize value for '{key}': {source}")]
    SerializeError {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed value under '{key}': {source}")]
    MalformedValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store backed by a single SQLite table
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the store at `path` and initialize the schema
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let db_path = PathBuf::from(path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Open a throwaway in-memory store
    pub fn in_memory() -> Result<Self, StorageError> {
        let storage = Storage { conn: Connection::open_in_memory()? };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Raw string stored under `key`, if any
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace the string stored under `key`
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![
                key,
                value,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        log::debug!("persisted '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM storage WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }

    /// Decode the JSON value under `key`.
    ///
    /// `Ok(None)` when the key is absent; `MalformedValue` when it holds
    /// something that does not parse as `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::MalformedValue { key: key.to_string(), source }),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|source| StorageError::SerializeError { key: key.to_string(), source })?;
        self.set_item(key, &raw)
    }
}
