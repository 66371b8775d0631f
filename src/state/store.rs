use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the store inside the data directory
const STORE_FILE: &str = "artvibe.db";

/// Errors raised by a store backend or while serializing a value
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw text storage behind a [`LocalStore`]
///
/// Values are opaque strings; serialization happens one layer up so any
/// backend (SQLite file, memory, ...) can be swapped in without touching
/// the gallery code.
pub trait StoreBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// SQLite-backed key/value table.
///
/// The database file is created in the user's data directory:
/// - Linux: ~/.local/share/artvibe/artvibe.db
/// - macOS: ~/Library/Application Support/artvibe/artvibe.db
/// - Windows: %APPDATA%\artvibe\artvibe.db
pub struct SqliteBackend {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteBackend {
    /// Open (or create) the store file inside `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join(STORE_FILE);
        let conn = Connection::open(&db_path)?;

        let backend = SqliteBackend { conn, db_path };
        backend.init_schema()?;

        tracing::info!("📁 Store initialized at: {}", backend.path().display());

        Ok(backend)
    }

    /// Creates the key/value table if it doesn't exist.
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key         TEXT PRIMARY KEY NOT NULL,
                value       TEXT NOT NULL,
                updated_at  INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl StoreBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Last write wins
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Volatile backend, used when the store file can't be opened and in tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RefCell<HashMap<String, String>>,
}

impl StoreBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Namespaced JSON persistence on top of a [`StoreBackend`]
///
/// Every value is serialized whole on each write. Reads never fail: a
/// missing or unreadable value yields the caller's default.
pub struct LocalStore {
    backend: Box<dyn StoreBackend>,
    namespace: String,
}

impl LocalStore {
    pub fn new(backend: Box<dyn StoreBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// Store backed by the SQLite file in `data_dir`, or memory if that fails
    pub fn open_or_memory(data_dir: &Path, namespace: &str) -> Self {
        match SqliteBackend::open(data_dir) {
            Ok(backend) => Self::new(Box::new(backend), namespace),
            Err(e) => {
                tracing::warn!(
                    "⚠️  Could not open store in {}: {}. Gallery will not survive a restart.",
                    data_dir.display(),
                    e
                );
                Self::in_memory(namespace)
            }
        }
    }

    pub fn in_memory(namespace: &str) -> Self {
        Self::new(Box::<MemoryBackend>::default(), namespace)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}-{}", self.namespace, key)
    }

    /// Read and deserialize the value under `key`, falling back to `default`
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let full_key = self.full_key(key);

        let text = match self.backend.get(&full_key) {
            Ok(Some(text)) => text,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key = %full_key, "store read failed, using default: {e}");
                return default;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key = %full_key, "stored value unreadable, using default: {e}");
                default
            }
        }
    }

    /// Serialize `value` and store it under `key`, replacing any prior value
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let text = serde_json::to_string(value)?;
        self.backend.set(&self.full_key(key), &text)
    }

    /// Raw access for tests that need to inspect the stored text
    #[cfg(test)]
    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("namespace", &self.namespace)
            .finish()
    }
}
