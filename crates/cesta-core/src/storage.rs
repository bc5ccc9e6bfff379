//! Durable key-value storage for client-side state.
//!
//! Corrections and UI preferences are stored as JSON strings under fixed
//! keys. The core only needs `get` / `set` / `remove`; what sits behind them
//! is up to the caller.

use std::collections::HashMap;

use crate::error::CestaError;

/// String key-value storage that survives restarts.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, CestaError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), CestaError>;

    fn remove(&mut self, key: &str) -> Result<(), CestaError>;
}

/// Volatile store, for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CestaError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CestaError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), CestaError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Load and parse a JSON value, treating a missing key, unreadable storage
/// or malformed JSON as `T::default()`.
pub fn load_json_or_default<S, T>(store: &S, key: &str) -> T
where
    S: KeyValueStore + ?Sized,
    T: serde::de::DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value");
            return T::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Ignoring malformed stored JSON");
        T::default()
    })
}

/// Serialize a value as JSON and store it under `key`.
pub fn save_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), CestaError>
where
    S: KeyValueStore + ?Sized,
    T: serde::Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "sqlite")]
mod sqlite {
    use std::path::Path;

    use rusqlite::{params, Connection, OptionalExtension};

    use super::KeyValueStore;
    use crate::error::CestaError;

    const SCHEMA_V1: &str = "
        CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
    ";

    /// SQLite-backed key-value store.
    pub struct SqliteStore {
        conn: Connection,
    }

    impl SqliteStore {
        /// Open (or create) the database at the given path and run migrations.
        pub fn open(path: &Path) -> Result<Self, CestaError> {
            let conn = Connection::open(path)?;
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            run_migrations(&conn)?;
            Ok(Self { conn })
        }

        /// Open an in-memory database (for tests).
        pub fn open_memory() -> Result<Self, CestaError> {
            let conn = Connection::open_in_memory()?;
            run_migrations(&conn)?;
            Ok(Self { conn })
        }

        /// All stored keys, sorted.
        pub fn keys(&self) -> Result<Vec<String>, CestaError> {
            let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        }
    }

    impl KeyValueStore for SqliteStore {
        fn get(&self, key: &str) -> Result<Option<String>, CestaError> {
            self.conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(Into::into)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), CestaError> {
            self.conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), CestaError> {
            self.conn
                .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        }
    }

    fn run_migrations(conn: &Connection) -> Result<(), CestaError> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version < 1 {
            conn.execute_batch(SCHEMA_V1)?;
            conn.execute_batch("PRAGMA user_version = 1;")?;
            tracing::info!("Applied storage migration v1");
        }

        Ok(())
    }
}
