//! [`SqliteStorage`] — the SQLite implementation of [`PreferenceStorage`].

use std::{future::Future, path::Path};

use chrono::Utc;
use folio_core::storage::PreferenceStorage;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

/// Preference slots backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStorage {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStorage {
  /// Open (or create) a database at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    debug!(path = %path.as_ref().display(), "opening preference database");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let storage = Self { conn };
    storage.init_schema().await?;
    Ok(storage)
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let storage = Self { conn };
    storage.init_schema().await?;
    Ok(storage)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// All stored keys, sorted.
  pub async fn keys(&self) -> Result<Vec<String>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT key FROM preferences ORDER BY key")?;
        let keys = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
      })
      .await?;
    Ok(keys)
  }
}

// ─── PreferenceStorage impl ──────────────────────────────────────────────────

impl PreferenceStorage for SqliteStorage {
  type Error = Error;

  fn read<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>>> + Send + 'a {
    let key = key.to_owned();
    async move {
      let value: Option<String> = self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              "SELECT value FROM preferences WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?)
        })
        .await?;
      Ok(value)
    }
  }

  fn write(
    &self,
    key: &'static str,
    value: String,
  ) -> impl Future<Output = Result<()>> + Send + 'static {
    let conn = self.conn.clone();
    let at = Utc::now().to_rfc3339();
    async move {
      conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
               value      = excluded.value,
               updated_at = excluded.updated_at",
            rusqlite::params![key, value, at],
          )?;
          Ok(())
        })
        .await?;
      Ok(())
    }
  }
}
