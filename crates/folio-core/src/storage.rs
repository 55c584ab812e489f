//! The `PreferenceStorage` trait and an in-memory backend.
//!
//! The trait is implemented by durable backends (e.g. `folio-store-sqlite`).
//! [`PreferencesStore`](crate::preferences::PreferencesStore) depends on this
//! abstraction, not on any concrete backend.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::{Future, ready},
  sync::{Arc, Mutex, PoisonError},
};

/// Key under which the theme is persisted.
pub const THEME_KEY: &str = "theme";
/// Key under which the text direction is persisted.
pub const DIRECTION_KEY: &str = "direction";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A durable string key-value slot store.
///
/// Writes return `'static` futures so callers can hand them off to the
/// runtime without awaiting them.
pub trait PreferenceStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`. Returns `None` if never written.
  fn read<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn write(
    &self,
    key: &'static str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// Non-durable backend for tests and embedding.
///
/// Cloning is cheap and clones share the same slots, so a store can be
/// reopened over the data an earlier instance wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  /// Synchronous read, bypassing the trait.
  pub fn get(&self, key: &str) -> Option<String> {
    self
      .slots
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }

  /// Synchronous write, bypassing the trait.
  pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
    self
      .slots
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.into(), value.into());
  }
}

impl PreferenceStorage for MemoryStorage {
  type Error = Infallible;

  fn read<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Infallible>> + Send + 'a {
    ready(Ok(self.get(key)))
  }

  fn write(
    &self,
    key: &'static str,
    value: String,
  ) -> impl Future<Output = Result<(), Infallible>> + Send + 'static {
    self.set(key, value);
    ready(Ok(()))
  }
}
