//! Integration tests for `SqliteStorage` against in-memory and on-disk
//! databases.

use std::path::PathBuf;

use folio_core::{
  preferences::{Direction, PreferencesStore, Theme},
  storage::{DIRECTION_KEY, PreferenceStorage, THEME_KEY},
};

use crate::SqliteStorage;

async fn storage() -> SqliteStorage {
  SqliteStorage::open_in_memory()
    .await
    .expect("in-memory storage")
}

fn temp_db(name: &str) -> PathBuf {
  let path = std::env::temp_dir()
    .join(format!("folio-{name}-{}.sqlite", std::process::id()));
  let _ = std::fs::remove_file(&path);
  path
}

// ─── Raw slots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_missing_key_returns_none() {
  let s = storage().await;
  assert_eq!(s.read(THEME_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn write_then_read() {
  let s = storage().await;
  s.write(THEME_KEY, "dark".into()).await.unwrap();
  assert_eq!(s.read(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
}

#[tokio::test]
async fn write_overwrites_previous_value() {
  let s = storage().await;
  s.write(DIRECTION_KEY, "rtl".into()).await.unwrap();
  s.write(DIRECTION_KEY, "ltr".into()).await.unwrap();

  assert_eq!(s.read(DIRECTION_KEY).await.unwrap().as_deref(), Some("ltr"));
  assert_eq!(s.keys().await.unwrap(), vec![DIRECTION_KEY.to_string()]);
}

#[tokio::test]
async fn clones_share_the_connection() {
  let s = storage().await;
  let clone = s.clone();
  clone.write(THEME_KEY, "dark".into()).await.unwrap();
  assert_eq!(s.read(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
}

// ─── Through the preferences store ───────────────────────────────────────────

#[tokio::test]
async fn preferences_survive_reopening_the_file() {
  let path = temp_db("restart");

  {
    let s = SqliteStorage::open(&path).await.unwrap();
    let mut prefs = PreferencesStore::open(s).await;
    assert_eq!(prefs.snapshot().theme, Theme::Light);

    prefs.set_theme(Theme::Dark);
    prefs.toggle_direction();
    prefs.settled().await;
  }

  let s = SqliteStorage::open(&path).await.unwrap();
  let prefs = PreferencesStore::open(s).await;
  assert_eq!(prefs.snapshot().theme, Theme::Dark);
  assert_eq!(prefs.snapshot().direction, Direction::Rtl);

  let _ = std::fs::remove_file(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rapid_toggles_leave_storage_matching_memory() {
  for round in 0..50usize {
    let s = storage().await;
    let mut prefs = PreferencesStore::open(s.clone()).await;

    for _ in 0..(7 + round % 2) {
      prefs.toggle_theme();
    }
    prefs.settled().await;

    let stored = s.read(THEME_KEY).await.unwrap();
    let expected = prefs.snapshot().theme.to_string();
    assert_eq!(stored.as_deref(), Some(expected.as_str()), "round {round}");
  }
}

#[tokio::test]
async fn malformed_row_falls_back_to_default() {
  let s = storage().await;
  s.write(THEME_KEY, "sepia".into()).await.unwrap();

  let prefs = PreferencesStore::open(s).await;
  assert_eq!(prefs.snapshot().theme, Theme::Light);
}
