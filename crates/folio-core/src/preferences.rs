//! [`PreferencesStore`] — display and navigation state of the admin shell.
//!
//! Theme and text direction survive restarts through a
//! [`PreferenceStorage`] backend; everything else lives for the session only.

use std::{str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::{runtime::Handle, sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  observer::{Subscribers, Subscription},
  storage::{DIRECTION_KEY, PreferenceStorage, THEME_KEY},
};

// ─── Values ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl Theme {
  pub fn toggled(self) -> Self {
    match self {
      Self::Light => Self::Dark,
      Self::Dark => Self::Light,
    }
  }
}

/// Text direction of the shell layout.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[default]
  Ltr,
  Rtl,
}

impl Direction {
  pub fn toggled(self) -> Self {
    match self {
      Self::Ltr => Self::Rtl,
      Self::Rtl => Self::Ltr,
    }
  }
}

/// The page the shell is showing.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Page {
  Login,
  #[default]
  Dashboard,
  ContentTypes,
  ContentManager,
  MediaLibrary,
  Settings,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Immutable preferences snapshot handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
  pub theme:        Theme,
  pub direction:    Direction,
  pub sidebar_open: bool,
  pub page:         Page,
  pub busy:         bool,
  pub error:        Option<String>,
  /// Signed-in user name. Not an authorization boundary.
  pub user:         Option<String>,
}

impl Default for Preferences {
  fn default() -> Self {
    Self {
      theme:        Theme::default(),
      direction:    Direction::default(),
      sidebar_open: true,
      page:         Page::default(),
      busy:         false,
      error:        None,
      user:         None,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Owner of the [`Preferences`] snapshot.
///
/// Transitions never fail. Theme and direction changes are written to the
/// backend in the background; a failed write is logged and otherwise
/// ignored, the in-memory value stays authoritative.
pub struct PreferencesStore<S> {
  storage:     S,
  state:       Arc<Preferences>,
  subscribers: Subscribers<Preferences>,
  /// Most recent background write. Each write waits for the one before it,
  /// so the backend sees values in the order they were set.
  last_write:  Option<JoinHandle<()>>,
}

impl<S: PreferenceStorage> PreferencesStore<S> {
  /// Build the initial snapshot from `storage`. Missing, malformed, or
  /// unreadable values fall back to their defaults.
  pub async fn open(storage: S) -> Self {
    let initial = Preferences {
      theme: load(&storage, THEME_KEY).await,
      direction: load(&storage, DIRECTION_KEY).await,
      ..Preferences::default()
    };
    Self::with_state(storage, initial)
  }

  /// Start from `initial` without reading the backend.
  pub fn with_state(storage: S, initial: Preferences) -> Self {
    Self {
      storage,
      state: Arc::new(initial),
      subscribers: Subscribers::default(),
      last_write: None,
    }
  }

  pub fn snapshot(&self) -> Arc<Preferences> { Arc::clone(&self.state) }

  /// Receive every future snapshot until the returned handle is dropped.
  pub fn subscribe<F>(&self, listener: F) -> Subscription
  where
    F: Fn(&Arc<Preferences>) + Send + Sync + 'static,
  {
    self.subscribers.subscribe(listener)
  }

  /// Snapshots as an async stream, for consumers on another task.
  pub fn changes(&self) -> broadcast::Receiver<Arc<Preferences>> {
    self.subscribers.changes()
  }

  pub fn storage(&self) -> &S { &self.storage }

  fn commit(&mut self, change: impl FnOnce(&mut Preferences)) {
    change(Arc::make_mut(&mut self.state));
    self.subscribers.notify(&self.state);
  }

  /// Hand a write to the runtime without waiting for it.
  fn persist(&mut self, key: &'static str, value: String) {
    let Ok(handle) = Handle::try_current() else {
      warn!(key, "no async runtime, preference not persisted");
      return;
    };
    let previous = self.last_write.take();
    let write = self.storage.write(key, value);
    self.last_write = Some(handle.spawn(async move {
      if let Some(previous) = previous
        && let Err(e) = previous.await
      {
        warn!(error = %e, "previous preference write task failed");
      }
      match write.await {
        Ok(()) => debug!(key, "preference persisted"),
        Err(e) => warn!(key, error = %e, "failed to persist preference"),
      }
    }));
  }

  /// Wait for every background write issued so far.
  pub async fn settled(&mut self) {
    if let Some(last) = self.last_write.take()
      && let Err(e) = last.await
    {
      warn!(error = %e, "preference write task failed");
    }
  }

  // ── Persisted ─────────────────────────────────────────────────────────────

  pub fn set_theme(&mut self, theme: Theme) {
    self.commit(|p| p.theme = theme);
    self.persist(THEME_KEY, theme.to_string());
  }

  pub fn toggle_theme(&mut self) {
    let theme = self.state.theme.toggled();
    self.set_theme(theme);
  }

  pub fn set_direction(&mut self, direction: Direction) {
    self.commit(|p| p.direction = direction);
    self.persist(DIRECTION_KEY, direction.to_string());
  }

  pub fn toggle_direction(&mut self) {
    let direction = self.state.direction.toggled();
    self.set_direction(direction);
  }

  // ── Session only ──────────────────────────────────────────────────────────

  pub fn toggle_sidebar(&mut self) {
    self.commit(|p| p.sidebar_open = !p.sidebar_open);
  }

  pub fn set_current_page(&mut self, page: Page) {
    self.commit(|p| p.page = page);
  }

  pub fn set_busy(&mut self, busy: bool) { self.commit(|p| p.busy = busy); }

  pub fn set_error(&mut self, error: Option<String>) {
    self.commit(|p| p.error = error);
  }

  /// Accepts any non-empty credentials and moves to the dashboard.
  pub fn sign_in(&mut self, username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
      let err = Error::InvalidCredentials;
      self.commit(|p| p.error = Some(err.to_string()));
      return Err(err);
    }
    let user = username.to_owned();
    self.commit(|p| {
      p.user = Some(user);
      p.error = None;
      p.page = Page::Dashboard;
    });
    Ok(())
  }

  pub fn sign_out(&mut self) {
    self.commit(|p| {
      p.user = None;
      p.page = Page::Login;
    });
  }
}

async fn load<S, T>(storage: &S, key: &'static str) -> T
where
  S: PreferenceStorage,
  T: FromStr + Default,
{
  match storage.read(key).await {
    Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
      warn!(key, value = %raw, "unrecognised stored preference, using default");
      T::default()
    }),
    Ok(None) => T::default(),
    Err(e) => {
      warn!(key, error = %e, "failed to read preference, using default");
      T::default()
    }
  }
}
