//! Content entries — stored records of a content type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field values of an entry, keyed by field name. Value shapes are not
/// checked here; see [`crate::validate`].
pub type EntryData = Map<String, Value>;

/// Publication status. Both transitions are unrestricted.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
  #[default]
  Draft,
  Published,
}

/// One stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
  pub entry_id:     Uuid,
  /// Singular name of the owning content type.
  pub content_type: String,
  pub status:       EntryStatus,
  pub data:         EntryData,
  pub created_at:   DateTime<Utc>,
  /// Never earlier than `created_at`.
  pub updated_at:   DateTime<Utc>,
}

impl ContentEntry {
  /// Apply `patch` in place and refresh `updated_at`.
  ///
  /// The data merge is shallow: patch keys overwrite, every other key is
  /// retained.
  pub(crate) fn apply(&mut self, patch: EntryPatch, now: DateTime<Utc>) {
    if let Some(status) = patch.status {
      self.status = status;
    }
    self.data.extend(patch.data);
    self.updated_at = now.max(self.updated_at);
  }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// Input to [`crate::domain::DomainStore::update_entry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPatch {
  #[serde(default)]
  pub status: Option<EntryStatus>,
  #[serde(default)]
  pub data:   EntryData,
}

impl EntryPatch {
  /// A patch that only changes the status.
  pub fn status(status: EntryStatus) -> Self {
    Self {
      status: Some(status),
      data:   EntryData::new(),
    }
  }

  /// A patch that only merges field values.
  pub fn data(data: EntryData) -> Self {
    Self { status: None, data }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Parameters for [`crate::domain::DomainStore::list_entries`]. Empty fields
/// match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
  pub content_type: Option<String>,
  pub status:       Option<EntryStatus>,
}

impl EntryFilter {
  pub fn content_type(name: impl Into<String>) -> Self {
    Self {
      content_type: Some(name.into()),
      status:       None,
    }
  }

  pub fn status(status: EntryStatus) -> Self {
    Self {
      content_type: None,
      status:       Some(status),
    }
  }

  pub fn with_status(mut self, status: EntryStatus) -> Self {
    self.status = Some(status);
    self
  }

  pub fn matches(&self, entry: &ContentEntry) -> bool {
    self
      .content_type
      .as_deref()
      .is_none_or(|name| entry.content_type == name)
      && self.status.is_none_or(|status| entry.status == status)
  }
}
