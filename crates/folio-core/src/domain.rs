//! [`DomainStore`] — the in-memory owner of content types and entries.
//!
//! Every mutation produces a new immutable [`DomainSnapshot`] and broadcasts
//! it to subscribers. Readers holding an older snapshot keep seeing it
//! unchanged. Nothing here validates input; wrap the store in
//! [`ValidatingDomainStore`](crate::validate::ValidatingDomainStore) for that.

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::{
  entry::{ContentEntry, EntryData, EntryFilter, EntryPatch, EntryStatus},
  observer::{Subscribers, Subscription},
  schema::{ContentTypeSchema, SchemaInput},
  Error, Result,
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Point-in-time view of both collections, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainSnapshot {
  pub schemas: Vec<ContentTypeSchema>,
  pub entries: Vec<ContentEntry>,
}

impl DomainSnapshot {
  pub fn schema(&self, id: Uuid) -> Option<&ContentTypeSchema> {
    self.schemas.iter().find(|s| s.schema_id == id)
  }

  /// The content type entries refer to as `singular_name`.
  pub fn schema_by_singular(
    &self,
    singular_name: &str,
  ) -> Option<&ContentTypeSchema> {
    self.schemas.iter().find(|s| s.singular_name == singular_name)
  }

  pub fn entry(&self, id: Uuid) -> Option<&ContentEntry> {
    self.entries.iter().find(|e| e.entry_id == id)
  }

  /// Entries whose content type no longer exists.
  pub fn orphaned_entries(&self) -> impl Iterator<Item = &ContentEntry> {
    self
      .entries
      .iter()
      .filter(|e| self.schema_by_singular(&e.content_type).is_none())
  }

  /// Counters shown on the dashboard.
  pub fn stats(&self) -> DashboardStats {
    let mut stats = DashboardStats {
      content_types: self.schemas.len(),
      entries: self.entries.len(),
      ..DashboardStats::default()
    };
    for entry in &self.entries {
      match entry.status {
        EntryStatus::Draft => stats.drafts += 1,
        EntryStatus::Published => stats.published += 1,
      }
      *stats
        .entries_by_type
        .entry(entry.content_type.clone())
        .or_default() += 1;
    }
    stats
  }
}

/// Aggregate counts over a [`DomainSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
  pub content_types:   usize,
  pub entries:         usize,
  pub drafts:          usize,
  pub published:       usize,
  /// Keyed by content type singular name, orphans included.
  pub entries_by_type: BTreeMap<String, usize>,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Result of [`DomainStore::list_entries`].
///
/// Holds the snapshot it was taken from, so later mutations don't affect it.
/// The filter runs lazily on each iteration and iteration can be repeated.
#[derive(Debug, Clone)]
pub struct EntryListing {
  snapshot: Arc<DomainSnapshot>,
  filter:   EntryFilter,
}

impl EntryListing {
  pub fn iter(&self) -> impl Iterator<Item = &ContentEntry> + Clone + '_ {
    self
      .snapshot
      .entries
      .iter()
      .filter(|e| self.filter.matches(e))
  }

  pub fn filter(&self) -> &EntryFilter { &self.filter }
}

impl<'a> IntoIterator for &'a EntryListing {
  type Item = &'a ContentEntry;
  type IntoIter = Box<dyn Iterator<Item = &'a ContentEntry> + 'a>;

  fn into_iter(self) -> Self::IntoIter { Box::new(self.iter()) }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Owner of the content type and entry collections.
///
/// Construct one per session and pass it to whatever needs it. All operations
/// are synchronous and total; a missing id is reported as
/// [`Error::SchemaNotFound`] or [`Error::EntryNotFound`].
#[derive(Default)]
pub struct DomainStore {
  state:       Arc<DomainSnapshot>,
  subscribers: Subscribers<DomainSnapshot>,
}

impl DomainStore {
  pub fn new() -> Self { Self::default() }

  /// Start from existing collections, e.g. seed content.
  pub fn with_snapshot(snapshot: DomainSnapshot) -> Self {
    Self {
      state:       Arc::new(snapshot),
      subscribers: Subscribers::default(),
    }
  }

  /// The current snapshot. Cheap; shares the underlying collections.
  pub fn snapshot(&self) -> Arc<DomainSnapshot> { Arc::clone(&self.state) }

  /// Receive every future snapshot until the returned handle is dropped.
  pub fn subscribe<F>(&self, listener: F) -> Subscription
  where
    F: Fn(&Arc<DomainSnapshot>) + Send + Sync + 'static,
  {
    self.subscribers.subscribe(listener)
  }

  /// Snapshots as an async stream, for consumers on another task.
  pub fn changes(&self) -> broadcast::Receiver<Arc<DomainSnapshot>> {
    self.subscribers.changes()
  }

  /// Clone-on-write access to the state, then broadcast.
  fn commit<R>(&mut self, change: impl FnOnce(&mut DomainSnapshot) -> R) -> R {
    let out = change(Arc::make_mut(&mut self.state));
    self.subscribers.notify(&self.state);
    out
  }

  // ── Content types ─────────────────────────────────────────────────────────

  /// Store a new content type under a fresh id.
  pub fn define_schema(&mut self, input: SchemaInput) -> ContentTypeSchema {
    let schema = ContentTypeSchema::from_input(Uuid::new_v4(), input);
    debug!(schema_id = %schema.schema_id, name = %schema.name, "content type defined");
    self.commit(|s| s.schemas.push(schema.clone()));
    schema
  }

  /// Replace the content type `id` wholesale, keeping its id.
  pub fn update_schema(
    &mut self,
    id: Uuid,
    input: SchemaInput,
  ) -> Result<ContentTypeSchema> {
    let idx = self
      .state
      .schemas
      .iter()
      .position(|s| s.schema_id == id)
      .ok_or(Error::SchemaNotFound(id))?;

    let schema = ContentTypeSchema::from_input(id, input);
    debug!(schema_id = %id, "content type replaced");
    self.commit(|s| s.schemas[idx] = schema.clone());
    Ok(schema)
  }

  /// Remove the content type `id`. Entries referring to it are left in place.
  /// Removing an unknown id does nothing.
  pub fn delete_schema(&mut self, id: Uuid) {
    if self.state.schema(id).is_none() {
      return;
    }
    debug!(schema_id = %id, "content type deleted");
    self.commit(|s| s.schemas.retain(|schema| schema.schema_id != id));
  }

  // ── Entries ───────────────────────────────────────────────────────────────

  /// Store a new draft entry of `content_type`.
  pub fn create_entry(
    &mut self,
    content_type: impl Into<String>,
    data: EntryData,
  ) -> ContentEntry {
    let now = Utc::now();
    let entry = ContentEntry {
      entry_id: Uuid::new_v4(),
      content_type: content_type.into(),
      status: EntryStatus::Draft,
      data,
      created_at: now,
      updated_at: now,
    };
    debug!(entry_id = %entry.entry_id, content_type = %entry.content_type, "entry created");
    self.commit(|s| s.entries.push(entry.clone()));
    entry
  }

  /// Merge `patch` into entry `id` and refresh its `updated_at`.
  pub fn update_entry(
    &mut self,
    id: Uuid,
    patch: EntryPatch,
  ) -> Result<ContentEntry> {
    let idx = self
      .state
      .entries
      .iter()
      .position(|e| e.entry_id == id)
      .ok_or(Error::EntryNotFound(id))?;

    debug!(entry_id = %id, "entry updated");
    let now = Utc::now();
    Ok(self.commit(|s| {
      let entry = &mut s.entries[idx];
      entry.apply(patch, now);
      entry.clone()
    }))
  }

  /// Remove entry `id`. Removing an unknown id does nothing.
  pub fn delete_entry(&mut self, id: Uuid) {
    if self.state.entry(id).is_none() {
      return;
    }
    debug!(entry_id = %id, "entry deleted");
    self.commit(|s| s.entries.retain(|e| e.entry_id != id));
  }

  /// Entries matching `filter`, in insertion order.
  pub fn list_entries(&self, filter: EntryFilter) -> EntryListing {
    EntryListing {
      snapshot: self.snapshot(),
      filter,
    }
  }
}
