//! Schema-aware checks layered over the permissive [`DomainStore`].
//!
//! The core store accepts any input. [`ValidatingDomainStore`] rejects
//! malformed content types, entries whose values don't match their field
//! kinds, missing required fields, and deletion of content types that still
//! have entries. Reads go straight through to the wrapped store.

use std::{collections::HashSet, ops::Deref};

use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  domain::{DomainSnapshot, DomainStore},
  entry::{ContentEntry, EntryData, EntryPatch},
  schema::{ContentTypeSchema, FieldDefinition, FieldKind, SchemaInput},
};

// ─── Content type checks ─────────────────────────────────────────────────────

fn non_blank(value: &str, label: &'static str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::EmptyLabel(label));
  }
  Ok(())
}

/// Check a content type definition on its own, without regard to the
/// other content types in the store.
pub fn check_schema(input: &SchemaInput) -> Result<()> {
  non_blank(&input.name, "name")?;
  non_blank(&input.singular_name, "singular name")?;
  non_blank(&input.plural_name, "plural name")?;

  let mut ids = HashSet::new();
  let mut names = HashSet::new();
  for field in &input.fields {
    non_blank(&field.name, "field name")?;
    if !ids.insert(field.field_id) {
      return Err(Error::DuplicateFieldId(field.field_id));
    }
    if !names.insert(field.name.as_str()) {
      return Err(Error::DuplicateFieldName(field.name.clone()));
    }
    match &field.kind {
      FieldKind::Select { options } if options.is_empty() => {
        return Err(Error::EmptyOptions(field.name.clone()));
      }
      FieldKind::Relation { target } if target.trim().is_empty() => {
        return Err(Error::MissingRelationTarget(field.name.clone()));
      }
      _ => {}
    }
  }
  Ok(())
}

// ─── Entry checks ────────────────────────────────────────────────────────────

fn check_value(field: &FieldDefinition, value: &Value) -> Result<()> {
  let mismatch = || Error::FieldTypeMismatch {
    field:    field.name.clone(),
    expected: field.kind.expected(),
  };

  if value.is_null() {
    return Ok(());
  }
  match &field.kind {
    FieldKind::ShortText | FieldKind::LongText => {
      value.as_str().map(drop).ok_or_else(mismatch)
    }
    FieldKind::Number => value.is_number().then_some(()).ok_or_else(mismatch),
    FieldKind::Boolean => value.as_bool().map(drop).ok_or_else(mismatch),
    FieldKind::Select { options } => {
      let chosen = value.as_str().ok_or_else(mismatch)?;
      if options.iter().any(|o| o == chosen) {
        Ok(())
      } else {
        Err(Error::OptionNotAllowed {
          field: field.name.clone(),
          value: chosen.to_owned(),
        })
      }
    }
    FieldKind::Relation { .. } | FieldKind::Media => {
      value.as_str().map(drop).ok_or_else(mismatch)
    }
  }
}

fn is_missing(field: &FieldDefinition, value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) if field.kind.is_text() => s.trim().is_empty(),
    Some(_) => false,
  }
}

/// Check entry `data` against `schema`.
pub fn check_entry(schema: &ContentTypeSchema, data: &EntryData) -> Result<()> {
  for key in data.keys() {
    if schema.field(key).is_none() {
      return Err(Error::UnknownField(key.clone()));
    }
  }
  for field in &schema.fields {
    let value = data.get(&field.name);
    if field.required && is_missing(field, value) {
      return Err(Error::MissingRequiredField(field.name.clone()));
    }
    if let Some(value) = value {
      check_value(field, value)?;
    }
  }
  Ok(())
}

// ─── Wrapper ─────────────────────────────────────────────────────────────────

/// A [`DomainStore`] that only accepts well-formed input.
///
/// Dereferences to the inner store for reads and subscriptions; all
/// mutations must go through the wrapper.
#[derive(Default)]
pub struct ValidatingDomainStore {
  inner: DomainStore,
}

impl ValidatingDomainStore {
  pub fn new(inner: DomainStore) -> Self { Self { inner } }

  pub fn into_inner(self) -> DomainStore { self.inner }

  fn schema_for(&self, content_type: &str) -> Result<ContentTypeSchema> {
    self
      .inner
      .snapshot()
      .schema_by_singular(content_type)
      .cloned()
      .ok_or_else(|| Error::UnknownContentType(content_type.to_owned()))
  }

  fn check_singular_free(
    snapshot: &DomainSnapshot,
    singular_name: &str,
    except: Option<Uuid>,
  ) -> Result<()> {
    let taken = snapshot
      .schemas
      .iter()
      .any(|s| s.singular_name == singular_name && Some(s.schema_id) != except);
    if taken {
      return Err(Error::DuplicateSingularName(singular_name.to_owned()));
    }
    Ok(())
  }

  pub fn define_schema(
    &mut self,
    input: SchemaInput,
  ) -> Result<ContentTypeSchema> {
    check_schema(&input)?;
    Self::check_singular_free(&self.inner.snapshot(), &input.singular_name, None)?;
    Ok(self.inner.define_schema(input))
  }

  pub fn update_schema(
    &mut self,
    id: Uuid,
    input: SchemaInput,
  ) -> Result<ContentTypeSchema> {
    let snapshot = self.inner.snapshot();
    let current = snapshot.schema(id).ok_or(Error::SchemaNotFound(id))?;
    check_schema(&input)?;
    Self::check_singular_free(&snapshot, &input.singular_name, Some(id))?;

    // Renaming would strand the entries that refer to the old name.
    if input.singular_name != current.singular_name {
      let entries = snapshot
        .entries
        .iter()
        .filter(|e| e.content_type == current.singular_name)
        .count();
      if entries > 0 {
        return Err(Error::SchemaInUse {
          name: current.singular_name.clone(),
          entries,
        });
      }
    }
    self.inner.update_schema(id, input)
  }

  /// Refuses while entries still refer to the content type. Deleting an
  /// unknown id succeeds without effect.
  pub fn delete_schema(&mut self, id: Uuid) -> Result<()> {
    let snapshot = self.inner.snapshot();
    let Some(schema) = snapshot.schema(id) else {
      return Ok(());
    };
    let entries = snapshot
      .entries
      .iter()
      .filter(|e| e.content_type == schema.singular_name)
      .count();
    if entries > 0 {
      return Err(Error::SchemaInUse {
        name: schema.singular_name.clone(),
        entries,
      });
    }
    self.inner.delete_schema(id);
    Ok(())
  }

  pub fn create_entry(
    &mut self,
    content_type: &str,
    data: EntryData,
  ) -> Result<ContentEntry> {
    let schema = self.schema_for(content_type)?;
    check_entry(&schema, &data)?;
    Ok(self.inner.create_entry(content_type, data))
  }

  /// Validates the entry as it would look after the merge. A patch without
  /// data only moves the status and is never refused, even for an entry
  /// whose content type is gone.
  pub fn update_entry(
    &mut self,
    id: Uuid,
    patch: EntryPatch,
  ) -> Result<ContentEntry> {
    if patch.data.is_empty() {
      return self.inner.update_entry(id, patch);
    }
    let current = self
      .inner
      .snapshot()
      .entry(id)
      .cloned()
      .ok_or(Error::EntryNotFound(id))?;
    let schema = self.schema_for(&current.content_type)?;

    let mut merged = current.data;
    merged.extend(patch.data.clone());
    check_entry(&schema, &merged)?;

    self.inner.update_entry(id, patch)
  }

  pub fn delete_entry(&mut self, id: Uuid) { self.inner.delete_entry(id); }
}

impl Deref for ValidatingDomainStore {
  type Target = DomainStore;

  fn deref(&self) -> &DomainStore { &self.inner }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::entry::{EntryFilter, EntryStatus};

  fn data(value: Value) -> EntryData {
    value.as_object().cloned().unwrap_or_default()
  }

  fn article() -> SchemaInput {
    SchemaInput {
      name:          "Article".into(),
      singular_name: "article".into(),
      plural_name:   "articles".into(),
      fields:        vec![
        FieldDefinition::new("title", FieldKind::ShortText).required(),
        FieldDefinition::new("body", FieldKind::LongText),
        FieldDefinition::new("views", FieldKind::Number),
        FieldDefinition::new("featured", FieldKind::Boolean),
        FieldDefinition::new("category", FieldKind::Select {
          options: vec!["news".into(), "opinion".into()],
        }),
        FieldDefinition::new("author", FieldKind::Relation {
          target: "person".into(),
        }),
        FieldDefinition::new("cover", FieldKind::Media),
      ],
    }
  }

  fn store_with_article() -> ValidatingDomainStore {
    let mut store = ValidatingDomainStore::default();
    store.define_schema(article()).unwrap();
    store
  }

  // ── Content types ─────────────────────────────────────────────────────────

  #[test]
  fn rejects_blank_labels() {
    let mut store = ValidatingDomainStore::default();
    let mut input = article();
    input.plural_name = "  ".into();
    let err = store.define_schema(input).unwrap_err();
    assert!(matches!(err, Error::EmptyLabel("plural name")));
    assert!(store.snapshot().schemas.is_empty());
  }

  #[test]
  fn rejects_duplicate_field_ids_and_names() {
    let mut store = ValidatingDomainStore::default();

    let mut input = article();
    let dup = input.fields[0].clone();
    input.fields.push(dup.clone());
    assert!(matches!(
      store.define_schema(input).unwrap_err(),
      Error::DuplicateFieldId(id) if id == dup.field_id
    ));

    let mut input = article();
    input.fields.push(FieldDefinition::new("title", FieldKind::LongText));
    assert!(matches!(
      store.define_schema(input).unwrap_err(),
      Error::DuplicateFieldName(name) if name == "title"
    ));
  }

  #[test]
  fn rejects_select_without_options_and_relation_without_target() {
    let mut store = ValidatingDomainStore::default();

    let mut input = article();
    input.fields = vec![FieldDefinition::new("kind", FieldKind::Select {
      options: vec![],
    })];
    assert!(matches!(
      store.define_schema(input).unwrap_err(),
      Error::EmptyOptions(_)
    ));

    let mut input = article();
    input.fields = vec![FieldDefinition::new("parent", FieldKind::Relation {
      target: "".into(),
    })];
    assert!(matches!(
      store.define_schema(input).unwrap_err(),
      Error::MissingRelationTarget(_)
    ));
  }

  #[test]
  fn singular_names_are_unique() {
    let mut store = store_with_article();
    let err = store.define_schema(article()).unwrap_err();
    assert!(matches!(err, Error::DuplicateSingularName(_)));

    // Replacing a content type with its own name is fine.
    let id = store.snapshot().schemas[0].schema_id;
    store.update_schema(id, article()).unwrap();
  }

  #[test]
  fn delete_blocked_while_entries_exist() {
    let mut store = store_with_article();
    let id = store.snapshot().schemas[0].schema_id;
    let entry = store
      .create_entry("article", data(json!({ "title": "Hello" })))
      .unwrap();

    let err = store.delete_schema(id).unwrap_err();
    assert!(matches!(err, Error::SchemaInUse { entries: 1, .. }));

    store.delete_entry(entry.entry_id);
    store.delete_schema(id).unwrap();
    store.delete_schema(id).unwrap();
    assert!(store.snapshot().schemas.is_empty());
  }

  #[test]
  fn rename_blocked_while_entries_exist() {
    let mut store = store_with_article();
    let id = store.snapshot().schemas[0].schema_id;
    store
      .create_entry("article", data(json!({ "title": "Hello" })))
      .unwrap();

    let mut renamed = article();
    renamed.singular_name = "post".into();
    let err = store.update_schema(id, renamed).unwrap_err();
    assert!(matches!(err, Error::SchemaInUse { .. }));
  }

  // ── Entries ───────────────────────────────────────────────────────────────

  #[test]
  fn accepts_well_formed_entry() {
    let mut store = store_with_article();
    let entry = store
      .create_entry(
        "article",
        data(json!({
          "title": "Hello",
          "body": "Long form",
          "views": 3,
          "featured": false,
          "category": "news",
          "author": "a1b2",
          "cover": null,
        })),
      )
      .unwrap();
    assert_eq!(entry.status, EntryStatus::Draft);
  }

  #[test]
  fn rejects_unknown_content_type() {
    let mut store = store_with_article();
    let err = store.create_entry("page", EntryData::new()).unwrap_err();
    assert!(matches!(err, Error::UnknownContentType(name) if name == "page"));
  }

  #[test]
  fn required_fields_must_be_present_and_non_blank() {
    let mut store = store_with_article();
    for bad in [json!({}), json!({ "title": null }), json!({ "title": "  " })] {
      let err = store.create_entry("article", data(bad)).unwrap_err();
      assert!(matches!(err, Error::MissingRequiredField(f) if f == "title"));
    }
    assert_eq!(store.list_entries(EntryFilter::default()).iter().count(), 0);
  }

  #[test]
  fn values_must_match_field_kind() {
    let mut store = store_with_article();

    let err = store
      .create_entry("article", data(json!({ "title": 7 })))
      .unwrap_err();
    assert!(matches!(err, Error::FieldTypeMismatch { expected: "text", .. }));

    let err = store
      .create_entry("article", data(json!({ "title": "x", "views": "many" })))
      .unwrap_err();
    assert!(matches!(err, Error::FieldTypeMismatch { expected: "number", .. }));

    let err = store
      .create_entry("article", data(json!({ "title": "x", "category": "sports" })))
      .unwrap_err();
    assert!(matches!(err, Error::OptionNotAllowed { .. }));

    let err = store
      .create_entry("article", data(json!({ "title": "x", "rating": 5 })))
      .unwrap_err();
    assert!(matches!(err, Error::UnknownField(f) if f == "rating"));
  }

  #[test]
  fn update_validates_the_merged_entry() {
    let mut store = store_with_article();
    let entry = store
      .create_entry("article", data(json!({ "title": "Hello" })))
      .unwrap();

    let err = store
      .update_entry(
        entry.entry_id,
        EntryPatch::data(data(json!({ "title": "" }))),
      )
      .unwrap_err();
    assert!(matches!(err, Error::MissingRequiredField(_)));

    // Untouched required fields carry over from the stored entry.
    let updated = store
      .update_entry(entry.entry_id, EntryPatch::data(data(json!({ "views": 10 }))))
      .unwrap();
    assert_eq!(updated.data["title"], "Hello");
    assert_eq!(updated.data["views"], 10);

    let published = store
      .update_entry(entry.entry_id, EntryPatch::status(EntryStatus::Published))
      .unwrap();
    assert_eq!(published.status, EntryStatus::Published);
  }

  #[test]
  fn orphaned_entry_can_change_status_but_not_data() {
    let mut inner = DomainStore::new();
    let orphan = inner.create_entry("page", data(json!({ "title": "Old" })));
    let mut store = ValidatingDomainStore::new(inner);

    let published = store
      .update_entry(orphan.entry_id, EntryPatch::status(EntryStatus::Published))
      .unwrap();
    assert_eq!(published.status, EntryStatus::Published);
    assert_eq!(published.data, orphan.data);

    let err = store
      .update_entry(
        orphan.entry_id,
        EntryPatch::data(data(json!({ "title": "New" }))),
      )
      .unwrap_err();
    assert!(matches!(err, Error::UnknownContentType(name) if name == "page"));
  }

  #[test]
  fn update_of_missing_entry_is_not_found() {
    let mut store = store_with_article();
    let id = Uuid::new_v4();
    let err = store.update_entry(id, EntryPatch::default()).unwrap_err();
    assert!(matches!(err, Error::EntryNotFound(missing) if missing == id));
  }
}
