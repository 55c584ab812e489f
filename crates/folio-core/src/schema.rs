//! Content types — user-defined record shapes.
//!
//! A content type is an ordered list of field definitions plus the labels the
//! admin shell shows for it. Entries refer to their content type by its
//! singular name, not by its id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Field kinds ─────────────────────────────────────────────────────────────

/// The kind of value a field holds. Kind-specific settings live on the
/// variant, so a select field always has options and a relation always has a
/// target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
  /// Single-line text.
  #[serde(rename = "text")]
  ShortText,
  LongText,
  Number,
  Boolean,
  /// One value chosen from a fixed list.
  Select { options: Vec<String> },
  /// A reference to an entry of another content type, named by its singular
  /// name.
  Relation { target: String },
  /// A reference into the media library.
  Media,
}

impl FieldKind {
  /// Short human-readable name of the value shape this kind expects.
  pub fn expected(&self) -> &'static str {
    match self {
      Self::ShortText | Self::LongText => "text",
      Self::Number => "number",
      Self::Boolean => "boolean",
      Self::Select { .. } => "select option",
      Self::Relation { .. } => "relation id",
      Self::Media => "media reference",
    }
  }

  pub fn is_text(&self) -> bool {
    matches!(self, Self::ShortText | Self::LongText)
  }
}

// ─── Field definition ────────────────────────────────────────────────────────

/// One named, typed slot within a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
  pub field_id: Uuid,
  /// Key under which entries store this field's value.
  pub name:     String,
  #[serde(flatten)]
  pub kind:     FieldKind,
  /// Recorded on the definition; only [`crate::validate`] enforces it.
  #[serde(default)]
  pub required: bool,
}

impl FieldDefinition {
  /// An optional field with a freshly assigned id.
  pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
    Self {
      field_id: Uuid::new_v4(),
      name: name.into(),
      kind,
      required: false,
    }
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }
}

// ─── Content type ────────────────────────────────────────────────────────────

/// Input to [`crate::domain::DomainStore::define_schema`] and
/// [`crate::domain::DomainStore::update_schema`]. The id is always assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInput {
  pub name:          String,
  pub singular_name: String,
  pub plural_name:   String,
  #[serde(default)]
  pub fields:        Vec<FieldDefinition>,
}

/// A stored content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeSchema {
  pub schema_id:     Uuid,
  pub name:          String,
  pub singular_name: String,
  pub plural_name:   String,
  pub fields:        Vec<FieldDefinition>,
}

impl ContentTypeSchema {
  pub(crate) fn from_input(schema_id: Uuid, input: SchemaInput) -> Self {
    Self {
      schema_id,
      name: input.name,
      singular_name: input.singular_name,
      plural_name: input.plural_name,
      fields: input.fields,
    }
  }

  /// Look up a field definition by its name.
  pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
    self.fields.iter().find(|f| f.name == name)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn field_kind_serialises_flat_with_type_tag() {
    let field = FieldDefinition::new("status", FieldKind::Select {
      options: vec!["open".into(), "closed".into()],
    })
    .required();

    let value = serde_json::to_value(&field).unwrap();
    assert_eq!(value["type"], "select");
    assert_eq!(value["options"], json!(["open", "closed"]));
    assert_eq!(value["required"], true);
    assert!(value.get("target").is_none());
  }

  #[test]
  fn short_text_is_tagged_text() {
    let raw = json!({
      "field_id": Uuid::new_v4(),
      "name": "title",
      "type": "text",
      "required": true,
    });
    let field: FieldDefinition = serde_json::from_value(raw).unwrap();
    assert_eq!(field.kind, FieldKind::ShortText);
    assert!(field.required);
  }

  #[test]
  fn required_defaults_to_false() {
    let raw = json!({
      "field_id": Uuid::new_v4(),
      "name": "author",
      "type": "relation",
      "target": "person",
    });
    let field: FieldDefinition = serde_json::from_value(raw).unwrap();
    assert!(!field.required);
    assert_eq!(field.kind, FieldKind::Relation { target: "person".into() });
  }
}
