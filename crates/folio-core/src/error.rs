//! Error types for `folio-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("content type not found: {0}")]
  SchemaNotFound(Uuid),

  #[error("entry not found: {0}")]
  EntryNotFound(Uuid),

  #[error("no content type with singular name {0:?}")]
  UnknownContentType(String),

  #[error("content type {name:?} is still referenced by {entries} entries")]
  SchemaInUse { name: String, entries: usize },

  #[error("{0} must not be empty")]
  EmptyLabel(&'static str),

  #[error("a content type with singular name {0:?} already exists")]
  DuplicateSingularName(String),

  #[error("duplicate field id: {0}")]
  DuplicateFieldId(Uuid),

  #[error("duplicate field name: {0:?}")]
  DuplicateFieldName(String),

  #[error("select field {0:?} has no options")]
  EmptyOptions(String),

  #[error("relation field {0:?} has no target content type")]
  MissingRelationTarget(String),

  #[error("required field {0:?} is missing")]
  MissingRequiredField(String),

  #[error("unknown field {0:?}")]
  UnknownField(String),

  #[error("field {field:?} expects a {expected} value")]
  FieldTypeMismatch { field: String, expected: &'static str },

  #[error("{value:?} is not an option of field {field:?}")]
  OptionNotAllowed { field: String, value: String },

  #[error("username and password must not be empty")]
  InvalidCredentials,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
