//! Core types and stores for the Folio content admin.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the two in-memory stores the admin shell renders from: the
//! [`DomainStore`](domain::DomainStore) (content types and entries) and the
//! [`PreferencesStore`](preferences::PreferencesStore) (theme, direction,
//! navigation state). Durable preference backends implement
//! [`PreferenceStorage`](storage::PreferenceStorage).

pub mod domain;
pub mod entry;
pub mod error;
pub mod observer;
pub mod preferences;
pub mod schema;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};
