//! Error types for `cadastro-core`.
//!
//! Both storage backends surface this single enum so that callers observe
//! identical failures regardless of which backend is open. Backend-specific
//! detail (SQLite messages, I/O errors) is folded into [`Error::Storage`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or malformed. Carries the field name.
  #[error("validation failed: field {0:?} is required")]
  Validation(&'static str),

  /// `document_id` already present on a live record.
  #[error("duplicate document id: {0}")]
  DuplicateDocument(String),

  /// `login` already registered.
  #[error("duplicate login: {0}")]
  DuplicateLogin(String),

  /// Operation referenced a record id that does not exist.
  #[error("record not found: {0}")]
  NotFound(i64),

  /// The backing file or database failed during a write, or was corrupt at
  /// read time. An *absent* store at read time is not an error — backends
  /// return an empty snapshot instead.
  #[error("storage error: {0}")]
  Storage(String),

  /// Password digest computation failed. Never carries the plaintext.
  #[error("password hashing failed")]
  Hash,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
