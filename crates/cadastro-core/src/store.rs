//! The `PersonStore` and `CredentialStore` traits and store options.
//!
//! The traits are implemented by storage backends (`cadastro-store-sqlite`,
//! `cadastro-store-table`). Higher layers — the credential directory, the
//! report engine, the CLI — depend on these abstractions, not on any
//! concrete backend, and must observe identical behaviour from both.

use std::future::Future;

use crate::{
  credential::Credential,
  record::{PersonFields, PersonRecord},
  Result,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Per-instance behaviour toggles, fixed at open time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
  /// When `true`, `update` re-checks `document_id` uniqueness against all
  /// *other* live records and fails with `DuplicateDocument` on a clash.
  /// Defaults to `false`, the baseline behaviour (`create` always checks).
  pub unique_document_on_update: bool,
}

// ─── Person records ──────────────────────────────────────────────────────────

/// CRUD persistence for person records.
///
/// Mutations are serialized per store instance: at most one of `create`,
/// `update`, `delete` is in flight at a time, and `read_all` never observes
/// a partial write. All methods return `Send` futures so the trait can be
/// used from multi-threaded tokio runtimes.
pub trait PersonStore: Send + Sync {
  /// Validate, assign the next id (1 on an empty store, else max + 1), set
  /// `registered_at` to today, and durably persist. Returns the new id.
  ///
  /// Fails with `Validation` when `name` is blank and `DuplicateDocument`
  /// when `document_id` is already present on a live record.
  fn create(
    &self,
    fields: PersonFields,
  ) -> impl Future<Output = Result<i64>> + Send + '_;

  /// Snapshot of all live records in ascending-id order. An absent backing
  /// store yields an empty snapshot, not an error.
  fn read_all(&self) -> impl Future<Output = Result<Vec<PersonRecord>>> + Send + '_;

  /// Replace every mutable field of `id` atomically; `id` and
  /// `registered_at` are untouched. Fails with `NotFound` when `id` does
  /// not exist, leaving the store unchanged.
  fn update(
    &self,
    id: i64,
    fields: PersonFields,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Remove `id` if present. Deleting an absent id is a no-op.
  fn delete(&self, id: i64) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Persistence for login credentials. Digest computation lives in the
/// [`directory`](crate::directory); this trait only stores and looks up.
pub trait CredentialStore: Send + Sync {
  /// Persist `{login, password_hash}`. Fails with `DuplicateLogin` when the
  /// login is taken. Returns the assigned credential id.
  fn insert_credential(
    &self,
    login: String,
    password_hash: String,
  ) -> impl Future<Output = Result<i64>> + Send + '_;

  /// Look up the stored credential for `login`. `None` when unknown.
  fn find_credential<'a>(
    &'a self,
    login: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>>> + Send + 'a;
}
