//! Integration tests for `SqliteStore`.
//!
//! The behavioural contract lives in `cadastro_core::conformance` and is
//! shared with the tabular-file backend; only persistence concerns specific
//! to SQLite are tested directly here.

use cadastro_core::{conformance, store::StoreOptions, PersonStore as _};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

// ─── Shared contract ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_id_one_on_empty() {
  conformance::create_assigns_id_one_on_empty(&store().await).await;
}

#[tokio::test]
async fn ids_are_max_plus_one_even_after_deletes() {
  conformance::ids_are_max_plus_one_even_after_deletes(&store().await).await;
}

#[tokio::test]
async fn create_rejects_blank_name() {
  conformance::create_rejects_blank_name(&store().await).await;
}

#[tokio::test]
async fn create_rejects_duplicate_document() {
  conformance::create_rejects_duplicate_document(&store().await).await;
}

#[tokio::test]
async fn padded_document_id_still_collides() {
  conformance::padded_document_id_still_collides(&store().await).await;
}

#[tokio::test]
async fn empty_optional_fields_read_back_as_none() {
  conformance::empty_optional_fields_read_back_as_none(&store().await).await;
}

#[tokio::test]
async fn deleted_document_id_is_reusable() {
  conformance::deleted_document_id_is_reusable(&store().await).await;
}

#[tokio::test]
async fn roundtrip_preserves_every_field() {
  conformance::roundtrip_preserves_every_field(&store().await).await;
}

#[tokio::test]
async fn read_all_is_ascending_by_id() {
  conformance::read_all_is_ascending_by_id(&store().await).await;
}

#[tokio::test]
async fn update_missing_id_fails_and_leaves_store_unchanged() {
  conformance::update_missing_id_fails_and_leaves_store_unchanged(&store().await)
    .await;
}

#[tokio::test]
async fn update_replaces_fields_but_not_registration() {
  conformance::update_replaces_fields_but_not_registration(&store().await).await;
}

#[tokio::test]
async fn update_allows_duplicate_document_by_default() {
  conformance::update_allows_duplicate_document_by_default(&store().await).await;
}

#[tokio::test]
async fn update_rejects_duplicate_document_when_enforced() {
  let store = SqliteStore::open_in_memory_with(StoreOptions {
    unique_document_on_update: true,
  })
  .await
  .unwrap();
  conformance::update_rejects_duplicate_document_when_enforced(&store).await;
}

#[tokio::test]
async fn delete_is_idempotent() {
  conformance::delete_is_idempotent(&store().await).await;
}

#[tokio::test]
async fn duplicate_login_is_rejected() {
  conformance::duplicate_login_is_rejected(&store().await).await;
}

#[tokio::test]
async fn unknown_login_finds_none() {
  conformance::unknown_login_finds_none(&store().await).await;
}

#[tokio::test]
async fn directory_verifies_only_correct_password() {
  conformance::directory_verifies_only_correct_password(store().await).await;
}

// ─── Backend-specific ────────────────────────────────────────────────────────

#[tokio::test]
async fn records_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cadastro.db");

  let id = {
    let store = SqliteStore::open(&path).await.unwrap();
    store
      .create(conformance::person("Ana", "A"))
      .await
      .unwrap()
  };

  let store = SqliteStore::open(&path).await.unwrap();
  let all = store.read_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].id, id);
  assert_eq!(all[0].fields.name, "Ana");
}

#[tokio::test]
async fn id_assignment_survives_reopen_after_delete() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cadastro.db");

  {
    let store = SqliteStore::open(&path).await.unwrap();
    store.create(conformance::person("Ana", "A")).await.unwrap();
    let b = store.create(conformance::person("Bruno", "B")).await.unwrap();
    store.delete(b).await.unwrap();
  }

  let store = SqliteStore::open(&path).await.unwrap();
  let id = store.create(conformance::person("Carla", "A")).await.unwrap();
  assert_eq!(id, 2);
}
