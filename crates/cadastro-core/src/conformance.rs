//! Backend conformance suite.
//!
//! Both storage backends must be observationally identical, so the contract
//! is asserted once here, generically, and each backend's test module calls
//! into these functions with a freshly opened store. The functions panic on
//! contract violations — they are meant to run inside `#[tokio::test]`.

use chrono::Utc;

use crate::{
  directory::CredentialDirectory,
  record::PersonFields,
  store::{CredentialStore, PersonStore},
  Error,
};

/// A minimal valid field set.
pub fn person(name: &str, category: &str) -> PersonFields {
  PersonFields {
    name:     name.to_owned(),
    category: Some(category.to_owned()),
    ..Default::default()
  }
}

// ─── Creation & id assignment ────────────────────────────────────────────────

pub async fn create_assigns_id_one_on_empty<S: PersonStore>(store: &S) {
  let id = store.create(person("Ana", "A")).await.unwrap();
  assert_eq!(id, 1);
}

pub async fn ids_are_max_plus_one_even_after_deletes<S: PersonStore>(store: &S) {
  let a = store.create(person("Ana", "A")).await.unwrap();
  let b = store.create(person("Bruno", "B")).await.unwrap();
  let c = store.create(person("Carla", "A")).await.unwrap();
  assert_eq!((a, b, c), (1, 2, 3));

  // Removing the maximum frees its id for the next assignment.
  store.delete(c).await.unwrap();
  let d = store.create(person("Davi", "B")).await.unwrap();
  assert_eq!(d, 3);

  // Removing from the middle does not.
  store.delete(b).await.unwrap();
  let e = store.create(person("Elisa", "C")).await.unwrap();
  assert_eq!(e, 4);
}

pub async fn create_rejects_blank_name<S: PersonStore>(store: &S) {
  let err = store.create(person("  ", "A")).await.unwrap_err();
  assert!(matches!(err, Error::Validation("nome")));
  assert!(store.read_all().await.unwrap().is_empty());
}

pub async fn create_rejects_duplicate_document<S: PersonStore>(store: &S) {
  let mut first = person("Ana", "A");
  first.document_id = Some("123.456.789-00".into());
  store.create(first).await.unwrap();

  let mut second = person("Bruno", "B");
  second.document_id = Some("123.456.789-00".into());
  let err = store.create(second).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateDocument(_)));
  assert_eq!(store.read_all().await.unwrap().len(), 1);
}

pub async fn padded_document_id_still_collides<S: PersonStore>(store: &S) {
  let mut first = person("Ana", "A");
  first.document_id = Some(" 111 ".into());
  store.create(first).await.unwrap();

  // The stored value is the trimmed one.
  let all = store.read_all().await.unwrap();
  assert_eq!(all[0].fields.document_id.as_deref(), Some("111"));

  // Both the trimmed and a differently-padded rendition collide with it.
  for doc in ["111", "111 ", "  111"] {
    let mut dup = person("Bruno", "B");
    dup.document_id = Some(doc.into());
    let err = store.create(dup).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateDocument(_)), "{doc:?} accepted");
  }
  assert_eq!(store.read_all().await.unwrap().len(), 1);
}

pub async fn empty_optional_fields_read_back_as_none<S: PersonStore>(store: &S) {
  let mut fields = person("Ana", "A");
  fields.document_id = Some("   ".into());
  fields.email = Some(String::new());
  fields.birthdate = Some(String::new());
  let id = store.create(fields).await.unwrap();

  let all = store.read_all().await.unwrap();
  assert_eq!(all[0].fields.document_id, None);
  assert_eq!(all[0].fields.email, None);
  assert_eq!(all[0].fields.birthdate, None);

  // Same shape through the update path.
  let mut replacement = person("Ana", "B");
  replacement.phone = Some(String::new());
  store.update(id, replacement).await.unwrap();
  assert_eq!(store.read_all().await.unwrap()[0].fields.phone, None);
}

pub async fn deleted_document_id_is_reusable<S: PersonStore>(store: &S) {
  let mut fields = person("Ana", "A");
  fields.document_id = Some("111".into());
  let id = store.create(fields.clone()).await.unwrap();
  store.delete(id).await.unwrap();

  // Uniqueness is over live records only.
  fields.name = "Ana II".into();
  store.create(fields).await.unwrap();
}

// ─── Round trip ──────────────────────────────────────────────────────────────

pub async fn roundtrip_preserves_every_field<S: PersonStore>(store: &S) {
  let fields = PersonFields {
    name:                "Maria José".into(),
    document_id:         Some("987.654.321-00".into()),
    birthdate:           Some("1985-07-20".into()),
    email:               Some("maria@example.com".into()),
    phone:               Some("(11) 91234-5678".into()),
    kind:                Some("aluno".into()),
    registration_number: Some("2024-0042".into()),
    category:            Some("Juvenil".into()),
    room:                Some("3".into()),
    enrollment_year:     Some("2024".into()),
    postal_code:         Some("01310-100".into()),
    street:              Some("Av. Paulista".into()),
    number:              Some("1578".into()),
    complement:          Some("ap 12, \"fundos\"".into()),
    district:            Some("Bela Vista".into()),
    city:                Some("São Paulo".into()),
    state:               Some("SP".into()),
  };

  let before = Utc::now().date_naive();
  let id = store.create(fields.clone()).await.unwrap();
  let after = Utc::now().date_naive();

  let all = store.read_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].id, id);
  assert_eq!(all[0].fields, fields);
  // `before` and `after` differ only across a midnight boundary.
  assert!(
    all[0].registered_at == before || all[0].registered_at == after,
    "registered_at {} not set at creation time",
    all[0].registered_at,
  );
}

pub async fn read_all_is_ascending_by_id<S: PersonStore>(store: &S) {
  for name in ["Ana", "Bruno", "Carla", "Davi"] {
    store.create(person(name, "A")).await.unwrap();
  }
  let ids: Vec<i64> = store.read_all().await.unwrap().iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![1, 2, 3, 4]);
}

// ─── Update ──────────────────────────────────────────────────────────────────

pub async fn update_missing_id_fails_and_leaves_store_unchanged<S: PersonStore>(
  store: &S,
) {
  store.create(person("Ana", "A")).await.unwrap();
  let before = store.read_all().await.unwrap();

  let err = store.update(99, person("Zoe", "Z")).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(99)));
  assert_eq!(store.read_all().await.unwrap(), before);
}

pub async fn update_replaces_fields_but_not_registration<S: PersonStore>(
  store: &S,
) {
  let id = store.create(person("Ana", "A")).await.unwrap();
  let registered_at = store.read_all().await.unwrap()[0].registered_at;

  let mut replacement = person("Ana Paula", "B");
  replacement.email = Some("ana@example.com".into());
  replacement.birthdate = Some("1990-03-15".into());
  store.update(id, replacement.clone()).await.unwrap();

  let all = store.read_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].id, id);
  assert_eq!(all[0].fields, replacement);
  assert_eq!(all[0].registered_at, registered_at);
}

/// Default behaviour: update does not re-check document uniqueness.
pub async fn update_allows_duplicate_document_by_default<S: PersonStore>(
  store: &S,
) {
  let mut ana = person("Ana", "A");
  ana.document_id = Some("111".into());
  store.create(ana).await.unwrap();

  let mut bruno = person("Bruno", "B");
  bruno.document_id = Some("222".into());
  let id = store.create(bruno.clone()).await.unwrap();

  bruno.document_id = Some("111".into());
  store.update(id, bruno).await.unwrap();
}

/// With `StoreOptions::unique_document_on_update`, the same update fails.
pub async fn update_rejects_duplicate_document_when_enforced<S: PersonStore>(
  store: &S,
) {
  let mut ana = person("Ana", "A");
  ana.document_id = Some("111".into());
  store.create(ana).await.unwrap();

  let mut bruno = person("Bruno", "B");
  bruno.document_id = Some("222".into());
  let id = store.create(bruno.clone()).await.unwrap();

  bruno.document_id = Some("111".into());
  let err = store.update(id, bruno.clone()).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateDocument(_)));

  // A record may keep its own document id through an update.
  bruno.document_id = Some("222".into());
  bruno.name = "Bruno Lima".into();
  store.update(id, bruno).await.unwrap();
}

// ─── Delete ──────────────────────────────────────────────────────────────────

pub async fn delete_is_idempotent<S: PersonStore>(store: &S) {
  let id = store.create(person("Ana", "A")).await.unwrap();
  store.delete(id).await.unwrap();
  store.delete(id).await.unwrap();
  store.delete(999).await.unwrap();
  assert!(store.read_all().await.unwrap().is_empty());
}

// ─── Credentials ─────────────────────────────────────────────────────────────

pub async fn duplicate_login_is_rejected<S: CredentialStore>(store: &S) {
  store
    .insert_credential("joao".into(), "$digest$1".into())
    .await
    .unwrap();
  let err = store
    .insert_credential("joao".into(), "$digest$2".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateLogin(_)));
}

pub async fn unknown_login_finds_none<S: CredentialStore>(store: &S) {
  assert!(store.find_credential("ninguem").await.unwrap().is_none());
}

pub async fn directory_verifies_only_correct_password<S: CredentialStore>(
  store: S,
) {
  let directory = CredentialDirectory::new(store);
  directory.register("joao", "segredo").await.unwrap();

  assert!(directory.verify("joao", "segredo").await.unwrap());
  assert!(!directory.verify("joao", "errado").await.unwrap());
  assert!(!directory.verify("ninguem", "segredo").await.unwrap());

  let err = directory.register("joao", "outra").await.unwrap_err();
  assert!(matches!(err, Error::DuplicateLogin(_)));
}
