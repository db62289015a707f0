//! [`TableStore`] — the flat-file implementation of the registry stores.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use tokio::sync::RwLock;

use cadastro_core::{
  credential::Credential,
  record::{PersonFields, PersonRecord, PERSON_COLUMNS},
  store::{CredentialStore, PersonStore, StoreOptions},
  Error, Result,
};

use crate::codec::{
  parse_table, person_to_row, row_to_person, write_table, CREDENTIAL_COLUMNS,
};

const PERSON_FILE: &str = "pessoas.csv";
const CREDENTIAL_FILE: &str = "usuarios.csv";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry store backed by two tabular text files in one directory.
///
/// Cloning is cheap — clones share the same lock, so the serialization
/// guarantee holds across them. Mutations hold the write half of an
/// [`RwLock`] for their full duration; `read_all` holds the read half, so
/// reads may overlap each other but never an in-flight mutation.
#[derive(Clone)]
pub struct TableStore {
  paths:   Arc<RwLock<Paths>>,
  options: StoreOptions,
}

struct Paths {
  persons:     PathBuf,
  credentials: PathBuf,
}

impl TableStore {
  /// Open a store rooted at `dir`, creating the directory if needed. The
  /// data files themselves are only created by the first mutation.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(dir, StoreOptions::default()).await
  }

  /// [`open`](Self::open) with explicit [`StoreOptions`].
  pub async fn open_with(
    dir: impl AsRef<Path>,
    options: StoreOptions,
  ) -> Result<Self> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
      .await
      .map_err(|e| Error::Storage(format!("cannot create {}: {e}", dir.display())))?;
    Ok(Self {
      paths: Arc::new(RwLock::new(Paths {
        persons:     dir.join(PERSON_FILE),
        credentials: dir.join(CREDENTIAL_FILE),
      })),
      options,
    })
  }
}

// ─── File I/O ────────────────────────────────────────────────────────────────

/// Read and parse a table file. Absent file ⇒ empty row set.
async fn load_rows(path: &Path, columns: &[&str]) -> Result<Vec<Vec<String>>> {
  let text = match tokio::fs::read_to_string(path).await {
    Ok(text) => text,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => {
      return Err(Error::Storage(format!("cannot read {}: {e}", path.display())));
    }
  };

  let mut rows = parse_table(&text)?;
  if rows.is_empty() {
    return Ok(rows);
  }
  let header = rows.remove(0);
  if header.iter().map(String::as_str).ne(columns.iter().copied()) {
    return Err(Error::Storage(format!(
      "unexpected header in {}: {header:?}",
      path.display()
    )));
  }
  Ok(rows)
}

/// Serialize and durably replace a table file: write a sibling temp file,
/// then rename over the target so readers see old or new, never half.
async fn save_rows(
  path: &Path,
  columns: &[&str],
  rows: &[Vec<String>],
) -> Result<()> {
  let text = write_table(columns, rows);
  let tmp = path.with_extension("csv.tmp");

  let io = |e: std::io::Error| Error::Storage(format!("cannot write {}: {e}", path.display()));
  tokio::fs::write(&tmp, text).await.map_err(io)?;
  tokio::fs::rename(&tmp, path).await.map_err(io)?;
  tracing::debug!(path = %path.display(), rows = rows.len(), "rewrote table file");
  Ok(())
}

async fn load_persons(path: &Path) -> Result<Vec<PersonRecord>> {
  let mut records = load_rows(path, &PERSON_COLUMNS)
    .await?
    .into_iter()
    .map(row_to_person)
    .collect::<Result<Vec<_>>>()?;
  records.sort_by_key(|r| r.id);
  Ok(records)
}

async fn save_persons(path: &Path, records: &[PersonRecord]) -> Result<()> {
  let rows: Vec<Vec<String>> = records.iter().map(person_to_row).collect();
  save_rows(path, &PERSON_COLUMNS, &rows).await
}

fn row_to_credential(row: Vec<String>) -> Result<Credential> {
  if row.len() != CREDENTIAL_COLUMNS.len() {
    return Err(Error::Storage(format!(
      "expected {} credential columns, found {}",
      CREDENTIAL_COLUMNS.len(),
      row.len()
    )));
  }
  let mut it = row.into_iter();
  let id: i64 = it
    .next()
    .unwrap_or_default()
    .parse()
    .map_err(|e| Error::Storage(format!("bad credential id: {e}")))?;
  Ok(Credential {
    id,
    login:         it.next().unwrap_or_default(),
    password_hash: it.next().unwrap_or_default(),
  })
}

async fn load_credentials(path: &Path) -> Result<Vec<Credential>> {
  load_rows(path, &CREDENTIAL_COLUMNS)
    .await?
    .into_iter()
    .map(row_to_credential)
    .collect()
}

async fn save_credentials(path: &Path, creds: &[Credential]) -> Result<()> {
  let rows: Vec<Vec<String>> = creds
    .iter()
    .map(|c| vec![c.id.to_string(), c.login.clone(), c.password_hash.clone()])
    .collect();
  save_rows(path, &CREDENTIAL_COLUMNS, &rows).await
}

fn next_id<I: Iterator<Item = i64>>(ids: I) -> i64 {
  ids.max().unwrap_or(0) + 1
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for TableStore {
  async fn create(&self, fields: PersonFields) -> Result<i64> {
    fields.validate()?;
    let fields = fields.normalized();

    let paths = self.paths.write().await;
    let mut records = load_persons(&paths.persons).await?;

    if let Some(doc) = fields.document_id.as_deref()
      && records
        .iter()
        .any(|r| r.fields.document_id_normalized() == Some(doc))
    {
      return Err(Error::DuplicateDocument(doc.to_owned()));
    }

    let id = next_id(records.iter().map(|r| r.id));
    records.push(PersonRecord::new(id, Utc::now().date_naive(), fields));
    save_persons(&paths.persons, &records).await?;
    Ok(id)
  }

  async fn read_all(&self) -> Result<Vec<PersonRecord>> {
    let paths = self.paths.read().await;
    load_persons(&paths.persons).await
  }

  async fn update(&self, id: i64, fields: PersonFields) -> Result<()> {
    let fields = fields.normalized();
    let paths = self.paths.write().await;
    let mut records = load_persons(&paths.persons).await?;

    let index = records
      .iter()
      .position(|r| r.id == id)
      .ok_or(Error::NotFound(id))?;

    if self.options.unique_document_on_update
      && let Some(doc) = fields.document_id.as_deref()
      && records
        .iter()
        .any(|r| r.id != id && r.fields.document_id_normalized() == Some(doc))
    {
      return Err(Error::DuplicateDocument(doc.to_owned()));
    }

    records[index].fields = fields;
    save_persons(&paths.persons, &records).await
  }

  async fn delete(&self, id: i64) -> Result<()> {
    let paths = self.paths.write().await;
    let mut records = load_persons(&paths.persons).await?;

    let before = records.len();
    records.retain(|r| r.id != id);
    if records.len() == before {
      // Absent id: no-op, and an absent file stays absent.
      return Ok(());
    }
    save_persons(&paths.persons, &records).await
  }
}

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for TableStore {
  async fn insert_credential(
    &self,
    login: String,
    password_hash: String,
  ) -> Result<i64> {
    let paths = self.paths.write().await;
    let mut creds = load_credentials(&paths.credentials).await?;

    if creds.iter().any(|c| c.login == login) {
      return Err(Error::DuplicateLogin(login));
    }

    let id = next_id(creds.iter().map(|c| c.id));
    creds.push(Credential { id, login, password_hash });
    save_credentials(&paths.credentials, &creds).await?;
    Ok(id)
  }

  async fn find_credential(&self, login: &str) -> Result<Option<Credential>> {
    let paths = self.paths.read().await;
    let creds = load_credentials(&paths.credentials).await?;
    Ok(creds.into_iter().find(|c| c.login == login))
  }
}
