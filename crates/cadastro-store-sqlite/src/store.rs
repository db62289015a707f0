//! [`SqliteStore`] — the SQLite implementation of the registry stores.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use cadastro_core::{
  credential::Credential,
  record::{PersonFields, PersonRecord},
  store::{CredentialStore, PersonStore, StoreOptions},
  Error, Result,
};

use crate::{
  encode::{encode_date, RawPerson},
  schema::SCHEMA,
};

// ─── Error funnelling ────────────────────────────────────────────────────────

/// Wrap a domain error so it can cross the `tokio_rusqlite::call` boundary.
fn domain(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Recover domain errors smuggled through [`domain`]; everything else is a
/// storage failure.
fn call_err(e: tokio_rusqlite::Error) -> Error {
  match e {
    tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
      Ok(e)     => *e,
      Err(other) => Error::Storage(other.to_string()),
    },
    other => Error::Storage(other.to_string()),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// operation runs as one closure on the connection's worker thread, so each
/// is atomic with respect to all others.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: StoreOptions,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  /// [`open`](Self::open) with explicit [`StoreOptions`].
  pub async fn open_with(
    path: impl AsRef<Path>,
    options: StoreOptions,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(call_err)?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  /// [`open_in_memory`](Self::open_in_memory) with explicit options.
  pub async fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(call_err)?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(call_err)
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  async fn create(&self, fields: PersonFields) -> Result<i64> {
    fields.validate()?;
    let fields = fields.normalized();
    let document = fields.document_id.clone();
    let registered_at = encode_date(Utc::now().date_naive());

    self
      .conn
      .call(move |conn| {
        if let Some(doc) = &document {
          // TRIM on the stored side too, so rows persisted before
          // normalization still collide.
          let taken: Option<i64> = conn
            .query_row(
              "SELECT id FROM pessoas WHERE TRIM(cpf) = ?1 LIMIT 1",
              rusqlite::params![doc],
              |r| r.get(0),
            )
            .optional()?;
          if taken.is_some() {
            return Err(domain(Error::DuplicateDocument(doc.clone())));
          }
        }

        let id: i64 = conn.query_row(
          "SELECT COALESCE(MAX(id), 0) + 1 FROM pessoas",
          [],
          |r| r.get(0),
        )?;

        conn.execute(
          "INSERT INTO pessoas (
             id, nome, cpf, nascimento, email, telefone, tipo, matricula,
             classe, sala, ano_ingresso, cep, rua, numero, complemento,
             bairro, cidade, estado, data_cadastro
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
          rusqlite::params![
            id,
            fields.name,
            fields.document_id,
            fields.birthdate,
            fields.email,
            fields.phone,
            fields.kind,
            fields.registration_number,
            fields.category,
            fields.room,
            fields.enrollment_year,
            fields.postal_code,
            fields.street,
            fields.number,
            fields.complement,
            fields.district,
            fields.city,
            fields.state,
            registered_at,
          ],
        )?;

        Ok(id)
      })
      .await
      .map_err(call_err)
  }

  async fn read_all(&self) -> Result<Vec<PersonRecord>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, nome, cpf, nascimento, email, telefone, tipo,
                  matricula, classe, sala, ano_ingresso, cep, rua, numero,
                  complemento, bairro, cidade, estado, data_cadastro
           FROM pessoas ORDER BY id ASC",
        )?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(call_err)?;

    raws.into_iter().map(RawPerson::into_record).collect()
  }

  async fn update(&self, id: i64, fields: PersonFields) -> Result<()> {
    let check_document = self.options.unique_document_on_update;
    let fields = fields.normalized();
    let document = fields.document_id.clone();

    self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM pessoas WHERE id = ?1",
            rusqlite::params![id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Err(domain(Error::NotFound(id)));
        }

        if check_document && let Some(doc) = &document {
          let clash: Option<i64> = conn
            .query_row(
              "SELECT id FROM pessoas WHERE TRIM(cpf) = ?1 AND id != ?2 LIMIT 1",
              rusqlite::params![doc, id],
              |r| r.get(0),
            )
            .optional()?;
          if clash.is_some() {
            return Err(domain(Error::DuplicateDocument(doc.clone())));
          }
        }

        // Single UPDATE statement: all mutable fields replaced atomically,
        // id and data_cadastro untouched.
        conn.execute(
          "UPDATE pessoas SET
             nome = ?2, cpf = ?3, nascimento = ?4, email = ?5,
             telefone = ?6, tipo = ?7, matricula = ?8, classe = ?9,
             sala = ?10, ano_ingresso = ?11, cep = ?12, rua = ?13,
             numero = ?14, complemento = ?15, bairro = ?16, cidade = ?17,
             estado = ?18
           WHERE id = ?1",
          rusqlite::params![
            id,
            fields.name,
            fields.document_id,
            fields.birthdate,
            fields.email,
            fields.phone,
            fields.kind,
            fields.registration_number,
            fields.category,
            fields.room,
            fields.enrollment_year,
            fields.postal_code,
            fields.street,
            fields.number,
            fields.complement,
            fields.district,
            fields.city,
            fields.state,
          ],
        )?;

        Ok(())
      })
      .await
      .map_err(call_err)
  }

  async fn delete(&self, id: i64) -> Result<()> {
    // Deleting an absent id is a no-op, so the affected-row count is ignored.
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM pessoas WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await
      .map_err(call_err)
  }
}

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for SqliteStore {
  async fn insert_credential(
    &self,
    login: String,
    password_hash: String,
  ) -> Result<i64> {
    self
      .conn
      .call(move |conn| {
        let taken: Option<i64> = conn
          .query_row(
            "SELECT id FROM usuarios WHERE login = ?1",
            rusqlite::params![login],
            |r| r.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Err(domain(Error::DuplicateLogin(login.clone())));
        }

        let id: i64 = conn.query_row(
          "SELECT COALESCE(MAX(id), 0) + 1 FROM usuarios",
          [],
          |r| r.get(0),
        )?;

        conn.execute(
          "INSERT INTO usuarios (id, login, senha_hash) VALUES (?1, ?2, ?3)",
          rusqlite::params![id, login, password_hash],
        )?;

        Ok(id)
      })
      .await
      .map_err(call_err)
  }

  async fn find_credential(&self, login: &str) -> Result<Option<Credential>> {
    let login = login.to_owned();
    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, login, senha_hash FROM usuarios WHERE login = ?1",
              rusqlite::params![login],
              |row| {
                Ok(Credential {
                  id:            row.get(0)?,
                  login:         row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(call_err)
  }
}
