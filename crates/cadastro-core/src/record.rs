//! Person record types — the fundamental unit of the registry.
//!
//! A [`PersonRecord`] is a stored row; [`PersonFields`] is the named-field
//! request used for both creation and full-field update, so callers never
//! deal in positional data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Persisted schema ────────────────────────────────────────────────────────

/// Column names of the persisted person schema, in order.
///
/// The order is load-bearing for the tabular-file backend; the SQLite backend
/// declares the same columns in the same order in its DDL.
pub const PERSON_COLUMNS: [&str; 19] = [
  "id",
  "nome",
  "cpf",
  "nascimento",
  "email",
  "telefone",
  "tipo",
  "matricula",
  "classe",
  "sala",
  "ano_ingresso",
  "cep",
  "rua",
  "numero",
  "complemento",
  "bairro",
  "cidade",
  "estado",
  "data_cadastro",
];

/// Dates are persisted as `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Field set ───────────────────────────────────────────────────────────────

/// Every mutable field of a person record.
///
/// Used verbatim by `create` and `update`; update replaces all of these at
/// once (`id` and `registered_at` are not part of the set and survive
/// untouched).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFields {
  /// Required; the only field validated at creation.
  pub name:                String,
  /// National document id (`cpf`). Unique among live records when present.
  pub document_id:         Option<String>,
  /// Birth date as captured from the caller, `YYYY-MM-DD` expected. Kept as
  /// a raw string; reports parse it tolerantly and skip what doesn't parse.
  pub birthdate:           Option<String>,
  pub email:               Option<String>,
  pub phone:               Option<String>,
  /// `tipo` — e.g. student / teacher.
  pub kind:                Option<String>,
  /// `matricula` — enrolment number.
  pub registration_number: Option<String>,
  /// `classe` — the classification label reports group on.
  pub category:            Option<String>,
  /// `sala`.
  pub room:                Option<String>,
  /// `ano_ingresso`.
  pub enrollment_year:     Option<String>,
  // Address block.
  pub postal_code:         Option<String>,
  pub street:              Option<String>,
  pub number:              Option<String>,
  pub complement:          Option<String>,
  pub district:            Option<String>,
  pub city:                Option<String>,
  pub state:               Option<String>,
}

impl PersonFields {
  /// Creation-time validation: `name` must be present and non-blank.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("nome"));
    }
    Ok(())
  }

  /// The `document_id`, normalised: `Some` only when non-blank.
  pub fn document_id_normalized(&self) -> Option<&str> {
    self
      .document_id
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
  }

  /// The shape both backends persist: `document_id` trimmed (blank ⇒
  /// `None`), every other optional field `None` when empty. Called by the
  /// stores before any uniqueness check or write, so the two backends never
  /// diverge on what a "present" field is.
  pub fn normalized(mut self) -> Self {
    let document = self.document_id_normalized().map(str::to_owned);
    self.document_id = document;

    for field in [
      &mut self.birthdate,
      &mut self.email,
      &mut self.phone,
      &mut self.kind,
      &mut self.registration_number,
      &mut self.category,
      &mut self.room,
      &mut self.enrollment_year,
      &mut self.postal_code,
      &mut self.street,
      &mut self.number,
      &mut self.complement,
      &mut self.district,
      &mut self.city,
      &mut self.state,
    ] {
      if field.as_deref() == Some("") {
        *field = None;
      }
    }
    self
  }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A live person record as returned by `read_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
  /// Store-assigned; 1 for the first record, else `max(live ids) + 1`.
  pub id:            i64,
  /// Set exactly once at creation; `update` never touches it.
  pub registered_at: NaiveDate,
  #[serde(flatten)]
  pub fields:        PersonFields,
}

impl PersonRecord {
  pub fn new(id: i64, registered_at: NaiveDate, fields: PersonFields) -> Self {
    Self { id, registered_at, fields }
  }

  /// Birthdate parsed as `YYYY-MM-DD`, or `None` when absent or malformed.
  pub fn birthdate_parsed(&self) -> Option<NaiveDate> {
    self
      .fields
      .birthdate
      .as_deref()
      .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_rejects_blank_name() {
    let fields = PersonFields { name: "   ".into(), ..Default::default() };
    assert!(matches!(fields.validate(), Err(Error::Validation("nome"))));
  }

  #[test]
  fn validate_accepts_name() {
    let fields = PersonFields { name: "Ana".into(), ..Default::default() };
    assert!(fields.validate().is_ok());
  }

  #[test]
  fn blank_document_id_normalises_to_none() {
    let fields = PersonFields {
      name:        "Ana".into(),
      document_id: Some("  ".into()),
      ..Default::default()
    };
    assert_eq!(fields.document_id_normalized(), None);
  }

  #[test]
  fn normalized_trims_document_and_drops_empty_optionals() {
    let fields = PersonFields {
      name:        "Ana".into(),
      document_id: Some(" 111 ".into()),
      email:       Some(String::new()),
      phone:       Some("  ".into()),
      ..Default::default()
    }
    .normalized();

    assert_eq!(fields.document_id.as_deref(), Some("111"));
    assert_eq!(fields.email, None);
    // Whitespace-only values are kept; only the document id is trimmed.
    assert_eq!(fields.phone.as_deref(), Some("  "));
  }

  #[test]
  fn normalized_blank_document_becomes_none() {
    let fields = PersonFields {
      name:        "Ana".into(),
      document_id: Some("   ".into()),
      ..Default::default()
    }
    .normalized();
    assert_eq!(fields.document_id, None);
  }

  #[test]
  fn unparseable_birthdate_is_none() {
    let record = PersonRecord::new(
      1,
      NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      PersonFields {
        name:      "Ana".into(),
        birthdate: Some("15/03/1990".into()),
        ..Default::default()
      },
    );
    assert_eq!(record.birthdate_parsed(), None);
  }

  #[test]
  fn birthdate_parses_iso() {
    let record = PersonRecord::new(
      1,
      NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      PersonFields {
        name:      "Ana".into(),
        birthdate: Some("1990-03-15".into()),
        ..Default::default()
      },
    );
    assert_eq!(
      record.birthdate_parsed(),
      NaiveDate::from_ymd_opt(1990, 3, 15)
    );
  }
}
