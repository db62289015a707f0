//! Tabular text codec: comma-separated fields, quoted when needed.
//!
//! A field containing a comma, double quote, or line break is wrapped in
//! double quotes with inner quotes doubled. Empty fields encode `None`.
//! Column order follows [`PERSON_COLUMNS`]; it is part of the file format.

use cadastro_core::{
  record::{PersonFields, PersonRecord, DATE_FORMAT, PERSON_COLUMNS},
  Error, Result,
};
use chrono::NaiveDate;

pub const CREDENTIAL_COLUMNS: [&str; 3] = ["id", "login", "senha_hash"];

// ─── Writing ─────────────────────────────────────────────────────────────────

fn escape(field: &str) -> String {
  if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_owned()
  }
}

fn write_line(out: &mut String, fields: &[String]) {
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    out.push_str(&escape(field));
  }
  out.push('\n');
}

/// Serialize a header plus data rows into file contents.
pub fn write_table(columns: &[&str], rows: &[Vec<String>]) -> String {
  let mut out = String::new();
  write_line(&mut out, &columns.iter().map(|c| (*c).to_owned()).collect::<Vec<_>>());
  for row in rows {
    write_line(&mut out, row);
  }
  out
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse file contents into rows of fields. Quoted fields may span lines.
/// The header row is returned as the first element.
pub fn parse_table(text: &str) -> Result<Vec<Vec<String>>> {
  let mut rows: Vec<Vec<String>> = Vec::new();
  let mut row: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          chars.next();
          field.push('"');
        }
        '"' => in_quotes = false,
        other => field.push(other),
      }
      continue;
    }

    match c {
      '"' if field.is_empty() => in_quotes = true,
      '"' => {
        return Err(Error::Storage("stray quote in unquoted field".into()));
      }
      ',' => {
        row.push(std::mem::take(&mut field));
      }
      '\r' => {} // tolerate CRLF
      '\n' => {
        row.push(std::mem::take(&mut field));
        rows.push(std::mem::take(&mut row));
      }
      other => field.push(other),
    }
  }

  if in_quotes {
    return Err(Error::Storage("unterminated quoted field".into()));
  }
  // Final line without trailing newline.
  if !field.is_empty() || !row.is_empty() {
    row.push(field);
    rows.push(row);
  }

  Ok(rows)
}

// ─── Person rows ─────────────────────────────────────────────────────────────

fn opt(s: &Option<String>) -> String {
  s.clone().unwrap_or_default()
}

fn non_empty(s: String) -> Option<String> {
  if s.is_empty() { None } else { Some(s) }
}

pub fn person_to_row(record: &PersonRecord) -> Vec<String> {
  let f = &record.fields;
  vec![
    record.id.to_string(),
    f.name.clone(),
    opt(&f.document_id),
    opt(&f.birthdate),
    opt(&f.email),
    opt(&f.phone),
    opt(&f.kind),
    opt(&f.registration_number),
    opt(&f.category),
    opt(&f.room),
    opt(&f.enrollment_year),
    opt(&f.postal_code),
    opt(&f.street),
    opt(&f.number),
    opt(&f.complement),
    opt(&f.district),
    opt(&f.city),
    opt(&f.state),
    record.registered_at.format(DATE_FORMAT).to_string(),
  ]
}

pub fn row_to_person(row: Vec<String>) -> Result<PersonRecord> {
  if row.len() != PERSON_COLUMNS.len() {
    return Err(Error::Storage(format!(
      "expected {} columns, found {}",
      PERSON_COLUMNS.len(),
      row.len()
    )));
  }
  let mut it = row.into_iter();
  let mut next = || it.next().unwrap_or_default();

  let id: i64 = next()
    .parse()
    .map_err(|e| Error::Storage(format!("bad id: {e}")))?;
  let fields = PersonFields {
    name:                next(),
    document_id:         non_empty(next()),
    birthdate:           non_empty(next()),
    email:               non_empty(next()),
    phone:               non_empty(next()),
    kind:                non_empty(next()),
    registration_number: non_empty(next()),
    category:            non_empty(next()),
    room:                non_empty(next()),
    enrollment_year:     non_empty(next()),
    postal_code:         non_empty(next()),
    street:              non_empty(next()),
    number:              non_empty(next()),
    complement:          non_empty(next()),
    district:            non_empty(next()),
    city:                non_empty(next()),
    state:               non_empty(next()),
  };
  let registered_at = NaiveDate::parse_from_str(&next(), DATE_FORMAT)
    .map_err(|e| Error::Storage(format!("bad data_cadastro: {e}")))?;

  Ok(PersonRecord::new(id, registered_at, fields))
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadastro_core::record::PersonFields;

  #[test]
  fn quoted_fields_roundtrip() {
    let rows = vec![vec![
      "1".to_owned(),
      "da Silva, \"Zé\"".to_owned(),
      "linha\nquebrada".to_owned(),
    ]];
    let text = write_table(&["id", "nome", "obs"], &rows);
    let parsed = parse_table(&text).unwrap();
    assert_eq!(parsed[0], vec!["id", "nome", "obs"]);
    assert_eq!(parsed[1], rows[0]);
  }

  #[test]
  fn empty_trailing_field_is_kept() {
    let parsed = parse_table("a,b,\n").unwrap();
    assert_eq!(parsed, vec![vec!["a".to_owned(), "b".to_owned(), String::new()]]);
  }

  #[test]
  fn unterminated_quote_is_an_error() {
    assert!(parse_table("\"aberto\n").is_err());
  }

  #[test]
  fn person_row_roundtrip() {
    let record = PersonRecord::new(
      7,
      NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
      PersonFields {
        name:     "Ana, \"a\" Souza".into(),
        category: Some("Juvenil".into()),
        ..Default::default()
      },
    );
    let row = person_to_row(&record);
    assert_eq!(row.len(), PERSON_COLUMNS.len());
    assert_eq!(row_to_person(row).unwrap(), record);
  }

  #[test]
  fn short_row_is_an_error() {
    assert!(row_to_person(vec!["1".into(), "Ana".into()]).is_err());
  }
}
