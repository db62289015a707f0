//! Encoding and decoding helpers between Rust domain types and the plain
//! text stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` strings. Optional text fields are stored
//! as NULL when `None`.

use cadastro_core::{
  record::{PersonFields, PersonRecord, DATE_FORMAT},
  Error, Result,
};
use chrono::NaiveDate;

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format(DATE_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Storage(format!("bad date {s:?}: {e}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `pessoas` row, in declared column order.
pub struct RawPerson {
  pub id:            i64,
  pub nome:          String,
  pub cpf:           Option<String>,
  pub nascimento:    Option<String>,
  pub email:         Option<String>,
  pub telefone:      Option<String>,
  pub tipo:          Option<String>,
  pub matricula:     Option<String>,
  pub classe:        Option<String>,
  pub sala:          Option<String>,
  pub ano_ingresso:  Option<String>,
  pub cep:           Option<String>,
  pub rua:           Option<String>,
  pub numero:        Option<String>,
  pub complemento:   Option<String>,
  pub bairro:        Option<String>,
  pub cidade:        Option<String>,
  pub estado:        Option<String>,
  pub data_cadastro: String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      nome:          row.get(1)?,
      cpf:           row.get(2)?,
      nascimento:    row.get(3)?,
      email:         row.get(4)?,
      telefone:      row.get(5)?,
      tipo:          row.get(6)?,
      matricula:     row.get(7)?,
      classe:        row.get(8)?,
      sala:          row.get(9)?,
      ano_ingresso:  row.get(10)?,
      cep:           row.get(11)?,
      rua:           row.get(12)?,
      numero:        row.get(13)?,
      complemento:   row.get(14)?,
      bairro:        row.get(15)?,
      cidade:        row.get(16)?,
      estado:        row.get(17)?,
      data_cadastro: row.get(18)?,
    })
  }

  pub fn into_record(self) -> Result<PersonRecord> {
    let registered_at = decode_date(&self.data_cadastro)?;
    Ok(PersonRecord::new(self.id, registered_at, PersonFields {
      name:                self.nome,
      document_id:         self.cpf,
      birthdate:           self.nascimento,
      email:               self.email,
      phone:               self.telefone,
      kind:                self.tipo,
      registration_number: self.matricula,
      category:            self.classe,
      room:                self.sala,
      enrollment_year:     self.ano_ingresso,
      postal_code:         self.cep,
      street:              self.rua,
      number:              self.numero,
      complement:          self.complemento,
      district:            self.bairro,
      city:                self.cidade,
      state:               self.estado,
    }))
  }
}
