//! Snapshot filters.
//!
//! Filters are stable: they keep the ascending-id order of the source
//! snapshot and never reorder. The baseline application applies exactly one
//! per report, but nothing stops a caller chaining `apply` calls.

use cadastro_core::record::PersonRecord;
use chrono::{Datelike as _, NaiveDate};

/// One report filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
  /// Every row, unchanged.
  All,
  /// Rows whose `category` equals the value.
  Category(String),
  /// Rows whose `enrollment_year` equals the value.
  EnrollmentYear(String),
  /// Rows whose birthdate falls in the given month (1–12), any year.
  /// Rows with a missing or unparseable birthdate are excluded, never an
  /// error — the "aniversariantes do mês" report.
  BirthMonth(u32),
  /// Rows registered within the range, both ends inclusive.
  RegisteredBetween { start: NaiveDate, end: NaiveDate },
}

impl ReportFilter {
  fn matches(&self, record: &PersonRecord) -> bool {
    match self {
      Self::All => true,
      Self::Category(value) => record.fields.category.as_deref() == Some(value),
      Self::EnrollmentYear(value) => {
        record.fields.enrollment_year.as_deref() == Some(value)
      }
      Self::BirthMonth(month) => record
        .birthdate_parsed()
        .is_some_and(|d| d.month() == *month),
      Self::RegisteredBetween { start, end } => {
        (*start..=*end).contains(&record.registered_at)
      }
    }
  }

  /// Filter `snapshot`, preserving its order.
  pub fn apply(&self, snapshot: &[PersonRecord]) -> Vec<PersonRecord> {
    snapshot
      .iter()
      .filter(|r| self.matches(r))
      .cloned()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadastro_core::record::PersonFields;

  fn record(id: i64, fields: PersonFields) -> PersonRecord {
    PersonRecord::new(id, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(), fields)
  }

  fn snapshot() -> Vec<PersonRecord> {
    vec![
      record(1, PersonFields {
        name:      "Ana".into(),
        category:  Some("A".into()),
        birthdate: Some("1990-03-15".into()),
        ..Default::default()
      }),
      record(2, PersonFields {
        name:            "Bruno".into(),
        category:        Some("B".into()),
        birthdate:       Some("não sei".into()),
        enrollment_year: Some("2023".into()),
        ..Default::default()
      }),
      record(3, PersonFields {
        name:            "Carla".into(),
        category:        Some("A".into()),
        enrollment_year: Some("2024".into()),
        ..Default::default()
      }),
    ]
  }

  #[test]
  fn all_returns_every_row_unchanged() {
    let rows = snapshot();
    assert_eq!(ReportFilter::All.apply(&rows), rows);
  }

  #[test]
  fn category_filter_is_exact_and_order_preserving() {
    let rows = ReportFilter::Category("A".into()).apply(&snapshot());
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(rows.iter().all(|r| r.fields.category.as_deref() == Some("A")));
  }

  #[test]
  fn enrollment_year_filter() {
    let rows = ReportFilter::EnrollmentYear("2023".into()).apply(&snapshot());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 2);
  }

  #[test]
  fn birth_month_matches_month_regardless_of_year() {
    let rows = snapshot();
    let march = ReportFilter::BirthMonth(3).apply(&rows);
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].id, 1);

    let april = ReportFilter::BirthMonth(4).apply(&rows);
    assert!(april.is_empty());
  }

  #[test]
  fn birth_month_skips_missing_and_unparseable_birthdates() {
    // id 2 has garbage, id 3 has nothing; neither matches any month.
    let rows = snapshot();
    for month in 1..=12 {
      let hit = ReportFilter::BirthMonth(month).apply(&rows);
      assert!(hit.iter().all(|r| r.id == 1));
    }
  }

  #[test]
  fn registered_between_is_inclusive_both_ends() {
    let rows = snapshot();
    let d = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

    let hit = ReportFilter::RegisteredBetween { start: d, end: d }.apply(&rows);
    assert_eq!(hit.len(), 3);

    let miss = ReportFilter::RegisteredBetween {
      start: NaiveDate::from_ymd_opt(2024, 5, 11).unwrap(),
      end:   NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    }
    .apply(&rows);
    assert!(miss.is_empty());
  }
}
