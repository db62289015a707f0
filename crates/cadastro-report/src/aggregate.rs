//! Grouped row counts — the data series behind the charts.

use cadastro_core::record::PersonRecord;

/// The field to group on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountBy {
  /// `classe`; presentation order is first-seen order in the snapshot.
  Category,
  /// `ano_ingresso`; sorted ascending by year.
  EnrollmentYear,
  /// Year-month of `data_cadastro` (`YYYY-MM`); sorted ascending.
  RegistrationMonth,
}

impl CountBy {
  fn key(self, record: &PersonRecord) -> String {
    match self {
      Self::Category => record.fields.category.clone().unwrap_or_default(),
      Self::EnrollmentYear => {
        record.fields.enrollment_year.clone().unwrap_or_default()
      }
      Self::RegistrationMonth => record.registered_at.format("%Y-%m").to_string(),
    }
  }

  fn is_categorical(self) -> bool {
    matches!(self, Self::Category)
  }
}

/// Count rows per distinct key, returning `(key, count)` pairs in their
/// presentation order: first-seen for categorical keys, ascending key value
/// for numeric and temporal ones. Rows without the field group under the
/// empty key.
pub fn count_by(rows: &[PersonRecord], group: CountBy) -> Vec<(String, usize)> {
  let mut counts: Vec<(String, usize)> = Vec::new();

  for record in rows {
    let key = group.key(record);
    match counts.iter_mut().find(|(k, _)| *k == key) {
      Some((_, n)) => *n += 1,
      None => counts.push((key, 1)),
    }
  }

  if !group.is_categorical() {
    // Numeric-aware where the keys parse, lexicographic otherwise; `YYYY-MM`
    // keys sort chronologically either way.
    counts.sort_by(|(a, _), (b, _)| {
      (a.parse::<i64>().ok(), a).cmp(&(b.parse::<i64>().ok(), b))
    });
  }

  counts
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadastro_core::record::PersonFields;
  use chrono::NaiveDate;

  fn record(id: i64, registered: (i32, u32, u32), fields: PersonFields) -> PersonRecord {
    let (y, m, d) = registered;
    PersonRecord::new(id, NaiveDate::from_ymd_opt(y, m, d).unwrap(), fields)
  }

  fn with_category(id: i64, name: &str, category: &str) -> PersonRecord {
    record(id, (2024, 1, 1), PersonFields {
      name:     name.into(),
      category: Some(category.into()),
      ..Default::default()
    })
  }

  #[test]
  fn category_counts_in_first_seen_order() {
    let rows = vec![
      with_category(1, "Ana", "A"),
      with_category(2, "Bruno", "B"),
      with_category(3, "Carla", "A"),
    ];
    assert_eq!(count_by(&rows, CountBy::Category), vec![
      ("A".to_owned(), 2),
      ("B".to_owned(), 1),
    ]);
  }

  #[test]
  fn missing_category_groups_under_empty_key() {
    let rows = vec![
      with_category(1, "Ana", "A"),
      record(2, (2024, 1, 1), PersonFields { name: "Bruno".into(), ..Default::default() }),
    ];
    assert_eq!(count_by(&rows, CountBy::Category), vec![
      ("A".to_owned(), 1),
      (String::new(), 1),
    ]);
  }

  #[test]
  fn enrollment_year_sorts_ascending_regardless_of_arrival() {
    let mk = |id, year: &str| {
      record(id, (2024, 1, 1), PersonFields {
        name:            format!("p{id}"),
        enrollment_year: Some(year.into()),
        ..Default::default()
      })
    };
    let rows = vec![mk(1, "2024"), mk(2, "2022"), mk(3, "2024"), mk(4, "2023")];
    assert_eq!(count_by(&rows, CountBy::EnrollmentYear), vec![
      ("2022".to_owned(), 1),
      ("2023".to_owned(), 1),
      ("2024".to_owned(), 2),
    ]);
  }

  #[test]
  fn registration_month_sorts_chronologically() {
    let mk = |id, y, m| {
      record(id, (y, m, 5), PersonFields { name: format!("p{id}"), ..Default::default() })
    };
    let rows = vec![mk(1, 2024, 11), mk(2, 2023, 2), mk(3, 2024, 11), mk(4, 2024, 3)];
    assert_eq!(count_by(&rows, CountBy::RegistrationMonth), vec![
      ("2023-02".to_owned(), 1),
      ("2024-03".to_owned(), 1),
      ("2024-11".to_owned(), 2),
    ]);
  }
}
