//! Export renderer — turns a report into a single in-memory HTML document.
//!
//! Layout, in order: centered title, the chart image (when supplied) at a
//! fixed width below it, then a table of a fixed column subset with a bold
//! header row. The table is truncated to the first [`MAX_TABLE_ROWS`] rows
//! — a deliberate bound on output size, not an error. Rendering is pure
//! given its inputs; the only failure mode is a chart declared by path that
//! cannot be read.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use cadastro_core::record::{PersonRecord, DATE_FORMAT};
use thiserror::Error;

/// Body rows beyond this are dropped from the table.
pub const MAX_TABLE_ROWS: usize = 30;

/// Rendered chart width, px. Charts keep their aspect ratio below this.
const CHART_WIDTH: u32 = 480;

/// The exported column subset, header labels in order.
const EXPORT_COLUMNS: [(&str, &str); 7] = [
  ("id", "6%"),
  ("nome", "28%"),
  ("cpf", "14%"),
  ("email", "22%"),
  ("classe", "12%"),
  ("ano_ingresso", "8%"),
  ("data_cadastro", "10%"),
];

#[derive(Debug, Error)]
pub enum RenderError {
  /// The chart was declared as a file path but could not be read.
  #[error("chart image unreadable at {path}: {source}")]
  ChartUnreadable {
    path:   PathBuf,
    source: std::io::Error,
  },
}

/// An externally-rendered chart, either already in memory or on disk.
#[derive(Debug, Clone)]
pub enum ChartImage {
  /// Raw PNG bytes, e.g. straight from the chart collaborator.
  Png(Vec<u8>),
  /// A PNG file on disk; read at render time.
  Path(PathBuf),
}

impl ChartImage {
  fn bytes(&self) -> Result<Vec<u8>, RenderError> {
    match self {
      Self::Png(bytes) => Ok(bytes.clone()),
      Self::Path(path) => {
        std::fs::read(path).map_err(|source| RenderError::ChartUnreadable {
          path: path.clone(),
          source,
        })
      }
    }
  }
}

/// The rendered export artifact.
#[derive(Debug, Clone)]
pub struct Document {
  pub title: String,
  pub html:  String,
}

impl Document {
  pub fn into_bytes(self) -> Vec<u8> {
    self.html.into_bytes()
  }
}

// ─── HTML emission ───────────────────────────────────────────────────────────

fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

fn cell(out: &mut String, value: Option<&str>) {
  out.push_str("<td>");
  if let Some(v) = value {
    out.push_str(&escape_html(v));
  }
  out.push_str("</td>");
}

fn body_row(out: &mut String, record: &PersonRecord) {
  let f = &record.fields;
  out.push_str("<tr>");
  cell(out, Some(&record.id.to_string()));
  cell(out, Some(&f.name));
  cell(out, f.document_id.as_deref());
  cell(out, f.email.as_deref());
  cell(out, f.category.as_deref());
  cell(out, f.enrollment_year.as_deref());
  cell(out, Some(&record.registered_at.format(DATE_FORMAT).to_string()));
  out.push_str("</tr>\n");
}

/// Render `rows` under `title`, with `chart` (when given) below the header.
///
/// A report with zero rows still renders a header-only table.
pub fn render(
  title: &str,
  rows: &[PersonRecord],
  chart: Option<&ChartImage>,
) -> Result<Document, RenderError> {
  let mut html = String::new();

  html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\n");
  html.push_str("<title>");
  html.push_str(&escape_html(title));
  html.push_str("</title>\n<style>\n");
  html.push_str("h1 { text-align: center; }\n");
  html.push_str(".chart { display: block; margin: 0 auto; }\n");
  // Fixed layout: column widths come from the <col> declarations, never
  // from the content.
  html.push_str("table { table-layout: fixed; width: 100%; border-collapse: collapse; }\n");
  html.push_str("th { font-weight: bold; text-align: left; }\n");
  html.push_str("th, td { border: 1px solid #999; padding: 2px 6px; overflow: hidden; }\n");
  html.push_str("</style>\n</head>\n<body>\n");

  html.push_str("<h1>");
  html.push_str(&escape_html(title));
  html.push_str("</h1>\n");

  if let Some(chart) = chart {
    let encoded = B64.encode(chart.bytes()?);
    html.push_str(&format!(
      "<img class=\"chart\" width=\"{CHART_WIDTH}\" \
       src=\"data:image/png;base64,{encoded}\" alt=\"\">\n"
    ));
  }

  html.push_str("<table>\n");
  for (_, width) in EXPORT_COLUMNS {
    html.push_str(&format!("<col style=\"width: {width}\">"));
  }
  html.push_str("\n<tr>");
  for (label, _) in EXPORT_COLUMNS {
    html.push_str("<th>");
    html.push_str(label);
    html.push_str("</th>");
  }
  html.push_str("</tr>\n");

  for record in rows.iter().take(MAX_TABLE_ROWS) {
    body_row(&mut html, record);
  }

  html.push_str("</table>\n</body></html>\n");

  Ok(Document { title: title.to_owned(), html })
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadastro_core::record::PersonFields;
  use chrono::NaiveDate;

  fn rows(n: usize) -> Vec<PersonRecord> {
    (1..=n as i64)
      .map(|id| {
        PersonRecord::new(
          id,
          NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
          PersonFields { name: format!("Pessoa {id}"), ..Default::default() },
        )
      })
      .collect()
  }

  fn body_row_count(html: &str) -> usize {
    // One <tr> is the header.
    html.matches("<tr>").count() - 1
  }

  #[test]
  fn forty_five_rows_render_exactly_thirty() {
    let doc = render("Relatório Geral", &rows(45), None).unwrap();
    assert_eq!(body_row_count(&doc.html), 30);
  }

  #[test]
  fn zero_rows_render_header_only_table() {
    let doc = render("Vazio", &rows(0), None).unwrap();
    assert_eq!(body_row_count(&doc.html), 0);
    assert!(doc.html.contains("<th>nome</th>"));
  }

  #[test]
  fn missing_values_render_as_empty_cells() {
    let doc = render("Um", &rows(1), None).unwrap();
    // cpf, email, classe, ano_ingresso are all unset.
    assert!(doc.html.contains("<td></td><td></td><td></td><td></td>"));
    assert!(!doc.html.contains("N/A"));
  }

  #[test]
  fn title_is_escaped_and_centered() {
    let doc = render("Turma <B> & Cia", &rows(1), None).unwrap();
    assert!(doc.html.contains("<h1>Turma &lt;B&gt; &amp; Cia</h1>"));
    assert!(doc.html.contains("h1 { text-align: center; }"));
  }

  #[test]
  fn inline_chart_is_embedded_as_data_uri() {
    let chart = ChartImage::Png(vec![0x89, b'P', b'N', b'G']);
    let doc = render("Com gráfico", &rows(2), Some(&chart)).unwrap();
    assert!(doc.html.contains("data:image/png;base64,iVBORw=="));
    assert!(doc.html.contains(&format!("width=\"{CHART_WIDTH}\"")));
  }

  #[test]
  fn unreadable_chart_path_fails() {
    let chart = ChartImage::Path(PathBuf::from("/definitely/missing.png"));
    let err = render("Com gráfico", &rows(2), Some(&chart)).unwrap_err();
    assert!(matches!(err, RenderError::ChartUnreadable { .. }));
  }

  #[test]
  fn rows_keep_snapshot_order() {
    let doc = render("Ordem", &rows(3), None).unwrap();
    let a = doc.html.find("Pessoa 1").unwrap();
    let b = doc.html.find("Pessoa 2").unwrap();
    let c = doc.html.find("Pessoa 3").unwrap();
    assert!(a < b && b < c);
  }
}
