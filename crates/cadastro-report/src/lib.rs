//! Reporting and export for the cadastro registry.
//!
//! Everything here is pure: filters and aggregations operate on the snapshot
//! returned by `read_all`, and the renderer turns a filtered report plus an
//! optional externally-produced chart image into one in-memory document. No
//! storage access, no side effects.

pub mod aggregate;
pub mod export;
pub mod filter;

pub use aggregate::{count_by, CountBy};
pub use export::{render, ChartImage, Document, RenderError, MAX_TABLE_ROWS};
pub use filter::ReportFilter;
