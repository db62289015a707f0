//! SQLite backend for the cadastro registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! worker thread without blocking the async runtime. Because every
//! operation is a single closure on that one connection, mutations are
//! naturally serialized and readers never observe a partial write.

mod encode;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
