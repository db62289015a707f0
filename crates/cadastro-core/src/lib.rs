//! Core types and trait definitions for the cadastro registry.
//!
//! This crate is deliberately free of database and file-format dependencies.
//! Storage backends (`cadastro-store-sqlite`, `cadastro-store-table`) and the
//! reporting layer depend on it; it depends on nothing heavier than the
//! password-hashing collaborator.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod conformance;
pub mod credential;
pub mod directory;
pub mod error;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use record::{PersonFields, PersonRecord};
pub use store::{CredentialStore, PersonStore, StoreOptions};
