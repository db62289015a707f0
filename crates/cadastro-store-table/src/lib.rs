//! Flat tabular-file backend for the cadastro registry.
//!
//! Records live in comma-separated text files with a header row, one file
//! for people and one for credentials. An absent file reads as an empty
//! store; every mutation rewrites the file through a temp-file-then-rename
//! so readers never observe a partial write.

mod codec;
mod store;

pub use store::TableStore;
