//! Credential — a login paired with an opaque password digest.

use serde::{Deserialize, Serialize};

/// A stored credential. The digest is a PHC string (or whatever the active
/// [`PasswordHasher`](crate::directory::PasswordHasher) produces); the
/// plaintext never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
  pub id:            i64,
  pub login:         String,
  pub password_hash: String,
}
