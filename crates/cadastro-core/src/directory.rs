//! The credential directory — registration and verification of logins.
//!
//! Digest computation is behind the [`PasswordHasher`] seam so the store
//! never sees a plaintext and tests can swap in a cheap hasher. The default
//! implementation is argon2 with a fresh OS-random salt per registration,
//! producing PHC strings (`$argon2id$v=19$…`).

use argon2::{
  password_hash::SaltString, Argon2, PasswordHash, PasswordHasher as _,
  PasswordVerifier as _,
};
use rand_core::OsRng;

use crate::{store::CredentialStore, Error, Result};

// ─── Hashing seam ────────────────────────────────────────────────────────────

/// One-way password digest collaborator.
pub trait PasswordHasher: Send + Sync {
  /// Compute an opaque digest of `plaintext`.
  fn hash(&self, plaintext: &str) -> Result<String>;

  /// `true` only when `plaintext` matches `digest`.
  fn verify(&self, digest: &str, plaintext: &str) -> bool;
}

/// Argon2id with per-registration OS-random salts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
  fn hash(&self, plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(plaintext.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|_| Error::Hash)
  }

  fn verify(&self, digest: &str, plaintext: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
      return false;
    };
    Argon2::default()
      .verify_password(plaintext.as_bytes(), &parsed)
      .is_ok()
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// Registers and verifies logins atop any [`CredentialStore`].
pub struct CredentialDirectory<S, H = Argon2Hasher> {
  store:  S,
  hasher: H,
}

impl<S: CredentialStore> CredentialDirectory<S, Argon2Hasher> {
  pub fn new(store: S) -> Self {
    Self { store, hasher: Argon2Hasher }
  }
}

impl<S: CredentialStore, H: PasswordHasher> CredentialDirectory<S, H> {
  pub fn with_hasher(store: S, hasher: H) -> Self {
    Self { store, hasher }
  }

  /// Hash `password` and persist `{login, digest}`. Fails with
  /// `DuplicateLogin` when the login is taken. The plaintext is neither
  /// stored nor logged.
  pub async fn register(&self, login: &str, password: &str) -> Result<i64> {
    let digest = self.hasher.hash(password)?;
    let id = self
      .store
      .insert_credential(login.to_owned(), digest)
      .await?;
    tracing::info!(login, "registered credential");
    Ok(id)
  }

  /// `Ok(true)` only when `login` exists and `password` matches its digest.
  /// Unknown logins and digest mismatches are indistinguishable: both yield
  /// `Ok(false)`.
  pub async fn verify(&self, login: &str, password: &str) -> Result<bool> {
    match self.store.find_credential(login).await? {
      Some(cred) => Ok(self.hasher.verify(&cred.password_hash, password)),
      None       => Ok(false),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn argon2_roundtrip() {
    let hasher = Argon2Hasher;
    let digest = hasher.hash("segredo").unwrap();
    assert!(digest.starts_with("$argon2"));
    assert!(hasher.verify(&digest, "segredo"));
    assert!(!hasher.verify(&digest, "errado"));
  }

  #[test]
  fn malformed_digest_never_verifies() {
    assert!(!Argon2Hasher.verify("not-a-phc-string", "segredo"));
  }

  #[test]
  fn salts_differ_between_registrations() {
    let hasher = Argon2Hasher;
    let a = hasher.hash("mesma-senha").unwrap();
    let b = hasher.hash("mesma-senha").unwrap();
    assert_ne!(a, b);
  }
}
