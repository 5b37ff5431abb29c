//! Registrant passwords, stored as argon2 PHC strings.

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  Version, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hashes and verifies registrant passwords.
#[derive(Clone, Default)]
pub struct CredentialHasher {
  argon2: Argon2<'static>,
}

impl CredentialHasher {
  /// A hasher with explicit argon2id cost parameters.
  pub fn with_params(params: Params) -> Self {
    Self { argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) }
  }

  pub fn hash(&self, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .argon2
      .hash_password(password.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| Error::Hashing(e.to_string()))
  }

  /// `false` for a wrong password and for an unparseable stored hash alike.
  pub fn verify(&self, password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
      .and_then(|parsed| self.argon2.verify_password(password.as_bytes(), &parsed))
      .is_ok()
  }
}
