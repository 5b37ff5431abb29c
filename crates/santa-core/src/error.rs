//! Error types for `santa-core`.
//!
//! The `Display` output of each variant is the message shown to the person
//! at the other end of the form, so keep it human-readable.

use thiserror::Error;

/// Why a submitted name and email failed to resolve to one registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Mismatch {
  #[error("This name is registered with a different email address")]
  NameElsewhere,

  #[error("This email is registered with a different name")]
  EmailElsewhere,

  #[error(
    "Your name and email combination was not found in the Secret Santa \
     list. Please check your details or contact the organizer."
  )]
  NotListed,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(&'static str),

  #[error("Invalid email or password")]
  Auth,

  #[error("This email has already been assigned a person")]
  AlreadyAssigned,

  #[error(transparent)]
  RegistryMismatch(#[from] Mismatch),

  #[error("No suitable names available for assignment")]
  ExhaustedPool,

  #[error("password hashing failed: {0}")]
  Hashing(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A failed allocation write could not be rolled back.
  #[error("storage left inconsistent: {0}")]
  Inconsistent(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
