//! Error type for `santa-store-sqlite`.

use santa_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// An allocation write failed and the compensating rollback failed too.
  #[error("allocation write failed ({cause}) and rollback failed ({rollback})")]
  Inconsistent {
    cause:    rusqlite::Error,
    rollback: rusqlite::Error,
  },
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Self::Database(tokio_rusqlite::Error::Rusqlite(e)) }
}

impl StoreError for Error {
  fn is_inconsistent(&self) -> bool { matches!(self, Self::Inconsistent { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
