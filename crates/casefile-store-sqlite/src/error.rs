//! Error type for `casefile-store-sqlite`.

use casefile_core::store::{StorageError, StorageFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] casefile_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// No live document row matched an update.
  #[error("document not found: {0}")]
  DocumentNotFound(uuid::Uuid),
}

impl StorageError for Error {
  fn failure(&self) -> StorageFailure {
    match self {
      Error::DocumentNotFound(_) => StorageFailure::Missing,
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => classify(e),
      _ => StorageFailure::Other,
    }
  }
}

fn classify(err: &rusqlite::Error) -> StorageFailure {
  match err {
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      StorageFailure::Constraint
    }
    rusqlite::Error::QueryReturnedNoRows => StorageFailure::Missing,
    _ => StorageFailure::Other,
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
