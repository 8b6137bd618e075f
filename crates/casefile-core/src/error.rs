//! Error types for `casefile-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::store::{StorageError, StorageFailure};

#[derive(Debug, Error)]
pub enum Error {
  /// A required dependency was missing or an input was degenerate.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The id does not resolve to a live document. Soft-deleted documents
  /// report this too.
  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  #[error("survivor not found: {0}")]
  SurvivorNotFound(Uuid),

  /// Uniqueness or foreign-key violation reported by the store on insert.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("unsupported record kind: {0}")]
  UnsupportedRecordKind(&'static str),

  #[error("operation cancelled")]
  OperationCancelled,

  #[error("unknown {entity} discriminator: {value:?}")]
  UnknownDiscriminator { entity: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `true` for conditions a caller should treat as a bad argument,
  /// including records whose kind is not registered.
  pub fn is_invalid_argument(&self) -> bool {
    matches!(self, Self::InvalidArgument(_) | Self::UnsupportedRecordKind(_))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::DocumentNotFound(_) | Self::SurvivorNotFound(_))
  }

  /// Translate a backend failure that is not tied to a particular document.
  pub fn from_storage<E: StorageError>(err: E) -> Self {
    match err.failure() {
      StorageFailure::Constraint => Self::ConstraintViolation(err.to_string()),
      StorageFailure::Missing | StorageFailure::Other => {
        Self::Storage(Box::new(err))
      }
    }
  }

  /// Translate a backend failure for an operation addressing
  /// `document_id`; a missing row becomes [`Error::DocumentNotFound`].
  pub fn from_document_storage<E: StorageError>(
    err: E,
    document_id: Uuid,
  ) -> Self {
    match err.failure() {
      StorageFailure::Missing => Self::DocumentNotFound(document_id),
      _ => Self::from_storage(err),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
