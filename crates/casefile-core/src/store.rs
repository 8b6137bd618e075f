//! Storage traits and the row shapes they traffic in.
//!
//! The traits are implemented by storage backends (e.g.
//! `casefile-store-sqlite`). The repository façade depends on these
//! abstractions, not on any concrete backend. Rows are the stored shape of a
//! document or record: the document row is the union of every variant's
//! columns, the record row keeps its payload as JSON.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  document::DocumentKind,
  record::RecordKind,
  survivor::{NewSurvivor, Survivor},
};

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One row of the documents table. Variant columns are `None` for variants
/// that do not use them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
  pub document_id:                    Uuid,
  pub survivor_id:                    Uuid,
  pub kind:                           DocumentKind,
  pub created_at:                     DateTime<Utc>,
  pub last_edit_at:                   DateTime<Utc>,
  pub is_deleted:                     bool,
  // inquiry columns
  pub working_experience:             Option<String>,
  pub forwarded_by_organization:      Option<bool>,
  pub forwarded_by_organization_name: Option<String>,
  pub forwarded_by_person:            Option<bool>,
  pub forwarded_by_person_name:       Option<String>,
  pub forwarded_by_survivor:          Option<bool>,
  pub forwarded_by_survivor_name:     Option<String>,
  pub is_self_inquiry:                Option<bool>,
  pub self_inquiry_channels:          Option<i64>,
}

/// One row of the records table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
  pub record_id:   Uuid,
  pub document_id: Uuid,
  pub kind:        RecordKind,
  pub content:     serde_json::Value,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Coarse classification of a backend failure, used by the façade to pick
/// the caller-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFailure {
  /// The addressed row does not exist (or is not live).
  Missing,
  /// A uniqueness or foreign-key constraint rejected the write.
  Constraint,
  Other,
}

pub trait StorageError: std::error::Error + Send + Sync + 'static {
  fn failure(&self) -> StorageFailure;
}

// ─── Cursors ─────────────────────────────────────────────────────────────────

/// A lazily fetched sequence of rows. Each call to [`RowCursor::next_row`]
/// may hit storage; `Ok(None)` marks the end.
pub trait RowCursor: Send {
  type Row;
  type Error;

  fn next_row(
    &mut self,
  ) -> impl Future<Output = Result<Option<Self::Row>, Self::Error>> + Send + '_;
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Shared error type for the storage traits below.
pub trait Backend: Send + Sync {
  type Error: StorageError;
}

/// Minimal survivor persistence: documents only need existence checks and
/// a display reference.
pub trait SurvivorStore: Backend {
  /// Persist a survivor; the store assigns the sequence number.
  fn add_survivor(
    &self,
    input: NewSurvivor,
  ) -> impl Future<Output = Result<Survivor, Self::Error>> + Send + '_;

  fn get_survivor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Survivor>, Self::Error>> + Send + '_;
}

/// CRUD primitives over the documents table. Nothing here filters
/// soft-deleted rows except [`DocumentStore::update_document`].
pub trait DocumentStore: Backend {
  type DocumentCursor: RowCursor<Row = DocumentRow, Error = Self::Error>;

  /// Insert a new row. Fails with a [`StorageFailure::Constraint`] error if
  /// the id is taken or the survivor does not exist.
  fn insert_document(
    &self,
    row: DocumentRow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The raw row, deleted or not.
  fn fetch_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DocumentRow>, Self::Error>> + Send + '_;

  /// Every row owned by `survivor_id`, in insertion order. No I/O happens
  /// until the cursor is polled.
  fn documents_by_survivor(&self, survivor_id: Uuid) -> Self::DocumentCursor;

  /// Apply `mutate` to the live row `id` and write it back atomically.
  /// Fails with a [`StorageFailure::Missing`] error if no live row matches.
  fn update_document<F>(
    &self,
    id: Uuid,
    mutate: F,
  ) -> impl Future<Output = Result<DocumentRow, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut DocumentRow) + Send + 'static;
}

/// CRUD primitives over the records table.
pub trait RecordStore: Backend {
  type RecordCursor: RowCursor<Row = RecordRow, Error = Self::Error>;

  /// Insert a record row, serialising its content. Fails with a
  /// [`StorageFailure::Constraint`] error if the document does not exist or
  /// the record id is taken.
  fn insert_record(
    &self,
    row: RecordRow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every record of one kind across all documents, content still raw.
  fn records_by_kind(&self, kind: RecordKind) -> Self::RecordCursor;

  /// Every record attached to `document_id`, in insertion order.
  fn records_by_document(
    &self,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RecordRow>, Self::Error>> + Send + '_;
}

/// Everything the repository façade needs from a backend.
pub trait CaseStore: SurvivorStore + DocumentStore + RecordStore {}

impl<T> CaseStore for T where T: SurvivorStore + DocumentStore + RecordStore {}
