//! [`Repository`] — the public contract over documents and records.
//!
//! The façade composes a [`CaseStore`] backend, a [`CaseMapper`] and the
//! [`RecordRegistry`]. It owns the lifecycle rules: soft-deleted documents
//! are invisible to every read except the citizenship vocabulary, and every
//! operation observes its [`CancellationToken`] on entry and after each
//! storage round-trip, so a pre-cancelled call never writes.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  cancel::CancellationToken,
  citizenship::{self, Completions},
  document::{
    DocumentBody, DocumentKind, InquiryDocument, LifeSituationDocument,
    NewInquiry,
  },
  inquiry,
  mapper::{CaseMapper, StandardMapper},
  record::{BaseRecord, Record},
  registry::RecordRegistry,
  store::{CaseStore, DocumentRow, RowCursor},
  survivor::Survivor,
};

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Assembles a [`Repository`]. The store and the mapper are required; the
/// registry defaults to [`RecordRegistry::standard`].
pub struct RepositoryBuilder<S, M = StandardMapper> {
  store:    Option<Arc<S>>,
  mapper:   Option<Arc<M>>,
  registry: Option<RecordRegistry>,
}

impl<S, M> Default for RepositoryBuilder<S, M> {
  fn default() -> Self { Self { store: None, mapper: None, registry: None } }
}

impl<S, M> RepositoryBuilder<S, M>
where
  S: CaseStore,
  M: CaseMapper,
{
  pub fn new() -> Self { Self::default() }

  pub fn store(mut self, store: Arc<S>) -> Self {
    self.store = Some(store);
    self
  }

  pub fn mapper(mut self, mapper: Arc<M>) -> Self {
    self.mapper = Some(mapper);
    self
  }

  pub fn registry(mut self, registry: RecordRegistry) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Fails with [`Error::InvalidArgument`] if the store or the mapper was not
  /// supplied. Performs no I/O.
  pub fn build(self) -> Result<Repository<S, M>> {
    let store = self
      .store
      .ok_or_else(|| Error::InvalidArgument("repository requires a store".into()))?;
    let mapper = self
      .mapper
      .ok_or_else(|| Error::InvalidArgument("repository requires a mapper".into()))?;
    Ok(Repository {
      store,
      mapper,
      registry: Arc::new(self.registry.unwrap_or_default()),
    })
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// Document and record repository.
///
/// Cloning is cheap; clones share the backend.
pub struct Repository<S, M = StandardMapper> {
  store:    Arc<S>,
  mapper:   Arc<M>,
  registry: Arc<RecordRegistry>,
}

impl<S, M> Clone for Repository<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      mapper:   Arc::clone(&self.mapper),
      registry: Arc::clone(&self.registry),
    }
  }
}

impl<S: CaseStore> Repository<S, StandardMapper> {
  /// A repository using [`StandardMapper`] and the standard registry.
  pub fn with_standard_mapper(store: Arc<S>) -> Self {
    Self {
      store,
      mapper: Arc::new(StandardMapper),
      registry: Arc::new(RecordRegistry::standard()),
    }
  }
}

impl<S, M> Repository<S, M>
where
  S: CaseStore,
  M: CaseMapper,
{
  pub fn builder() -> RepositoryBuilder<S, M> { RepositoryBuilder::new() }

  /// The backend, for operations outside this contract (survivor setup).
  pub fn store(&self) -> &S { &self.store }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Fetch one live document. Deleted and absent documents both fail with
  /// [`Error::DocumentNotFound`]; cancellation wins over either.
  pub async fn get_single(
    &self,
    document_id: Uuid,
    cancel: &CancellationToken,
  ) -> Result<LifeSituationDocument> {
    cancel.check()?;
    let row = self.live_document(document_id).await;
    cancel.check()?;
    let row = row?;

    let survivor = self.resolve_survivor(row.survivor_id).await?;
    cancel.check()?;
    self.mapper.document_from_row(row, survivor)
  }

  /// Stream the live documents owned by `survivor_id`. Nothing is fetched
  /// until the stream is polled.
  pub fn get_all_by_survivor(
    &self,
    survivor_id: Uuid,
    cancel: &CancellationToken,
  ) -> DocumentStream<'_, S, M> {
    DocumentStream {
      repository: self,
      cursor:     self.store.documents_by_survivor(survivor_id),
      survivor:   None,
      cancel:     cancel.clone(),
    }
  }

  /// Records attached to a live document, in attachment order.
  pub async fn get_records(
    &self,
    document_id: Uuid,
    cancel: &CancellationToken,
  ) -> Result<Vec<Record>> {
    cancel.check()?;
    self.live_document(document_id).await?;
    cancel.check()?;

    let rows = self
      .store
      .records_by_document(document_id)
      .await
      .map_err(|e| Error::from_document_storage(e, document_id))?;
    cancel.check()?;

    rows
      .into_iter()
      .map(|row| self.mapper.record_from_row(row))
      .collect()
  }

  /// Distinct citizenship labels across every document, sorted ascending.
  /// Recomputed on each call.
  pub async fn citizenship_completions(
    &self,
    cancel: &CancellationToken,
  ) -> Result<Completions> {
    citizenship::collect(self.store.as_ref(), cancel).await
  }

  // ── Writes ──────────────────────────────────────────────────────────────

  /// Create an inquiry document, folding `input.sources` into its flags.
  ///
  /// Fails with [`Error::ConstraintViolation`] if the survivor does not
  /// exist or the document id is taken.
  pub async fn create_inquiry(
    &self,
    input: NewInquiry,
    cancel: &CancellationToken,
  ) -> Result<LifeSituationDocument> {
    cancel.check()?;

    let survivor = self
      .store
      .get_survivor(input.survivor_id)
      .await
      .map_err(Error::from_storage)?
      .ok_or_else(|| {
        Error::ConstraintViolation(format!(
          "survivor {} does not exist",
          input.survivor_id
        ))
      })?;
    cancel.check()?;

    let document = LifeSituationDocument {
      document_id: input.document_id,
      survivor,
      created_at: input.created_at,
      last_edit_at: input.last_edit_at,
      is_deleted: input.is_deleted,
      body: DocumentBody::Inquiry(InquiryDocument {
        working_experience: input.working_experience,
        sources:            inquiry::encode(&input.sources),
      }),
    };

    let row = self.mapper.document_to_row(&document);
    self
      .store
      .insert_document(row)
      .await
      .map_err(Error::from_storage)?;

    tracing::debug!(document_id = %document.document_id, "created inquiry");
    Ok(document)
  }

  /// Attach `record` to a live document.
  ///
  /// The record's type is checked against the registry before any I/O, so
  /// an unregistered type fails with [`Error::UnsupportedRecordKind`] and
  /// writes nothing.
  pub async fn add_record(
    &self,
    document_id: Uuid,
    record: &dyn BaseRecord,
    cancel: &CancellationToken,
  ) -> Result<()> {
    cancel.check()?;

    let shape = self.registry.resolve(record)?;
    let row = self.mapper.record_to_row(document_id, record, shape)?;

    self.live_document(document_id).await?;
    cancel.check()?;

    let record_id = row.record_id;
    self
      .store
      .insert_record(row)
      .await
      .map_err(Error::from_storage)?;

    tracing::debug!(
      %document_id,
      %record_id,
      kind = shape.discriminant(),
      "attached record"
    );
    Ok(())
  }

  /// Replace the working-experience note of an inquiry document. No other
  /// field, timestamps included, is touched.
  pub async fn set_working_experience(
    &self,
    document_id: Uuid,
    text: impl Into<String>,
    cancel: &CancellationToken,
  ) -> Result<()> {
    cancel.check()?;
    let text = text.into();

    let row = self.live_document(document_id).await?;
    if !matches!(row.kind, DocumentKind::Inquiry) {
      return Err(Error::DocumentNotFound(document_id));
    }
    cancel.check()?;

    self
      .store
      .update_document(document_id, move |row| {
        row.working_experience = Some(text);
      })
      .await
      .map_err(|e| Error::from_document_storage(e, document_id))?;

    tracing::debug!(%document_id, "updated working experience");
    Ok(())
  }

  /// Mark a live document as deleted. It stays in storage and keeps
  /// contributing to the citizenship vocabulary.
  pub async fn soft_delete(
    &self,
    document_id: Uuid,
    cancel: &CancellationToken,
  ) -> Result<()> {
    cancel.check()?;

    self
      .store
      .update_document(document_id, |row| row.is_deleted = true)
      .await
      .map_err(|e| Error::from_document_storage(e, document_id))?;

    tracing::debug!(%document_id, "soft-deleted document");
    Ok(())
  }

  // ── Helpers ─────────────────────────────────────────────────────────────

  async fn live_document(&self, document_id: Uuid) -> Result<DocumentRow> {
    self
      .store
      .fetch_document(document_id)
      .await
      .map_err(|e| Error::from_document_storage(e, document_id))?
      .filter(|row| !row.is_deleted)
      .ok_or(Error::DocumentNotFound(document_id))
  }

  async fn resolve_survivor(&self, survivor_id: Uuid) -> Result<Survivor> {
    self
      .store
      .get_survivor(survivor_id)
      .await
      .map_err(Error::from_storage)?
      .ok_or(Error::SurvivorNotFound(survivor_id))
  }
}

// ─── DocumentStream ──────────────────────────────────────────────────────────

/// Lazily materialised live documents of one survivor.
///
/// Each call to [`DocumentStream::next`] checks the cancellation token before
/// and after touching storage.
pub struct DocumentStream<'r, S: CaseStore, M> {
  repository: &'r Repository<S, M>,
  cursor:     S::DocumentCursor,
  survivor:   Option<Survivor>,
  cancel:     CancellationToken,
}

impl<S, M> DocumentStream<'_, S, M>
where
  S: CaseStore,
  M: CaseMapper,
{
  /// The next live document, or `None` once the survivor's documents are
  /// exhausted.
  pub async fn next(&mut self) -> Result<Option<LifeSituationDocument>> {
    loop {
      self.cancel.check()?;
      let row = self.cursor.next_row().await.map_err(Error::from_storage)?;
      self.cancel.check()?;

      let Some(row) = row else {
        return Ok(None);
      };
      if row.is_deleted {
        continue;
      }

      let cached = self
        .survivor
        .as_ref()
        .filter(|s| s.survivor_id == row.survivor_id)
        .cloned();
      let survivor = match cached {
        Some(survivor) => survivor,
        None => {
          let survivor =
            self.repository.resolve_survivor(row.survivor_id).await?;
          self.cancel.check()?;
          self.survivor = Some(survivor.clone());
          survivor
        }
      };

      return self.repository.mapper.document_from_row(row, survivor).map(Some);
    }
  }

  /// Drain the stream into a vector.
  pub async fn try_collect(mut self) -> Result<Vec<LifeSituationDocument>> {
    let mut documents = Vec::new();
    while let Some(document) = self.next().await? {
      documents.push(document);
    }
    Ok(documents)
  }
}
