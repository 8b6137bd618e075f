//! [`SqliteStore`] — the SQLite implementation of the casefile storage traits.

use std::path::Path;

use rusqlite::OptionalExtension as _;
use serde::Deserialize;
use uuid::Uuid;

use casefile_core::{
  record::RecordKind,
  store::{
    Backend, DocumentRow, DocumentStore, RecordRow, RecordStore, SurvivorStore,
  },
  survivor::{NewSurvivor, Survivor},
};

use crate::{
  Error, Result,
  cursor::{DocumentCursor, RecordCursor},
  encode::{
    DOCUMENT_COLUMNS, RECORD_COLUMNS, RawDocument, RawRecord, RawSurvivor,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Tuning knobs for a [`SqliteStore`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
  /// Rows fetched per round-trip by lazy cursors.
  pub page_size: usize,
}

impl Default for StoreOptions {
  fn default() -> Self { Self { page_size: 256 } }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A casefile store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted, and its
/// background thread serialises every statement.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: StoreOptions,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  pub async fn open_with(
    path: impl AsRef<Path>,
    options: StoreOptions,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  pub async fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!(page_size = self.options.page_size, "store schema ready");
    Ok(())
  }
}

impl Backend for SqliteStore {
  type Error = Error;
}

// ─── Survivors ───────────────────────────────────────────────────────────────

impl SurvivorStore for SqliteStore {
  async fn add_survivor(&self, input: NewSurvivor) -> Result<Survivor> {
    let id_str = encode_uuid(input.survivor_id);
    let name = input.name.clone();

    let number: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO survivors (survivor_id, number, name)
           VALUES (?1, (SELECT COALESCE(MAX(number), 0) + 1 FROM survivors), ?2)
           RETURNING number",
          rusqlite::params![id_str, name],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(Survivor { survivor_id: input.survivor_id, number, name: input.name })
  }

  async fn get_survivor(&self, id: Uuid) -> Result<Option<Survivor>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSurvivor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT survivor_id, number, name FROM survivors WHERE survivor_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSurvivor {
                  survivor_id: row.get(0)?,
                  number:      row.get(1)?,
                  name:        row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSurvivor::into_survivor).transpose()
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type DocumentCursor = DocumentCursor;

  async fn insert_document(&self, row: DocumentRow) -> Result<()> {
    let raw = RawDocument::from_row(&row);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO documents ({DOCUMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
          ),
          rusqlite::params![
            raw.document_id,
            raw.survivor_id,
            raw.kind,
            raw.created_at,
            raw.last_edit_at,
            raw.is_deleted,
            raw.working_experience,
            raw.forwarded_by_organization,
            raw.forwarded_by_organization_name,
            raw.forwarded_by_person,
            raw.forwarded_by_person_name,
            raw.forwarded_by_survivor,
            raw.forwarded_by_survivor_name,
            raw.is_self_inquiry,
            raw.self_inquiry_channels,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_document(&self, id: Uuid) -> Result<Option<DocumentRow>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| RawDocument::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_row).transpose()
  }

  fn documents_by_survivor(&self, survivor_id: Uuid) -> DocumentCursor {
    DocumentCursor::by_survivor(
      self.conn.clone(),
      encode_uuid(survivor_id),
      self.options.page_size,
    )
  }

  async fn update_document<F>(&self, id: Uuid, mutate: F) -> Result<DocumentRow>
  where
    F: FnOnce(&mut DocumentRow) + Send + 'static,
  {
    let id_str = encode_uuid(id);

    // Read, mutate and write back inside one transaction so the row cannot
    // change between the read and the write.
    let updated: Option<DocumentRow> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            &format!(
              "SELECT {DOCUMENT_COLUMNS} FROM documents
               WHERE document_id = ?1 AND is_deleted = 0"
            ),
            rusqlite::params![id_str],
            |row| RawDocument::read(row, 0),
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };

        let mut row = raw
          .into_row()
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        mutate(&mut row);
        let raw = RawDocument::from_row(&row);

        tx.execute(
          "UPDATE documents SET
             survivor_id = ?2, kind = ?3, created_at = ?4, last_edit_at = ?5,
             is_deleted = ?6, working_experience = ?7,
             forwarded_by_organization = ?8, forwarded_by_organization_name = ?9,
             forwarded_by_person = ?10, forwarded_by_person_name = ?11,
             forwarded_by_survivor = ?12, forwarded_by_survivor_name = ?13,
             is_self_inquiry = ?14, self_inquiry_channels = ?15
           WHERE document_id = ?1",
          rusqlite::params![
            id_str,
            raw.survivor_id,
            raw.kind,
            raw.created_at,
            raw.last_edit_at,
            raw.is_deleted,
            raw.working_experience,
            raw.forwarded_by_organization,
            raw.forwarded_by_organization_name,
            raw.forwarded_by_person,
            raw.forwarded_by_person_name,
            raw.forwarded_by_survivor,
            raw.forwarded_by_survivor_name,
            raw.is_self_inquiry,
            raw.self_inquiry_channels,
          ],
        )?;
        tx.commit()?;

        Ok(Some(row))
      })
      .await?;

    updated.ok_or(Error::DocumentNotFound(id))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type RecordCursor = RecordCursor;

  async fn insert_record(&self, row: RecordRow) -> Result<()> {
    let raw = RawRecord::from_row(&row);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO records ({RECORD_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
          rusqlite::params![raw.record_id, raw.document_id, raw.kind, raw.content_json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn records_by_kind(&self, kind: RecordKind) -> RecordCursor {
    RecordCursor::by_kind(
      self.conn.clone(),
      kind.discriminant().to_owned(),
      self.options.page_size,
    )
  }

  async fn records_by_document(&self, document_id: Uuid) -> Result<Vec<RecordRow>> {
    let id_str = encode_uuid(document_id);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM records WHERE document_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| RawRecord::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_row).collect()
  }
}
