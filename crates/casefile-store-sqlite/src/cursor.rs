//! Paged cursors behind the store's lazy sequences.
//!
//! A cursor fetches `page_size` rows at a time, keyed on SQLite's `rowid`, so
//! iteration order is insertion order and stays stable while new rows are
//! appended. Nothing is read until the first call to `next_row`.

use std::collections::VecDeque;

use casefile_core::store::{DocumentRow, RecordRow, RowCursor};

use crate::{
  Result,
  encode::{DOCUMENT_COLUMNS, RECORD_COLUMNS, RawDocument, RawRecord},
};

/// Fetch one page: rows matching `key` with `rowid > after`, at most `limit`.
type FetchPage<Raw> =
  fn(&rusqlite::Connection, &str, i64, i64) -> rusqlite::Result<Vec<(i64, Raw)>>;

pub struct PagedCursor<Raw> {
  conn:      tokio_rusqlite::Connection,
  key:       String,
  after:     i64,
  page_size: i64,
  buffer:    VecDeque<Raw>,
  exhausted: bool,
  fetch:     FetchPage<Raw>,
}

/// Documents of one survivor.
pub type DocumentCursor = PagedCursor<RawDocument>;

/// Records of one kind.
pub type RecordCursor = PagedCursor<RawRecord>;

impl<Raw: Send + 'static> PagedCursor<Raw> {
  fn new(
    conn: tokio_rusqlite::Connection,
    key: String,
    page_size: usize,
    fetch: FetchPage<Raw>,
  ) -> Self {
    Self {
      conn,
      key,
      after: 0,
      page_size: i64::try_from(page_size.max(1)).unwrap_or(i64::MAX),
      buffer: VecDeque::new(),
      exhausted: false,
      fetch,
    }
  }

  async fn next_raw(&mut self) -> Result<Option<Raw>> {
    if self.buffer.is_empty() && !self.exhausted {
      let key = self.key.clone();
      let after = self.after;
      let limit = self.page_size;
      let fetch = self.fetch;

      let page = self
        .conn
        .call(move |conn| Ok(fetch(conn, &key, after, limit)?))
        .await?;

      if (page.len() as i64) < limit {
        self.exhausted = true;
      }
      if let Some((rowid, _)) = page.last() {
        self.after = *rowid;
      }
      self.buffer.extend(page.into_iter().map(|(_, raw)| raw));
    }
    Ok(self.buffer.pop_front())
  }
}

impl DocumentCursor {
  pub(crate) fn by_survivor(
    conn: tokio_rusqlite::Connection,
    survivor_id: String,
    page_size: usize,
  ) -> Self {
    Self::new(conn, survivor_id, page_size, fetch_documents_by_survivor)
  }
}

impl RecordCursor {
  pub(crate) fn by_kind(
    conn: tokio_rusqlite::Connection,
    kind: String,
    page_size: usize,
  ) -> Self {
    Self::new(conn, kind, page_size, fetch_records_by_kind)
  }
}

impl RowCursor for DocumentCursor {
  type Row = DocumentRow;
  type Error = crate::Error;

  async fn next_row(&mut self) -> Result<Option<DocumentRow>> {
    self.next_raw().await?.map(RawDocument::into_row).transpose()
  }
}

impl RowCursor for RecordCursor {
  type Row = RecordRow;
  type Error = crate::Error;

  async fn next_row(&mut self) -> Result<Option<RecordRow>> {
    self.next_raw().await?.map(RawRecord::into_row).transpose()
  }
}

fn fetch_documents_by_survivor(
  conn: &rusqlite::Connection,
  survivor_id: &str,
  after: i64,
  limit: i64,
) -> rusqlite::Result<Vec<(i64, RawDocument)>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT rowid, {DOCUMENT_COLUMNS}
     FROM documents
     WHERE survivor_id = ?1 AND rowid > ?2
     ORDER BY rowid
     LIMIT ?3"
  ))?;
  stmt
    .query_map(rusqlite::params![survivor_id, after, limit], |row| {
      Ok((row.get(0)?, RawDocument::read(row, 1)?))
    })?
    .collect()
}

fn fetch_records_by_kind(
  conn: &rusqlite::Connection,
  kind: &str,
  after: i64,
  limit: i64,
) -> rusqlite::Result<Vec<(i64, RawRecord)>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT rowid, {RECORD_COLUMNS}
     FROM records
     WHERE kind = ?1 AND rowid > ?2
     ORDER BY rowid
     LIMIT ?3"
  ))?;
  stmt
    .query_map(rusqlite::params![kind, after, limit], |row| {
      Ok((row.get(0)?, RawRecord::read(row, 1)?))
    })?
    .collect()
}
