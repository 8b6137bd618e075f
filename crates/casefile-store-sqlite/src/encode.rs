//! Encoding and decoding helpers between domain rows and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Record content is compact JSON.

use casefile_core::{
  document::DocumentKind,
  record::RecordKind,
  store::{DocumentRow, RecordRow},
  survivor::Survivor,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Column list shared by every documents query, in [`RawDocument`] order.
pub const DOCUMENT_COLUMNS: &str = "
  document_id, survivor_id, kind, created_at, last_edit_at, is_deleted,
  working_experience,
  forwarded_by_organization, forwarded_by_organization_name,
  forwarded_by_person, forwarded_by_person_name,
  forwarded_by_survivor, forwarded_by_survivor_name,
  is_self_inquiry, self_inquiry_channels";

/// Raw values read directly from a `documents` row.
pub struct RawDocument {
  pub document_id:                    String,
  pub survivor_id:                    String,
  pub kind:                           String,
  pub created_at:                     String,
  pub last_edit_at:                   String,
  pub is_deleted:                     bool,
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

impl RawDocument {
  /// Read [`DOCUMENT_COLUMNS`] starting at column `offset`.
  pub fn read(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:                    row.get(offset)?,
      survivor_id:                    row.get(offset + 1)?,
      kind:                           row.get(offset + 2)?,
      created_at:                     row.get(offset + 3)?,
      last_edit_at:                   row.get(offset + 4)?,
      is_deleted:                     row.get(offset + 5)?,
      working_experience:             row.get(offset + 6)?,
      forwarded_by_organization:      row.get(offset + 7)?,
      forwarded_by_organization_name: row.get(offset + 8)?,
      forwarded_by_person:            row.get(offset + 9)?,
      forwarded_by_person_name:       row.get(offset + 10)?,
      forwarded_by_survivor:          row.get(offset + 11)?,
      forwarded_by_survivor_name:     row.get(offset + 12)?,
      is_self_inquiry:                row.get(offset + 13)?,
      self_inquiry_channels:          row.get(offset + 14)?,
    })
  }

  pub fn into_row(self) -> Result<DocumentRow> {
    Ok(DocumentRow {
      document_id:                    decode_uuid(&self.document_id)?,
      survivor_id:                    decode_uuid(&self.survivor_id)?,
      kind:                           DocumentKind::from_discriminant(&self.kind)?,
      created_at:                     decode_dt(&self.created_at)?,
      last_edit_at:                   decode_dt(&self.last_edit_at)?,
      is_deleted:                     self.is_deleted,
      working_experience:             self.working_experience,
      forwarded_by_organization:      self.forwarded_by_organization,
      forwarded_by_organization_name: self.forwarded_by_organization_name,
      forwarded_by_person:            self.forwarded_by_person,
      forwarded_by_person_name:       self.forwarded_by_person_name,
      forwarded_by_survivor:          self.forwarded_by_survivor,
      forwarded_by_survivor_name:     self.forwarded_by_survivor_name,
      is_self_inquiry:                self.is_self_inquiry,
      self_inquiry_channels:          self.self_inquiry_channels,
    })
  }

  /// The inverse of [`RawDocument::into_row`]; infallible.
  pub fn from_row(row: &DocumentRow) -> Self {
    Self {
      document_id:                    encode_uuid(row.document_id),
      survivor_id:                    encode_uuid(row.survivor_id),
      kind:                           row.kind.discriminant().to_owned(),
      created_at:                     encode_dt(row.created_at),
      last_edit_at:                   encode_dt(row.last_edit_at),
      is_deleted:                     row.is_deleted,
      working_experience:             row.working_experience.clone(),
      forwarded_by_organization:      row.forwarded_by_organization,
      forwarded_by_organization_name: row.forwarded_by_organization_name.clone(),
      forwarded_by_person:            row.forwarded_by_person,
      forwarded_by_person_name:       row.forwarded_by_person_name.clone(),
      forwarded_by_survivor:          row.forwarded_by_survivor,
      forwarded_by_survivor_name:     row.forwarded_by_survivor_name.clone(),
      is_self_inquiry:                row.is_self_inquiry,
      self_inquiry_channels:          row.self_inquiry_channels,
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Column list shared by every records query, in [`RawRecord`] order.
pub const RECORD_COLUMNS: &str = "record_id, document_id, kind, content_json";

/// Raw values read directly from a `records` row.
pub struct RawRecord {
  pub record_id:    String,
  pub document_id:  String,
  pub kind:         String,
  pub content_json: String,
}

impl RawRecord {
  /// Read [`RECORD_COLUMNS`] starting at column `offset`.
  pub fn read(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:    row.get(offset)?,
      document_id:  row.get(offset + 1)?,
      kind:         row.get(offset + 2)?,
      content_json: row.get(offset + 3)?,
    })
  }

  pub fn into_row(self) -> Result<RecordRow> {
    Ok(RecordRow {
      record_id:   decode_uuid(&self.record_id)?,
      document_id: decode_uuid(&self.document_id)?,
      kind:        RecordKind::from_discriminant(&self.kind)?,
      content:     serde_json::from_str(&self.content_json)?,
    })
  }

  pub fn from_row(row: &RecordRow) -> Self {
    Self {
      record_id:    encode_uuid(row.record_id),
      document_id:  encode_uuid(row.document_id),
      kind:         row.kind.discriminant().to_owned(),
      content_json: row.content.to_string(),
    }
  }
}

// ─── Survivors ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `survivors` row.
pub struct RawSurvivor {
  pub survivor_id: String,
  pub number:      i64,
  pub name:        String,
}

impl RawSurvivor {
  pub fn into_survivor(self) -> Result<Survivor> {
    Ok(Survivor {
      survivor_id: decode_uuid(&self.survivor_id)?,
      number:      self.number,
      name:        self.name,
    })
  }
}
