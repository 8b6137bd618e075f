//! Life-situation documents — the case files owned by a survivor.
//!
//! Documents share one table and one envelope (ids, timestamps, soft-delete
//! flag); the variant-specific part lives in [`DocumentBody`]. Only the
//! inquiry variant exists today.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  inquiry::{InquiryFields, InquirySource},
  survivor::Survivor,
};

/// The discriminator stored in the `kind` column of the documents table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
  Inquiry,
}

impl DocumentKind {
  pub fn discriminant(self) -> &'static str { self.into() }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownDiscriminator {
      entity: "document",
      value:  s.to_owned(),
    })
  }
}

/// Fields specific to an inquiry document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryDocument {
  pub working_experience: Option<String>,
  #[serde(flatten)]
  pub sources:            InquiryFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentBody {
  Inquiry(InquiryDocument),
}

impl DocumentBody {
  pub fn kind(&self) -> DocumentKind {
    match self {
      Self::Inquiry(_) => DocumentKind::Inquiry,
    }
  }

  pub fn as_inquiry(&self) -> Option<&InquiryDocument> {
    match self {
      Self::Inquiry(inquiry) => Some(inquiry),
    }
  }
}

/// A materialised document with its survivor resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeSituationDocument {
  pub document_id:  Uuid,
  pub survivor:     Survivor,
  pub created_at:   DateTime<Utc>,
  pub last_edit_at: DateTime<Utc>,
  pub is_deleted:   bool,
  pub body:         DocumentBody,
}

impl LifeSituationDocument {
  pub fn kind(&self) -> DocumentKind { self.body.kind() }
}

// ─── NewInquiry ──────────────────────────────────────────────────────────────

/// Input to [`crate::repository::Repository::create_inquiry`]. Timestamps and
/// the initial soft-delete flag are supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewInquiry {
  pub document_id:        Uuid,
  pub is_deleted:         bool,
  pub created_at:         DateTime<Utc>,
  pub last_edit_at:       DateTime<Utc>,
  pub survivor_id:        Uuid,
  pub working_experience: Option<String>,
  pub sources:            Vec<InquirySource>,
}

impl NewInquiry {
  /// A live inquiry created now with a fresh id and no sources.
  pub fn new(survivor_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      document_id: Uuid::new_v4(),
      is_deleted: false,
      created_at: now,
      last_edit_at: now,
      survivor_id,
      working_experience: None,
      sources: Vec::new(),
    }
  }

  pub fn with_source(mut self, source: InquirySource) -> Self {
    self.sources.push(source);
    self
  }
}
