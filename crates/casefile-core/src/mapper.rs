//! Conversion between domain objects and stored row shapes.
//!
//! The repository takes a [`CaseMapper`] as a dependency. [`StandardMapper`]
//! matches exhaustively on every closed variant, so adding a document or
//! record variant fails to compile until it is mapped here.

use uuid::Uuid;

use crate::{
  Result,
  document::{DocumentBody, DocumentKind, InquiryDocument, LifeSituationDocument},
  inquiry::{ChannelMask, InquiryFields},
  record::{BaseRecord, Record},
  registry::RecordShape,
  store::{DocumentRow, RecordRow},
  survivor::Survivor,
};

pub trait CaseMapper: Send + Sync {
  fn document_to_row(&self, document: &LifeSituationDocument) -> DocumentRow;

  /// Materialise a row; `survivor` is the resolved owner of the row.
  fn document_from_row(
    &self,
    row: DocumentRow,
    survivor: Survivor,
  ) -> Result<LifeSituationDocument>;

  fn record_to_row(
    &self,
    document_id: Uuid,
    record: &dyn BaseRecord,
    shape: &RecordShape,
  ) -> Result<RecordRow>;

  fn record_from_row(&self, row: RecordRow) -> Result<Record>;
}

/// The mapping used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMapper;

impl CaseMapper for StandardMapper {
  fn document_to_row(&self, document: &LifeSituationDocument) -> DocumentRow {
    let mut row = DocumentRow {
      document_id:                    document.document_id,
      survivor_id:                    document.survivor.survivor_id,
      kind:                           document.kind(),
      created_at:                     document.created_at,
      last_edit_at:                   document.last_edit_at,
      is_deleted:                     document.is_deleted,
      working_experience:             None,
      forwarded_by_organization:      None,
      forwarded_by_organization_name: None,
      forwarded_by_person:            None,
      forwarded_by_person_name:       None,
      forwarded_by_survivor:          None,
      forwarded_by_survivor_name:     None,
      is_self_inquiry:                None,
      self_inquiry_channels:          None,
    };

    match &document.body {
      DocumentBody::Inquiry(inquiry) => {
        let sources = &inquiry.sources;
        row.working_experience = inquiry.working_experience.clone();
        row.forwarded_by_organization = Some(sources.forwarded_by_organization);
        row.forwarded_by_organization_name =
          sources.forwarded_by_organization_name.clone();
        row.forwarded_by_person = Some(sources.forwarded_by_person);
        row.forwarded_by_person_name = sources.forwarded_by_person_name.clone();
        row.forwarded_by_survivor = Some(sources.forwarded_by_survivor);
        row.forwarded_by_survivor_name =
          sources.forwarded_by_survivor_name.clone();
        row.is_self_inquiry = Some(sources.is_self_inquiry);
        row.self_inquiry_channels = Some(sources.self_inquiry_channels.bits());
      }
    }

    row
  }

  fn document_from_row(
    &self,
    row: DocumentRow,
    survivor: Survivor,
  ) -> Result<LifeSituationDocument> {
    let body = match row.kind {
      DocumentKind::Inquiry => DocumentBody::Inquiry(InquiryDocument {
        working_experience: row.working_experience,
        sources:            InquiryFields {
          forwarded_by_organization:      row
            .forwarded_by_organization
            .unwrap_or(false),
          forwarded_by_organization_name: row.forwarded_by_organization_name,
          forwarded_by_person:            row.forwarded_by_person.unwrap_or(false),
          forwarded_by_person_name:       row.forwarded_by_person_name,
          forwarded_by_survivor:          row.forwarded_by_survivor.unwrap_or(false),
          forwarded_by_survivor_name:     row.forwarded_by_survivor_name,
          is_self_inquiry:                row.is_self_inquiry.unwrap_or(false),
          self_inquiry_channels:          ChannelMask::from_bits(
            row.self_inquiry_channels.unwrap_or(0),
          ),
        },
      }),
    };

    Ok(LifeSituationDocument {
      document_id: row.document_id,
      survivor,
      created_at: row.created_at,
      last_edit_at: row.last_edit_at,
      is_deleted: row.is_deleted,
      body,
    })
  }

  fn record_to_row(
    &self,
    document_id: Uuid,
    record: &dyn BaseRecord,
    shape: &RecordShape,
  ) -> Result<RecordRow> {
    Ok(RecordRow {
      record_id: record.record_id(),
      document_id,
      kind: shape.kind(),
      content: shape.encode(record)?,
    })
  }

  fn record_from_row(&self, row: RecordRow) -> Result<Record> {
    Record::from_parts(row.kind, row.content)
  }
}
