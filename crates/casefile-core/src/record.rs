//! Records: small structured facts attached to a document.
//!
//! The set of record kinds is closed. Each concrete type implements
//! [`BaseRecord`]; the [`Record`] union is what reads decode into. Payloads
//! are stored as JSON objects with PascalCase field names, so a citizenship
//! record's content always carries a `"Citizenship"` field.

use std::{any::Any, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The discriminator stored in the `kind` column of the records table.
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
pub enum RecordKind {
  Children,
  Citizenship,
  Domicile,
  EducationLevel,
  Speciality,
}

impl RecordKind {
  pub fn discriminant(self) -> &'static str { self.into() }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownDiscriminator {
      entity: "record",
      value:  s.to_owned(),
    })
  }
}

// ─── Capability trait ────────────────────────────────────────────────────────

/// What every attachable record offers: an id and access to its concrete
/// type. Implementing this trait does not make a type storable; only types
/// known to [`crate::registry::RecordRegistry`] are.
pub trait BaseRecord: Any + Send + Sync {
  fn record_id(&self) -> Uuid;

  fn as_any(&self) -> &dyn Any;

  /// Type name used in error messages.
  fn type_name(&self) -> &'static str { std::any::type_name::<Self>() }
}

// ─── Payload enums ───────────────────────────────────────────────────────────

/// Kind of place a domicile record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceKind {
  Residence,
  Registration,
  Temporary,
  Shelter,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
  None,
  Primary,
  Secondary,
  Vocational,
  Bachelor,
  Master,
  Doctorate,
}

// ─── Concrete records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChildrenRecord {
  pub id:             Uuid,
  pub has_children:   Option<bool>,
  pub children_count: Option<u32>,
  pub details:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CitizenshipRecord {
  pub id:          Uuid,
  pub citizenship: String,
}

impl CitizenshipRecord {
  pub fn new(citizenship: impl Into<String>) -> Self {
    Self { id: Uuid::new_v4(), citizenship: citizenship.into() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomicileRecord {
  pub id:         Uuid,
  pub details:    Option<String>,
  pub place_kind: PlaceKind,
  pub country:    Option<String>,
  pub settlement: Option<String>,
  pub date_from:  Option<NaiveDate>,
  pub date_to:    Option<NaiveDate>,
  pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EducationLevelRecord {
  pub id:              Uuid,
  pub education_level: EducationLevel,
  pub details:         Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecialityRecord {
  pub id:         Uuid,
  pub speciality: String,
  pub details:    Option<String>,
}

impl BaseRecord for ChildrenRecord {
  fn record_id(&self) -> Uuid { self.id }

  fn as_any(&self) -> &dyn Any { self }
}

impl BaseRecord for CitizenshipRecord {
  fn record_id(&self) -> Uuid { self.id }

  fn as_any(&self) -> &dyn Any { self }
}

impl BaseRecord for DomicileRecord {
  fn record_id(&self) -> Uuid { self.id }

  fn as_any(&self) -> &dyn Any { self }
}

impl BaseRecord for EducationLevelRecord {
  fn record_id(&self) -> Uuid { self.id }

  fn as_any(&self) -> &dyn Any { self }
}

impl BaseRecord for SpecialityRecord {
  fn record_id(&self) -> Uuid { self.id }

  fn as_any(&self) -> &dyn Any { self }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A decoded record of any registered kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Record {
  Children(ChildrenRecord),
  Citizenship(CitizenshipRecord),
  Domicile(DomicileRecord),
  EducationLevel(EducationLevelRecord),
  Speciality(SpecialityRecord),
}

impl Record {
  pub fn kind(&self) -> RecordKind {
    match self {
      Self::Children(_) => RecordKind::Children,
      Self::Citizenship(_) => RecordKind::Citizenship,
      Self::Domicile(_) => RecordKind::Domicile,
      Self::EducationLevel(_) => RecordKind::EducationLevel,
      Self::Speciality(_) => RecordKind::Speciality,
    }
  }

  /// The concrete record behind this variant, for handing to
  /// [`crate::repository::Repository::add_record`].
  pub fn as_base(&self) -> &dyn BaseRecord {
    match self {
      Self::Children(r) => r,
      Self::Citizenship(r) => r,
      Self::Domicile(r) => r,
      Self::EducationLevel(r) => r,
      Self::Speciality(r) => r,
    }
  }

  pub fn record_id(&self) -> Uuid { self.as_base().record_id() }

  /// Rebuild a record from its discriminator and stored JSON content.
  pub fn from_parts(kind: RecordKind, content: serde_json::Value) -> Result<Self> {
    Ok(match kind {
      RecordKind::Children => Self::Children(serde_json::from_value(content)?),
      RecordKind::Citizenship => {
        Self::Citizenship(serde_json::from_value(content)?)
      }
      RecordKind::Domicile => Self::Domicile(serde_json::from_value(content)?),
      RecordKind::EducationLevel => {
        Self::EducationLevel(serde_json::from_value(content)?)
      }
      RecordKind::Speciality => {
        Self::Speciality(serde_json::from_value(content)?)
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn discriminants_round_trip() {
    for kind in RecordKind::iter() {
      assert_eq!(RecordKind::from_discriminant(kind.discriminant()).unwrap(), kind);
    }
    assert_eq!(RecordKind::EducationLevel.discriminant(), "education_level");
  }

  #[test]
  fn unknown_discriminant_is_rejected() {
    let err = RecordKind::from_discriminant("pets").unwrap_err();
    assert!(matches!(err, Error::UnknownDiscriminator { entity: "record", .. }));
  }

  #[test]
  fn citizenship_content_uses_pascal_case() {
    let record = CitizenshipRecord::new("Ukraine");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["Citizenship"], "Ukraine");
    assert_eq!(json["Id"], record.id.to_string());
  }

  #[test]
  fn as_base_exposes_the_inner_id() {
    let inner = SpecialityRecord {
      id:         Uuid::new_v4(),
      speciality: "welder".into(),
      details:    None,
    };
    let record = Record::Speciality(inner.clone());
    assert_eq!(record.record_id(), inner.id);
    assert!(record.as_base().as_any().is::<SpecialityRecord>());
  }
}
