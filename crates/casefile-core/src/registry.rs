//! The record type registry: which concrete record types may be stored, and
//! how.
//!
//! Lookup is by the concrete Rust type behind a `&dyn BaseRecord`. A type
//! that implements [`BaseRecord`] but was never registered is rejected with
//! [`Error::UnsupportedRecordKind`].

use std::{any::TypeId, collections::HashMap, fmt};

use serde::Serialize;

use crate::{
  Error, Result,
  record::{
    BaseRecord, ChildrenRecord, CitizenshipRecord, DomicileRecord,
    EducationLevelRecord, RecordKind, SpecialityRecord,
  },
};

type EncodeFn = fn(&dyn BaseRecord) -> Result<serde_json::Value>;

/// How one registered record type is stored.
#[derive(Clone, Copy)]
pub struct RecordShape {
  kind:   RecordKind,
  encode: EncodeFn,
}

impl RecordShape {
  pub fn kind(&self) -> RecordKind { self.kind }

  /// The value written to the `kind` column.
  pub fn discriminant(&self) -> &'static str { self.kind.discriminant() }

  /// Serialise the record's payload into its stored JSON content.
  pub fn encode(&self, record: &dyn BaseRecord) -> Result<serde_json::Value> {
    (self.encode)(record)
  }
}

impl fmt::Debug for RecordShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecordShape").field("kind", &self.kind).finish()
  }
}

fn encode_as<R>(record: &dyn BaseRecord) -> Result<serde_json::Value>
where
  R: BaseRecord + Serialize,
{
  let concrete = record
    .as_any()
    .downcast_ref::<R>()
    .ok_or(Error::UnsupportedRecordKind(record.type_name()))?;
  Ok(serde_json::to_value(concrete)?)
}

/// Maps concrete record types to their [`RecordShape`].
#[derive(Debug, Clone)]
pub struct RecordRegistry {
  shapes: HashMap<TypeId, RecordShape>,
}

impl RecordRegistry {
  /// A registry with no kinds; every lookup fails.
  pub fn empty() -> Self { Self { shapes: HashMap::new() } }

  /// The five record kinds this system stores.
  pub fn standard() -> Self {
    let mut registry = Self::empty();
    registry.register::<ChildrenRecord>(RecordKind::Children);
    registry.register::<CitizenshipRecord>(RecordKind::Citizenship);
    registry.register::<DomicileRecord>(RecordKind::Domicile);
    registry.register::<EducationLevelRecord>(RecordKind::EducationLevel);
    registry.register::<SpecialityRecord>(RecordKind::Speciality);
    registry
  }

  fn register<R>(&mut self, kind: RecordKind)
  where
    R: BaseRecord + Serialize,
  {
    self
      .shapes
      .insert(TypeId::of::<R>(), RecordShape { kind, encode: encode_as::<R> });
  }

  /// Resolve the storage shape for `record`.
  pub fn resolve(&self, record: &dyn BaseRecord) -> Result<&RecordShape> {
    self
      .shapes
      .get(&record.as_any().type_id())
      .ok_or(Error::UnsupportedRecordKind(record.type_name()))
  }
}

impl Default for RecordRegistry {
  fn default() -> Self { Self::standard() }
}
