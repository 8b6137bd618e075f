//! Survivor, the identity anchor that documents hang off.
//!
//! Survivor profiles are managed elsewhere; this crate only needs enough to
//! check existence and to attach the reference to materialised documents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person tracked by the organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survivor {
  pub survivor_id: Uuid,
  /// Store-assigned sequence number, unique and increasing.
  pub number:      i64,
  pub name:        String,
}

/// Input to [`crate::store::SurvivorStore::add_survivor`]. The sequence
/// number is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSurvivor {
  pub survivor_id: Uuid,
  pub name:        String,
}

impl NewSurvivor {
  /// A survivor with a freshly generated id.
  pub fn new(name: impl Into<String>) -> Self {
    Self { survivor_id: Uuid::new_v4(), name: name.into() }
  }
}
