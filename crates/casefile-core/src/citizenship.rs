//! Citizenship autocomplete hints.
//!
//! The vocabulary is global: every citizenship record counts, whatever the
//! lifecycle state of the document it hangs off.

use std::collections::{BTreeSet, btree_set};

use crate::{
  Error, Result,
  cancel::CancellationToken,
  record::RecordKind,
  store::{RecordStore, RowCursor},
};

/// Name of the content field holding the label.
pub const CITIZENSHIP_FIELD: &str = "Citizenship";

/// Distinct citizenship labels in ascending order.
#[derive(Debug)]
pub struct Completions {
  labels: btree_set::IntoIter<String>,
}

impl Iterator for Completions {
  type Item = String;

  fn next(&mut self) -> Option<String> { self.labels.next() }

  fn size_hint(&self) -> (usize, Option<usize>) { self.labels.size_hint() }
}

impl ExactSizeIterator for Completions {}

impl DoubleEndedIterator for Completions {
  fn next_back(&mut self) -> Option<String> { self.labels.next_back() }
}

/// Scan every citizenship record and collect its distinct labels.
///
/// Records whose content has no string `Citizenship` field are skipped.
pub async fn collect<S>(store: &S, cancel: &CancellationToken) -> Result<Completions>
where
  S: RecordStore,
{
  cancel.check()?;

  let mut labels = BTreeSet::new();
  let mut cursor = store.records_by_kind(RecordKind::Citizenship);
  while let Some(row) = cursor.next_row().await.map_err(Error::from_storage)? {
    cancel.check()?;
    match row.content.get(CITIZENSHIP_FIELD).and_then(|v| v.as_str()) {
      Some(label) => {
        labels.insert(label.to_owned());
      }
      None => {
        tracing::warn!(record_id = %row.record_id, "citizenship record has no label");
      }
    }
  }

  cancel.check()?;
  Ok(Completions { labels: labels.into_iter() })
}
