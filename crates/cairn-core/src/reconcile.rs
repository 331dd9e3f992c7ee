//! Collection reconciliation — merging the two persisted representations of
//! one logical collection into a single deduplicated, sorted sequence.
//!
//! The inline array on the parent document is the denormalized snapshot; the
//! subcollection is the target of direct mutation and is therefore
//! authoritative on an id conflict. An empty inline array yields the pure
//! subcollection result, and an empty subcollection yields the pure
//! inline-array result — the latter is the migration path that upgrades a
//! legacy inline-only document on its first mutation without data loss.

use std::collections::HashMap;

use crate::record::SubRecord;

/// Merge the inline-derived and subcollection-derived views of a collection.
///
/// The result contains exactly the union of ids, each once; for ids present
/// on both sides the subcollection version is emitted. Output is sorted by
/// the record type's comparator.
pub fn reconcile<T: SubRecord>(inline: Vec<T>, subrecords: Vec<T>) -> Vec<T> {
  let mut by_id: HashMap<String, T> =
    HashMap::with_capacity(inline.len() + subrecords.len());

  // Inline entries first so subcollection entries win ties.
  for record in inline {
    by_id.insert(record.record_id().to_owned(), record);
  }
  for record in subrecords {
    by_id.insert(record.record_id().to_owned(), record);
  }

  let mut merged: Vec<T> = by_id.into_values().collect();
  merged.sort_by(T::compare);
  merged
}
