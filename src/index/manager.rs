//! Bucket management over the registered secondary indexes.

// std
use std::{
	collections::{HashMap, HashSet},
	fmt::{Debug, Formatter, Result as FmtResult},
};
// self
use crate::{
	_prelude::*,
	criteria::CriteriaSet,
	index::{IndexKey, MetadataIndex},
	metadata::EntityDescriptor,
};

/// Maintains key → entity-identifier buckets for every registered index and
/// answers criteria probes without a full scan.
///
/// Mutation happens under the owning resolver's writer lock, together with the
/// backing store, so index state never runs ahead of the records it points at.
#[derive(Default)]
pub struct SecondaryIndexManager {
	indexes: Vec<Arc<dyn MetadataIndex>>,
	buckets: HashMap<IndexKey, HashSet<String>>,
}
impl SecondaryIndexManager {
	/// Manager over the given indexes.
	pub fn new(indexes: Vec<Arc<dyn MetadataIndex>>) -> Self {
		Self { indexes, buckets: HashMap::new() }
	}

	/// Whether any index is registered.
	pub fn has_indexes(&self) -> bool {
		!self.indexes.is_empty()
	}

	/// File the descriptor's identifier under every key its indexes produce.
	pub fn index_record(&mut self, descriptor: &EntityDescriptor) {
		for index in &self.indexes {
			for key in index.record_keys(descriptor) {
				tracing::trace!(
					index = index.name(),
					key = key.value(),
					entity_id = %descriptor.entity_id,
					"indexing record"
				);

				self.buckets.entry(key).or_default().insert(descriptor.entity_id.clone());
			}
		}
	}

	/// Remove the descriptor's identifier from every key it was filed under.
	pub fn deindex_record(&mut self, descriptor: &EntityDescriptor) {
		for index in &self.indexes {
			for key in index.record_keys(descriptor) {
				if let Some(bucket) = self.buckets.get_mut(&key) {
					bucket.remove(&descriptor.entity_id);

					if bucket.is_empty() {
						self.buckets.remove(&key);
					}
				}
			}
		}
	}

	/// Resolve the entity identifiers the criteria select via indexes.
	///
	/// `None` means no registered index understood the criteria — the caller
	/// decides whether to fall back to a full scan or an origin fetch.
	/// `Some(empty)` means the criteria were understood but nothing matches.
	pub fn lookup(&self, criteria: &CriteriaSet) -> Option<HashSet<String>> {
		let mut matched = false;
		let mut result = HashSet::new();

		for index in &self.indexes {
			let Some(keys) = index.criteria_keys(criteria) else {
				continue;
			};

			if keys.is_empty() {
				continue;
			}

			matched = true;

			for key in keys {
				if let Some(bucket) = self.buckets.get(&key) {
					result.extend(bucket.iter().cloned());
				}
			}
		}

		matched.then_some(result)
	}

	/// Drop every bucket.
	pub fn clear(&mut self) {
		self.buckets.clear();
	}
}
impl Debug for SecondaryIndexManager {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("SecondaryIndexManager")
			.field("indexes", &self.indexes.iter().map(|i| i.name()).collect::<Vec<_>>())
			.field("buckets", &self.buckets.len())
			.finish()
	}
}
