//! Dual-view backing store for resolved entity records.

// std
use std::collections::HashMap;
// self
use crate::{_prelude::*, metadata::EntityRecord};

/// Authoritative in-memory snapshot of resolved records.
///
/// Maintains an arrival-ordered sequence and an entity-identifier mapping over
/// the same records. Every mutation updates both views; callers serialise
/// mutations behind the resolver's writer lock so no reader observes the views
/// disagreeing. The instance is long-lived — `clear` empties it in place.
#[derive(Debug, Default)]
pub struct BackingStore {
	ordered: Vec<Arc<EntityRecord>>,
	indexed: HashMap<String, Vec<Arc<EntityRecord>>>,
}
impl BackingStore {
	/// Empty backing store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert the record, replacing anything previously held for its entity
	/// identifier. Returns the displaced records so the caller can de-index
	/// them.
	pub fn commit(&mut self, record: Arc<EntityRecord>) -> Vec<Arc<EntityRecord>> {
		let displaced = self.remove(record.entity_id());

		self.ordered.push(record.clone());
		self.indexed.entry(record.entity_id().to_string()).or_default().push(record);

		displaced
	}

	/// Insert the record without replacing prior ones for the same identifier.
	///
	/// The model permits more than one simultaneously-valid record per
	/// identifier; duplicates are worth a warning since they usually indicate
	/// an origin misconfiguration.
	pub fn append(&mut self, record: Arc<EntityRecord>) {
		let bucket = self.indexed.entry(record.entity_id().to_string()).or_default();

		if !bucket.is_empty() {
			tracing::warn!(entity_id = record.entity_id(), "duplicate record for entity");
		}

		bucket.push(record.clone());
		self.ordered.push(record);
	}

	/// Records currently held for an entity identifier, as a detached copy.
	pub fn records_for(&self, entity_id: &str) -> Vec<Arc<EntityRecord>> {
		self.indexed.get(entity_id).cloned().unwrap_or_default()
	}

	/// Whether any record is held for the identifier.
	pub fn contains(&self, entity_id: &str) -> bool {
		self.indexed.contains_key(entity_id)
	}

	/// All records in arrival order.
	pub fn ordered(&self) -> &[Arc<EntityRecord>] {
		&self.ordered
	}

	/// Entity identifiers currently held.
	pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
		self.indexed.keys().map(String::as_str)
	}

	/// Remove every record held for the identifier, returning them.
	pub fn remove(&mut self, entity_id: &str) -> Vec<Arc<EntityRecord>> {
		let removed = self.indexed.remove(entity_id).unwrap_or_default();

		if !removed.is_empty() {
			self.ordered.retain(|record| record.entity_id() != entity_id);
		}

		removed
	}

	/// Empty both views in place.
	pub fn clear(&mut self) {
		self.ordered.clear();
		self.indexed.clear();
	}

	/// Number of records held.
	pub fn len(&self) -> usize {
		self.ordered.len()
	}

	/// Whether the store holds no records.
	pub fn is_empty(&self) -> bool {
		self.ordered.is_empty()
	}

	/// Number of distinct entity identifiers held.
	pub fn entity_count(&self) -> usize {
		self.indexed.len()
	}
}
