//! Preloaded resolver serving a fixed batch of descriptors.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use async_trait::async_trait;
use tokio::sync::RwLock;
// self
use crate::{
	_prelude::*,
	cache::BackingStore,
	criteria::CriteriaSet,
	index::{MetadataIndex, SecondaryIndexManager},
	metadata::{EntityDescriptor, EntityRecord},
	resolver::MetadataResolver,
};

struct StaticState {
	backing: BackingStore,
	indexes: SecondaryIndexManager,
}

/// Serves a batch of descriptors loaded at construction; never fetches.
///
/// Useful as a chaining member in front of a dynamic resolver, pinning
/// well-known entities while everything else resolves on demand.
pub struct StaticMetadataResolver {
	id: String,
	state: RwLock<StaticState>,
}
impl StaticMetadataResolver {
	/// Resolver preloaded with the given descriptors and no secondary indexes.
	pub fn new(id: impl Into<String>, descriptors: Vec<EntityDescriptor>) -> Self {
		Self::with_indexes(id, descriptors, Vec::new())
	}

	/// Resolver preloaded with the given descriptors and secondary indexes.
	pub fn with_indexes(
		id: impl Into<String>,
		descriptors: Vec<EntityDescriptor>,
		indexes: Vec<Arc<dyn MetadataIndex>>,
	) -> Self {
		let mut state =
			StaticState { backing: BackingStore::new(), indexes: SecondaryIndexManager::new(indexes) };

		for descriptor in descriptors {
			let record =
				Arc::new(EntityRecord::fetched(descriptor, None).into_committed(None));

			state.indexes.index_record(record.descriptor());
			state.backing.append(record);
		}

		Self { id: id.into(), state: RwLock::new(state) }
	}

	/// Number of records held.
	pub async fn len(&self) -> usize {
		self.state.read().await.backing.len()
	}

	/// Whether the resolver holds no records.
	pub async fn is_empty(&self) -> bool {
		self.state.read().await.backing.is_empty()
	}
}
#[async_trait]
impl MetadataResolver for StaticMetadataResolver {
	fn id(&self) -> &str {
		&self.id
	}

	async fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<Arc<EntityRecord>>> {
		if criteria.is_empty() {
			return Err(Error::Resolution("Criteria set was empty.".into()));
		}

		let state = self.state.read().await;
		let now = Utc::now();
		let collect = |entity_id: &str| -> Vec<Arc<EntityRecord>> {
			state
				.backing
				.records_for(entity_id)
				.into_iter()
				.filter(|record| record.descriptor().is_valid_at(now))
				.collect()
		};

		if let Some(entity_id) = criteria.entity_id() {
			return Ok(collect(entity_id));
		}

		let Some(entity_ids) = state.indexes.lookup(criteria) else {
			return Ok(Vec::new());
		};
		let mut entity_ids: Vec<String> = entity_ids.into_iter().collect();

		entity_ids.sort();

		let mut records = Vec::new();

		for entity_id in &entity_ids {
			records.extend(collect(entity_id));
		}

		Ok(records)
	}

	async fn clear(&self) {
		let mut state = self.state.write().await;

		state.backing.clear();
		state.indexes.clear();
	}

	async fn clear_entity(&self, entity_id: &str) {
		let mut state = self.state.write().await;
		let removed = state.backing.remove(entity_id);

		for record in &removed {
			state.indexes.deindex_record(record.descriptor());
		}
	}
}
impl Debug for StaticMetadataResolver {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("StaticMetadataResolver").field("id", &self.id).finish_non_exhaustive()
	}
}
