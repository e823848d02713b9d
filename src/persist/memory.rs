//! In-memory persistent cache, for tests and embedded deployments.

// std
use std::collections::HashMap;
// crates.io
use async_trait::async_trait;
use tokio::sync::RwLock;
// self
use crate::{_prelude::*, metadata::EntityDescriptor, persist::PersistentCache};

/// Map-backed [`PersistentCache`] with no real durability.
#[derive(Debug, Default)]
pub struct MemoryCache {
	entries: RwLock<HashMap<String, EntityDescriptor>>,
}
impl MemoryCache {
	/// Empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored entries.
	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	/// Whether no entries are stored.
	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}

	/// Whether `key` currently has a stored value.
	pub async fn contains(&self, key: &str) -> bool {
		self.entries.read().await.contains_key(key)
	}
}
#[async_trait]
impl PersistentCache for MemoryCache {
	async fn load(&self, key: &str) -> Result<Option<EntityDescriptor>> {
		Ok(self.entries.read().await.get(key).cloned())
	}

	async fn save(&self, key: &str, descriptor: &EntityDescriptor) -> Result<()> {
		self.entries.write().await.insert(key.to_string(), descriptor.clone());

		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		self.entries.write().await.remove(key);

		Ok(())
	}

	async fn list_keys(&self) -> Result<Vec<String>> {
		Ok(self.entries.read().await.keys().cloned().collect())
	}
}
