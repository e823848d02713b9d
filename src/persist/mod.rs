//! Durable mirroring of resolved records and cache key generation.

pub mod filesystem;
pub mod memory;

// crates.io
use async_trait::async_trait;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, metadata::EntityDescriptor};

pub use filesystem::FilesystemCache;
pub use memory::MemoryCache;

/// Lowercase-hex SHA-256 digest.
pub(crate) fn sha256_hex(input: &[u8]) -> String {
	Sha256::digest(input).iter().map(|byte| format!("{byte:02x}")).collect()
}

/// External durable key/value store mirroring resolved entity metadata.
///
/// Keys are opaque strings chosen by the resolver's [`CacheKeyGenerator`].
/// Failures here must never take down a live query; the resolver logs and
/// degrades.
#[async_trait]
pub trait PersistentCache: Send + Sync {
	/// Load the descriptor stored under `key`, if any.
	async fn load(&self, key: &str) -> Result<Option<EntityDescriptor>>;

	/// Store `descriptor` under `key`, replacing any prior value.
	async fn save(&self, key: &str, descriptor: &EntityDescriptor) -> Result<()>;

	/// Remove the value stored under `key`; absent keys are not an error.
	async fn remove(&self, key: &str) -> Result<()>;

	/// Enumerate every stored key.
	async fn list_keys(&self) -> Result<Vec<String>>;
}

/// Derives the durable-store key for a resolved descriptor.
pub trait CacheKeyGenerator: Send + Sync {
	/// Produce the key `descriptor` should be stored under.
	fn generate(&self, descriptor: &EntityDescriptor) -> String;
}

/// Default generator: lowercase-hex SHA-256 digest of the entity identifier.
///
/// Digesting keeps arbitrary identifier URIs safe for stores whose keys double
/// as file names.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCacheKeyGenerator;
impl CacheKeyGenerator for DefaultCacheKeyGenerator {
	fn generate(&self, descriptor: &EntityDescriptor) -> String {
		sha256_hex(descriptor.entity_id.as_bytes())
	}
}
