//! Resolver abstractions and implementations.

pub mod chaining;
pub mod dynamic;
pub mod fetcher;
pub mod statics;

// crates.io
use async_trait::async_trait;
// self
use crate::{_prelude::*, criteria::CriteriaSet, metadata::EntityRecord};

/// Queryable source of resolved entity metadata.
///
/// Implementations may be fetch-on-demand caches, preloaded batches, or
/// compositions of either.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
	/// Stable identifier used in logs and filter contexts.
	fn id(&self) -> &str;

	/// Resolve every currently-available record matching `criteria`.
	///
	/// The returned snapshot is finite and yields each match once. Transient
	/// fetch, filter, and persistence failures degrade to an empty result;
	/// only caller-caused conditions (such as an empty criteria set) surface
	/// as errors.
	async fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<Arc<EntityRecord>>>;

	/// First record matching `criteria`, if any.
	async fn resolve_single(&self, criteria: &CriteriaSet) -> Result<Option<Arc<EntityRecord>>> {
		Ok(self.resolve(criteria).await?.into_iter().next())
	}

	/// Drop all locally-held state. Durable storage is untouched.
	async fn clear(&self);

	/// Drop state held for a single entity identifier, including any negative
	/// cache entry keyed on it.
	async fn clear_entity(&self, entity_id: &str);
}
