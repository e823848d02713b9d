//! Origin source fetch strategy.

// std
use std::{
	collections::HashMap,
	sync::atomic::{AtomicUsize, Ordering},
};
// crates.io
use async_trait::async_trait;
use tokio::sync::RwLock;
// self
use crate::{_prelude::*, criteria::CriteriaSet, metadata::EntityDescriptor};

/// Raw metadata produced by an origin fetch, before filtering and commit.
#[derive(Clone, Debug)]
pub struct FetchedMetadata {
	/// Parsed metadata document.
	pub descriptor: EntityDescriptor,
	/// Raw serialized form the transport produced, when available. Dropped at
	/// commit.
	pub source: Option<Vec<u8>>,
}

/// Outcome of an origin fetch attempt.
#[derive(Clone, Debug)]
pub enum FetchOutcome {
	/// The origin produced a record for the requested criteria.
	Found(FetchedMetadata),
	/// The origin authoritatively has no record for the criteria.
	NotFound,
}

/// Strategy performing the actual retrieval against the origin source.
///
/// Passed to the dynamic resolver as a value, keeping it transport-agnostic.
/// Implementations must tolerate concurrent calls; per-attempt timeouts are
/// their responsibility — the engine trusts them to return in bounded time.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
	/// Retrieve the record the criteria select, if the origin has one.
	async fn fetch(&self, criteria: &CriteriaSet) -> Result<FetchOutcome>;
}

/// Fetcher backed by a local map of descriptors, keyed by entity identifier.
///
/// Serves local-store deployments where the origin is co-resident, and stands
/// in for network transports in tests. Tag criteria resolve against descriptor
/// tags, which lets secondary-fetch configurations locate entities the caller
/// cannot name directly.
#[derive(Debug, Default)]
pub struct LocalSourceFetcher {
	entries: RwLock<HashMap<String, EntityDescriptor>>,
	fetch_count: AtomicUsize,
}
impl LocalSourceFetcher {
	/// Empty local source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace the descriptor stored under its entity identifier.
	pub async fn insert(&self, descriptor: EntityDescriptor) {
		self.entries.write().await.insert(descriptor.entity_id.clone(), descriptor);
	}

	/// Remove the descriptor stored for the identifier.
	pub async fn remove(&self, entity_id: &str) {
		self.entries.write().await.remove(entity_id);
	}

	/// Whether the source holds no descriptors.
	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}

	/// Number of fetch attempts observed, successful or not.
	pub fn fetch_count(&self) -> usize {
		self.fetch_count.load(Ordering::Relaxed)
	}
}
#[async_trait]
impl OriginFetcher for LocalSourceFetcher {
	async fn fetch(&self, criteria: &CriteriaSet) -> Result<FetchOutcome> {
		self.fetch_count.fetch_add(1, Ordering::Relaxed);

		let entries = self.entries.read().await;

		if let Some(entity_id) = criteria.entity_id() {
			return Ok(match entries.get(entity_id) {
				Some(descriptor) => found(descriptor)?,
				None => FetchOutcome::NotFound,
			});
		}

		for criterion in criteria.iter() {
			if let crate::criteria::Criterion::Tag(tag) = criterion
				&& let Some(descriptor) =
					entries.values().find(|descriptor| descriptor.tags.contains(tag))
			{
				return found(descriptor);
			}
		}

		Ok(FetchOutcome::NotFound)
	}
}

fn found(descriptor: &EntityDescriptor) -> Result<FetchOutcome> {
	let source = serde_json::to_vec(descriptor)?;

	Ok(FetchOutcome::Found(FetchedMetadata {
		descriptor: descriptor.clone(),
		source: Some(source),
	}))
}
