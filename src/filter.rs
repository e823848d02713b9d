//! Metadata filters applied between fetch and commit.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use async_trait::async_trait;
// self
use crate::{_prelude::*, metadata::EntityDescriptor, resolver::fetcher::FetchedMetadata};

/// Error raised by a filter rejecting or failing to process a record.
#[derive(Debug, thiserror::Error)]
#[error("Metadata filter '{filter}' rejected the record: {reason}")]
pub struct FilterError {
	/// Name of the rejecting filter.
	pub filter: &'static str,
	/// Human-readable rejection reason.
	pub reason: String,
}
impl FilterError {
	/// Rejection raised by the named filter.
	pub fn new(filter: &'static str, reason: impl Into<String>) -> Self {
		Self { filter, reason: reason.into() }
	}
}

/// Context supplied to filters for a single resolution.
#[derive(Clone, Debug)]
pub struct FilterContext {
	/// Identifier of the resolver running the filter.
	pub resolver_id: String,
}
impl FilterContext {
	/// Context for the named resolver.
	pub fn new(resolver_id: impl Into<String>) -> Self {
		Self { resolver_id: resolver_id.into() }
	}
}

/// Validates or transforms freshly fetched metadata before it is trusted.
///
/// Signature verification lives behind this boundary; the cache engine only
/// sees accept, rewrite, or reject.
#[async_trait]
pub trait MetadataFilter: Send + Sync {
	/// Filter name used in logs and rejections.
	fn name(&self) -> &'static str;

	/// Validate or rewrite the fetched record.
	async fn filter(
		&self,
		fetched: FetchedMetadata,
		context: &FilterContext,
	) -> std::result::Result<FetchedMetadata, FilterError>;
}

/// Ordered composite running each member filter in turn.
///
/// The first rejection aborts the chain.
#[derive(Default)]
pub struct FilterChain {
	filters: Vec<Arc<dyn MetadataFilter>>,
}
impl FilterChain {
	/// Empty chain; accepts everything.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a filter, builder style.
	pub fn with(mut self, filter: Arc<dyn MetadataFilter>) -> Self {
		self.filters.push(filter);

		self
	}

	/// Whether the chain holds no filters.
	pub fn is_empty(&self) -> bool {
		self.filters.is_empty()
	}
}
#[async_trait]
impl MetadataFilter for FilterChain {
	fn name(&self) -> &'static str {
		"chain"
	}

	async fn filter(
		&self,
		mut fetched: FetchedMetadata,
		context: &FilterContext,
	) -> std::result::Result<FetchedMetadata, FilterError> {
		for filter in &self.filters {
			fetched = filter.filter(fetched, context).await?;
		}

		Ok(fetched)
	}
}
impl Debug for FilterChain {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("FilterChain")
			.field("filters", &self.filters.iter().map(|filter| filter.name()).collect::<Vec<_>>())
			.finish()
	}
}

/// Accepts or rejects records via a predicate over the parsed descriptor.
pub struct PredicateFilter {
	predicate: Box<dyn Fn(&EntityDescriptor) -> bool + Send + Sync>,
}
impl PredicateFilter {
	/// Filter admitting only descriptors the predicate accepts.
	pub fn new<P>(predicate: P) -> Self
	where
		P: Fn(&EntityDescriptor) -> bool + Send + Sync + 'static,
	{
		Self { predicate: Box::new(predicate) }
	}
}
#[async_trait]
impl MetadataFilter for PredicateFilter {
	fn name(&self) -> &'static str {
		"predicate"
	}

	async fn filter(
		&self,
		fetched: FetchedMetadata,
		_context: &FilterContext,
	) -> std::result::Result<FetchedMetadata, FilterError> {
		if (self.predicate)(&fetched.descriptor) {
			Ok(fetched)
		} else {
			Err(FilterError::new(
				"predicate",
				format!("Entity '{}' rejected by predicate.", fetched.descriptor.entity_id),
			))
		}
	}
}
impl Debug for PredicateFilter {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("PredicateFilter").finish_non_exhaustive()
	}
}
