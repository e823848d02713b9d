//! Dynamic SAML federation metadata resolution cache — fetch-on-demand entity
//! metadata with criteria-indexed lookup, negative caching, and durable
//! write-through persistence.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod criteria;
pub mod filter;
pub mod index;
pub mod metadata;
pub mod persist;
pub mod resolver;

mod error;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use chrono::{DateTime, Utc};
	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}

pub use crate::{
	criteria::{ArtifactSourceId, CriteriaSet, Criterion},
	error::{Error, Result},
	filter::{FilterChain, FilterContext, FilterError, MetadataFilter, PredicateFilter},
	metadata::{Endpoint, EntityDescriptor, EntityRecord, RoleDescriptor, RoleType},
	resolver::{
		MetadataResolver,
		chaining::{ChainingMetadataResolver, ChainingResolverBuilder},
		dynamic::{
			DynamicMetadataResolver, DynamicResolverBuilder, DynamicResolverConfig, ResolverStatus,
		},
		fetcher::{FetchOutcome, FetchedMetadata, LocalSourceFetcher, OriginFetcher},
		statics::StaticMetadataResolver,
	},
};
