//! Chaining resolver composition behaviour.

// std
use std::sync::Arc;
// crates.io
use async_trait::async_trait;
use saml_metadata_cache::{
	ChainingMetadataResolver, CriteriaSet, DynamicMetadataResolver, EntityDescriptor,
	EntityRecord, Error, LocalSourceFetcher, MetadataResolver, PredicateFilter, Result,
	StaticMetadataResolver,
};
// self
use crate::common::{self, ID_A, ID_B};

#[derive(Debug)]
struct FailingResolver;
#[async_trait]
impl MetadataResolver for FailingResolver {
	fn id(&self) -> &str {
		"failing"
	}

	async fn resolve(&self, _criteria: &CriteriaSet) -> Result<Vec<Arc<EntityRecord>>> {
		Err(Error::Fetch("origin unreachable".into()))
	}

	async fn clear(&self) {}

	async fn clear_entity(&self, _entity_id: &str) {}
}

#[tokio::test]
async fn first_non_empty_member_wins() {
	common::init_tracing();

	let first = Arc::new(StaticMetadataResolver::new(
		"static-1",
		vec![EntityDescriptor::new(ID_B)],
	));
	let fetcher = Arc::new(LocalSourceFetcher::new());

	fetcher.insert(EntityDescriptor::new(ID_A)).await;

	let second = Arc::new(
		DynamicMetadataResolver::builder("dynamic-1", fetcher)
			.config(common::test_config())
			.build()
			.expect("resolver"),
	);
	let chain = ChainingMetadataResolver::builder("chain-1")
		.member(first)
		.member(second)
		.build()
		.expect("chain");

	// Only the second member can produce A.
	let record = chain
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");

	assert_eq!(record.entity_id(), ID_A);

	// The first member short-circuits for B.
	let record = chain
		.resolve_single(&CriteriaSet::entity(ID_B))
		.await
		.expect("resolve")
		.expect("record");

	assert_eq!(record.entity_id(), ID_B);

	// Nobody holds this one; empty, not an error.
	assert!(
		chain
			.resolve_single(&CriteriaSet::entity("urn:test:entity:unknown"))
			.await
			.expect("resolve")
			.is_none()
	);
}

#[tokio::test]
async fn member_failures_are_tolerated() {
	common::init_tracing();

	let fallback = Arc::new(StaticMetadataResolver::new(
		"static-1",
		vec![EntityDescriptor::new(ID_A)],
	));
	let chain = ChainingMetadataResolver::builder("chain-1")
		.member(Arc::new(FailingResolver))
		.member(fallback)
		.build()
		.expect("chain");
	let record = chain
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");

	assert_eq!(record.entity_id(), ID_A);
}

#[tokio::test]
async fn attaching_a_filter_is_a_configuration_error() {
	let err = ChainingMetadataResolver::builder("chain-1")
		.filter(Arc::new(PredicateFilter::new(|_| true)))
		.build()
		.unwrap_err();

	assert!(matches!(err, Error::Configuration { field: "filter", .. }));
}

#[tokio::test]
async fn clear_is_delegated_to_every_member() {
	common::init_tracing();

	let fetcher = Arc::new(LocalSourceFetcher::new());

	fetcher.insert(EntityDescriptor::new(ID_A)).await;

	let dynamic = Arc::new(
		DynamicMetadataResolver::builder("dynamic-1", fetcher.clone())
			.config(common::test_config())
			.build()
			.expect("resolver"),
	);
	let preloaded =
		Arc::new(StaticMetadataResolver::new("static-1", vec![EntityDescriptor::new(ID_B)]));
	let chain = ChainingMetadataResolver::builder("chain-1")
		.member(preloaded.clone())
		.member(dynamic.clone())
		.build()
		.expect("chain");

	chain
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");
	chain.clear().await;

	assert!(preloaded.is_empty().await);
	assert_eq!(dynamic.status().await.active_entities, 0);

	// A resolves again through a fresh fetch.
	chain
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");

	assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn clear_entity_is_delegated_to_every_member() {
	common::init_tracing();

	let fetcher = Arc::new(LocalSourceFetcher::new());

	fetcher.insert(EntityDescriptor::new(ID_A)).await;
	fetcher.insert(EntityDescriptor::new(ID_B)).await;

	let dynamic = Arc::new(
		DynamicMetadataResolver::builder("dynamic-1", fetcher.clone())
			.config(common::test_config())
			.build()
			.expect("resolver"),
	);
	let chain = ChainingMetadataResolver::builder("chain-1")
		.member(dynamic.clone())
		.build()
		.expect("chain");

	chain
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");
	chain
		.resolve_single(&CriteriaSet::entity(ID_B))
		.await
		.expect("resolve")
		.expect("record");
	chain.clear_entity(ID_A).await;

	assert_eq!(dynamic.status().await.active_entities, 1);
}
