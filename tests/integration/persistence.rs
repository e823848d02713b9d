//! Persistent cache integration: write-through, startup population, and key
//! migration.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use saml_metadata_cache::{
	CriteriaSet, DynamicMetadataResolver, EntityDescriptor, LocalSourceFetcher,
	MetadataResolver,
	persist::{
		CacheKeyGenerator, DefaultCacheKeyGenerator, FilesystemCache, MemoryCache,
		PersistentCache,
	},
};
// self
use crate::common::{self, ID_A, ID_B, ID_C};

#[tokio::test]
async fn successful_resolutions_write_through() {
	common::init_tracing();

	let fetcher = Arc::new(LocalSourceFetcher::new());

	fetcher.insert(EntityDescriptor::new(ID_A)).await;

	let cache = Arc::new(MemoryCache::new());
	let resolver = DynamicMetadataResolver::builder("dynamic-1", fetcher)
		.config(common::test_config())
		.persistent_cache(cache.clone())
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	assert!(resolver.is_persistent_caching_enabled());
	assert!(cache.is_empty().await);

	let record = resolver
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");
	let key = DefaultCacheKeyGenerator.generate(record.descriptor());

	assert_eq!(cache.len().await, 1);
	assert!(cache.contains(&key).await);
	assert_eq!(cache.load(&key).await.expect("load").expect("entry").entity_id, ID_A);
}

#[tokio::test]
async fn misses_are_never_persisted() {
	common::init_tracing();

	let cache = Arc::new(MemoryCache::new());
	let resolver = DynamicMetadataResolver::builder("dynamic-1", Arc::new(LocalSourceFetcher::new()))
		.config(common::test_config())
		.persistent_cache(cache.clone())
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	assert!(
		resolver.resolve_single(&CriteriaSet::entity(ID_A)).await.expect("resolve").is_none()
	);
	assert!(cache.is_empty().await);
}

#[tokio::test]
async fn startup_population_serves_without_origin_fetches() {
	common::init_tracing();

	let generator = DefaultCacheKeyGenerator;
	let cache = Arc::new(MemoryCache::new());

	for descriptor in
		[EntityDescriptor::new(ID_A), EntityDescriptor::new(ID_B), EntityDescriptor::new(ID_C)]
	{
		cache.save(&generator.generate(&descriptor), &descriptor).await.expect("save");
	}

	let fetcher = Arc::new(LocalSourceFetcher::new());
	let resolver = DynamicMetadataResolver::builder("dynamic-1", fetcher.clone())
		.config(common::test_config())
		.persistent_cache(cache)
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	assert_eq!(resolver.status().await.active_entities, 3);

	for entity_id in [ID_A, ID_B, ID_C] {
		let record = resolver
			.resolve_single(&CriteriaSet::entity(entity_id))
			.await
			.expect("resolve")
			.expect("record");

		assert_eq!(record.entity_id(), entity_id);
		assert!(record.source().is_none());
	}

	// The origin source was never consulted.
	assert!(fetcher.is_empty().await);
	assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn stale_keys_migrate_to_the_current_generator() {
	common::init_tracing();

	let generator = DefaultCacheKeyGenerator;
	let cache = Arc::new(MemoryCache::new());
	let a = EntityDescriptor::new(ID_A);
	let b = EntityDescriptor::new(ID_B);

	cache.save("one", &a).await.expect("save");
	cache.save("two", &b).await.expect("save");

	let resolver = DynamicMetadataResolver::builder("dynamic-1", Arc::new(LocalSourceFetcher::new()))
		.config(common::test_config())
		.persistent_cache(cache.clone())
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	// Old keys are gone, records live under freshly generated keys.
	assert!(!cache.contains("one").await);
	assert!(!cache.contains("two").await);
	assert!(cache.contains(&generator.generate(&a)).await);
	assert!(cache.contains(&generator.generate(&b)).await);
	assert_eq!(cache.len().await, 2);

	for entity_id in [ID_A, ID_B] {
		assert!(
			resolver
				.resolve_single(&CriteriaSet::entity(entity_id))
				.await
				.expect("resolve")
				.is_some()
		);
	}
}

#[tokio::test]
async fn startup_predicate_filters_admitted_entries() {
	common::init_tracing();

	let generator = DefaultCacheKeyGenerator;
	let cache = Arc::new(MemoryCache::new());

	for descriptor in
		[EntityDescriptor::new(ID_A), EntityDescriptor::new(ID_B), EntityDescriptor::new(ID_C)]
	{
		cache.save(&generator.generate(&descriptor), &descriptor).await.expect("save");
	}

	let resolver = DynamicMetadataResolver::builder("dynamic-1", Arc::new(LocalSourceFetcher::new()))
		.config(common::test_config())
		.persistent_cache(cache)
		.cache_predicate(|descriptor| descriptor.entity_id == ID_A)
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	assert_eq!(resolver.status().await.active_entities, 1);
	assert!(
		resolver.resolve_single(&CriteriaSet::entity(ID_A)).await.expect("resolve").is_some()
	);
	assert!(
		resolver.resolve_single(&CriteriaSet::entity(ID_B)).await.expect("resolve").is_none()
	);
	assert!(
		resolver.resolve_single(&CriteriaSet::entity(ID_C)).await.expect("resolve").is_none()
	);
}

#[tokio::test]
async fn filesystem_cache_survives_a_resolver_restart() {
	common::init_tracing();

	let dir = tempfile::tempdir().expect("tempdir");
	let fetcher = Arc::new(LocalSourceFetcher::new());

	fetcher.insert(EntityDescriptor::new(ID_A).with_tag("persisted")).await;

	{
		let cache =
			Arc::new(FilesystemCache::new(dir.path()).await.expect("filesystem cache"));
		let resolver = DynamicMetadataResolver::builder("dynamic-1", fetcher.clone())
			.config(common::test_config())
			.persistent_cache(cache.clone())
			.build()
			.expect("resolver");

		resolver
			.resolve_single(&CriteriaSet::entity(ID_A))
			.await
			.expect("resolve")
			.expect("record");

		assert_eq!(cache.list_keys().await.expect("list").len(), 1);
	}

	// A fresh resolver over the same directory serves the record with no
	// origin fetch.
	let cache = Arc::new(FilesystemCache::new(dir.path()).await.expect("filesystem cache"));
	let empty_fetcher = Arc::new(LocalSourceFetcher::new());
	let resolver = DynamicMetadataResolver::builder("dynamic-2", empty_fetcher.clone())
		.config(common::test_config())
		.persistent_cache(cache)
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	let record = resolver
		.resolve_single(&CriteriaSet::entity(ID_A))
		.await
		.expect("resolve")
		.expect("record");

	assert_eq!(record.entity_id(), ID_A);
	assert_eq!(record.descriptor().tags, vec!["persisted".to_string()]);
	assert_eq!(empty_fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn background_population_eventually_serves_records() {
	common::init_tracing();

	let generator = DefaultCacheKeyGenerator;
	let cache = Arc::new(MemoryCache::new());
	let descriptor = EntityDescriptor::new(ID_A);

	cache.save(&generator.generate(&descriptor), &descriptor).await.expect("save");

	let mut config = common::test_config();

	config.populate_from_cache_in_background = true;

	let resolver = DynamicMetadataResolver::builder("dynamic-1", Arc::new(LocalSourceFetcher::new()))
		.config(config)
		.persistent_cache(cache)
		.build()
		.expect("resolver");

	resolver.initialize().await.expect("initialize");

	// Give the population task a moment to run.
	let mut resolved = None;

	for _ in 0..50 {
		resolved = resolver.resolve_single(&CriteriaSet::entity(ID_A)).await.expect("resolve");

		if resolved.is_some() {
			break;
		}

		tokio::time::sleep(Duration::from_millis(20)).await;
	}

	assert!(resolved.is_some());
}
