//! Fetch-on-demand metadata resolver with indexed, negatively-cached lookups.

// std
use std::{
	collections::HashMap,
	fmt::{Debug, Formatter, Result as FmtResult},
	sync::{
		Mutex as StdMutex,
		atomic::{AtomicBool, Ordering},
	},
};
// crates.io
use chrono::TimeDelta;
use rand::Rng;
use tokio::{
	sync::{Mutex, RwLock},
	task::JoinHandle,
	time,
};
// self
use crate::{
	_prelude::*,
	cache::{BackingStore, NegativeLookupCache},
	criteria::CriteriaSet,
	filter::{FilterContext, MetadataFilter},
	index::{MetadataIndex, SecondaryIndexManager},
	metadata::{EntityDescriptor, EntityRecord},
	persist::{CacheKeyGenerator, DefaultCacheKeyGenerator, PersistentCache},
	resolver::{
		MetadataResolver,
		fetcher::{FetchOutcome, FetchedMetadata, OriginFetcher},
	},
};

/// Default negative lookup cache duration.
pub const DEFAULT_NEGATIVE_CACHE_DURATION: Duration = Duration::from_secs(10 * 60);
/// Default upper bound on record residency.
pub const DEFAULT_MAX_CACHE_DURATION: Duration = Duration::from_secs(8 * 60 * 60);
/// Default idle window after which unused records are swept.
pub const DEFAULT_MAX_IDLE_DURATION: Duration = Duration::from_secs(8 * 60 * 60);
/// Default background cleanup interval.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);
/// Default jitter applied on top of the cleanup interval.
pub const DEFAULT_SWEEP_JITTER: Duration = Duration::from_secs(30);

/// Predicate deciding whether a persistent cache entry is admitted at startup.
pub type CachePredicate = Arc<dyn Fn(&EntityDescriptor) -> bool + Send + Sync>;
/// Runtime gate deciding whether the resolver participates in resolution.
pub type ActivationCondition = Arc<dyn Fn(&CriteriaSet) -> bool + Send + Sync>;

/// Per-signature guards collapsing concurrent cold-cache fetches.
type FlightMap = HashMap<String, Arc<Mutex<()>>>;

/// Configuration for [`DynamicMetadataResolver`].
#[derive(Clone, Debug)]
pub struct DynamicResolverConfig {
	/// How long a failed lookup suppresses further origin fetches for the same
	/// key; zero disables negative caching.
	pub negative_cache_duration: Duration,
	/// Upper bound on how long a record may stay resident after resolution.
	/// A tighter publisher-suggested `cache_duration` wins.
	pub max_cache_duration: Duration,
	/// Idle window after which unaccessed records are swept.
	pub max_idle_duration: Duration,
	/// Whether the sweeper removes idle records at all.
	pub remove_idle_entities: bool,
	/// Interval between background cleanup sweeps; zero disables the sweeper.
	pub cleanup_interval: Duration,
	/// Random jitter applied on top of `cleanup_interval`.
	pub sweep_jitter: Duration,
	/// Skip records whose validity window has lapsed.
	pub require_valid_metadata: bool,
	/// Whether persistent-cache errors during synchronous population abort
	/// `initialize`.
	pub fail_fast_initialization: bool,
	/// Populate from the persistent cache on a background task instead of
	/// blocking `initialize`.
	pub populate_from_cache_in_background: bool,
	/// Allow origin fetches keyed by non-identifier criteria when no index
	/// yields a match.
	pub secondary_fetch: bool,
}
impl DynamicResolverConfig {
	/// Validate invariants for the configuration.
	pub fn validate(&self) -> Result<()> {
		if !self.negative_cache_duration.is_zero()
			&& self.negative_cache_duration < Duration::from_secs(1)
		{
			return Err(Error::Configuration {
				field: "negative_cache_duration",
				reason: "Must be zero or at least one second.".into(),
			});
		}
		if self.max_cache_duration.is_zero() {
			return Err(Error::Configuration {
				field: "max_cache_duration",
				reason: "Must be greater than zero.".into(),
			});
		}
		if self.remove_idle_entities && self.max_idle_duration.is_zero() {
			return Err(Error::Configuration {
				field: "max_idle_duration",
				reason: "Must be greater than zero when idle removal is enabled.".into(),
			});
		}
		if !self.cleanup_interval.is_zero() && self.cleanup_interval < Duration::from_secs(1) {
			return Err(Error::Configuration {
				field: "cleanup_interval",
				reason: "Must be zero or at least one second.".into(),
			});
		}

		Ok(())
	}
}
impl Default for DynamicResolverConfig {
	fn default() -> Self {
		Self {
			negative_cache_duration: DEFAULT_NEGATIVE_CACHE_DURATION,
			max_cache_duration: DEFAULT_MAX_CACHE_DURATION,
			max_idle_duration: DEFAULT_MAX_IDLE_DURATION,
			remove_idle_entities: true,
			cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
			sweep_jitter: DEFAULT_SWEEP_JITTER,
			require_valid_metadata: true,
			fail_fast_initialization: true,
			populate_from_cache_in_background: true,
			secondary_fetch: false,
		}
	}
}

/// Snapshot of resolver health for status reporting.
#[derive(Clone, Debug)]
pub struct ResolverStatus {
	/// Entity identifiers currently held in the backing store.
	pub active_entities: usize,
	/// Wall-clock time of the most recent successful commit.
	pub last_update: Option<DateTime<Utc>>,
	/// Most recent fetch or filter failure, cleared by the next success.
	pub last_failure: Option<String>,
}

struct ResolverState {
	backing: BackingStore,
	indexes: SecondaryIndexManager,
	negative: NegativeLookupCache,
	last_update: Option<DateTime<Utc>>,
	last_failure: Option<String>,
}

/// Builder for [`DynamicMetadataResolver`].
pub struct DynamicResolverBuilder {
	id: String,
	fetcher: Arc<dyn OriginFetcher>,
	config: DynamicResolverConfig,
	filter: Option<Arc<dyn MetadataFilter>>,
	indexes: Vec<Arc<dyn MetadataIndex>>,
	persistent_cache: Option<Arc<dyn PersistentCache>>,
	key_generator: Arc<dyn CacheKeyGenerator>,
	cache_predicate: Option<CachePredicate>,
	activation_condition: Option<ActivationCondition>,
}
impl DynamicResolverBuilder {
	/// Builder for a resolver with the given identifier and origin fetcher.
	pub fn new(id: impl Into<String>, fetcher: Arc<dyn OriginFetcher>) -> Self {
		Self {
			id: id.into(),
			fetcher,
			config: DynamicResolverConfig::default(),
			filter: None,
			indexes: Vec::new(),
			persistent_cache: None,
			key_generator: Arc::new(DefaultCacheKeyGenerator),
			cache_predicate: None,
			activation_condition: None,
		}
	}

	/// Replace the default configuration.
	pub fn config(mut self, config: DynamicResolverConfig) -> Self {
		self.config = config;

		self
	}

	/// Attach a metadata filter applied to every fetched record.
	pub fn filter(mut self, filter: Arc<dyn MetadataFilter>) -> Self {
		self.filter = Some(filter);

		self
	}

	/// Register a secondary index.
	pub fn index(mut self, index: Arc<dyn MetadataIndex>) -> Self {
		self.indexes.push(index);

		self
	}

	/// Attach a durable cache mirroring resolved records.
	pub fn persistent_cache(mut self, cache: Arc<dyn PersistentCache>) -> Self {
		self.persistent_cache = Some(cache);

		self
	}

	/// Replace the default cache key generator.
	pub fn cache_key_generator(mut self, generator: Arc<dyn CacheKeyGenerator>) -> Self {
		self.key_generator = generator;

		self
	}

	/// Admit only persistent cache entries the predicate accepts at startup.
	pub fn cache_predicate<P>(mut self, predicate: P) -> Self
	where
		P: Fn(&EntityDescriptor) -> bool + Send + Sync + 'static,
	{
		self.cache_predicate = Some(Arc::new(predicate));

		self
	}

	/// Gate the resolver behind a runtime condition; when it evaluates false
	/// the resolver behaves as if it held no data and performs no I/O.
	pub fn activation_condition<C>(mut self, condition: C) -> Self
	where
		C: Fn(&CriteriaSet) -> bool + Send + Sync + 'static,
	{
		self.activation_condition = Some(Arc::new(condition));

		self
	}

	/// Validate the configuration and construct the resolver.
	pub fn build(self) -> Result<DynamicMetadataResolver> {
		if self.id.trim().is_empty() {
			return Err(Error::Configuration {
				field: "id",
				reason: "Must not be empty.".into(),
			});
		}

		self.config.validate()?;

		let state = ResolverState {
			backing: BackingStore::new(),
			indexes: SecondaryIndexManager::new(self.indexes),
			negative: NegativeLookupCache::new(self.config.negative_cache_duration),
			last_update: None,
			last_failure: None,
		};

		Ok(DynamicMetadataResolver {
			id: self.id,
			config: self.config,
			fetcher: self.fetcher,
			filter: self.filter,
			state: Arc::new(RwLock::new(state)),
			inflight: Arc::new(Mutex::new(FlightMap::new())),
			persistent_cache: self.persistent_cache,
			key_generator: self.key_generator,
			cache_predicate: self.cache_predicate,
			activation_condition: self.activation_condition,
			initialized: AtomicBool::new(false),
			tasks: StdMutex::new(Vec::new()),
		})
	}
}

/// Fetch-on-demand metadata resolver.
///
/// On each query: activation gate → backing store → negative lookup cache →
/// single-flight origin fetch → filter → commit (store, indexes, durable
/// write-through). See [`DynamicResolverBuilder`] for assembly.
pub struct DynamicMetadataResolver {
	id: String,
	config: DynamicResolverConfig,
	fetcher: Arc<dyn OriginFetcher>,
	filter: Option<Arc<dyn MetadataFilter>>,
	state: Arc<RwLock<ResolverState>>,
	inflight: Arc<Mutex<FlightMap>>,
	persistent_cache: Option<Arc<dyn PersistentCache>>,
	key_generator: Arc<dyn CacheKeyGenerator>,
	cache_predicate: Option<CachePredicate>,
	activation_condition: Option<ActivationCondition>,
	initialized: AtomicBool,
	tasks: StdMutex<Vec<JoinHandle<()>>>,
}
impl DynamicMetadataResolver {
	/// Builder for a resolver with the given identifier and origin fetcher.
	pub fn builder(
		id: impl Into<String>,
		fetcher: Arc<dyn OriginFetcher>,
	) -> DynamicResolverBuilder {
		DynamicResolverBuilder::new(id, fetcher)
	}

	/// Effective configuration.
	pub fn config(&self) -> &DynamicResolverConfig {
		&self.config
	}

	/// Whether a persistent cache is attached.
	pub fn is_persistent_caching_enabled(&self) -> bool {
		self.persistent_cache.is_some()
	}

	/// Prepare the resolver: populate from the persistent cache (synchronously
	/// or in the background, per configuration) and start the cleanup sweep.
	///
	/// Idempotent; repeat calls are ignored.
	pub async fn initialize(&self) -> Result<()> {
		if self.initialized.swap(true, Ordering::SeqCst) {
			tracing::warn!(resolver = %self.id, "resolver already initialized");

			return Ok(());
		}

		if let Some(cache) = &self.persistent_cache {
			let context = PopulationContext {
				resolver_id: self.id.clone(),
				cache: cache.clone(),
				key_generator: self.key_generator.clone(),
				predicate: self.cache_predicate.clone(),
				state: self.state.clone(),
				config: self.config.clone(),
			};

			if self.config.populate_from_cache_in_background {
				self.track_task(tokio::spawn(async move {
					match populate_from_cache(&context, false).await {
						Ok(count) => tracing::debug!(
							resolver = %context.resolver_id,
							count,
							"background persistent cache population complete"
						),
						Err(err) => tracing::warn!(
							resolver = %context.resolver_id,
							error = %err,
							"background persistent cache population failed"
						),
					}
				}));
			} else {
				match populate_from_cache(&context, self.config.fail_fast_initialization).await {
					Ok(count) =>
						tracing::debug!(resolver = %self.id, count, "persistent cache population complete"),
					Err(err) if self.config.fail_fast_initialization => return Err(err),
					Err(err) => tracing::warn!(
						resolver = %self.id,
						error = %err,
						"continuing without persistent cache data"
					),
				}
			}
		}

		if !self.config.cleanup_interval.is_zero() {
			let handle = self.spawn_sweeper();

			self.track_task(handle);
		}

		Ok(())
	}

	/// Stop background work. Idempotent; queries keep serving from memory.
	pub fn shutdown(&self) {
		if let Ok(mut tasks) = self.tasks.lock() {
			for handle in tasks.drain(..) {
				handle.abort();
			}
		}
	}

	/// Capture resolver health for status reporting.
	pub async fn status(&self) -> ResolverStatus {
		let state = self.state.read().await;

		ResolverStatus {
			active_entities: state.backing.entity_count(),
			last_update: state.last_update,
			last_failure: state.last_failure.clone(),
		}
	}

	fn track_task(&self, handle: JoinHandle<()>) {
		if let Ok(mut tasks) = self.tasks.lock() {
			tasks.push(handle);
		}
	}

	#[tracing::instrument(skip(self, criteria), fields(resolver = %self.id))]
	async fn resolve_by_entity_id(
		&self,
		entity_id: &str,
		criteria: &CriteriaSet,
	) -> Result<Vec<Arc<EntityRecord>>> {
		let held = self.lookup_held(entity_id).await;

		if !held.is_empty() {
			return Ok(held);
		}

		let signature = CriteriaSet::entity_signature(entity_id);

		if self.is_negatively_cached(&signature).await {
			tracing::debug!(entity_id, "lookup suppressed by negative cache");

			return Ok(Vec::new());
		}

		let flight = self.join_flight(&signature).await;
		let _guard = flight.lock().await;

		// A concurrent caller may have finished the fetch while we waited.
		let held = self.lookup_held(entity_id).await;

		if !held.is_empty() {
			self.finish_flight(&signature).await;

			return Ok(held);
		}
		if self.is_negatively_cached(&signature).await {
			self.finish_flight(&signature).await;

			return Ok(Vec::new());
		}

		let committed = self.fetch_filter_commit(criteria, &signature).await;

		self.finish_flight(&signature).await;

		Ok(committed.into_iter().collect())
	}

	#[tracing::instrument(skip(self, criteria), fields(resolver = %self.id))]
	async fn resolve_by_secondary(
		&self,
		criteria: &CriteriaSet,
	) -> Result<Vec<Arc<EntityRecord>>> {
		let held = self.lookup_indexed(criteria).await;

		if !held.is_empty() {
			return Ok(held);
		}
		if !self.config.secondary_fetch {
			tracing::debug!("criteria matched no indexed record; secondary fetch disabled");

			return Ok(Vec::new());
		}

		let signature = criteria.cache_signature();

		if self.is_negatively_cached(&signature).await {
			tracing::debug!(%signature, "secondary lookup suppressed by negative cache");

			return Ok(Vec::new());
		}

		let flight = self.join_flight(&signature).await;
		let _guard = flight.lock().await;
		let held = self.lookup_indexed(criteria).await;

		if !held.is_empty() {
			self.finish_flight(&signature).await;

			return Ok(held);
		}
		if self.is_negatively_cached(&signature).await {
			self.finish_flight(&signature).await;

			return Ok(Vec::new());
		}

		let committed = self.fetch_filter_commit(criteria, &signature).await;

		self.finish_flight(&signature).await;

		Ok(committed.into_iter().collect())
	}

	/// Valid records currently held for the identifier, access-stamped.
	async fn lookup_held(&self, entity_id: &str) -> Vec<Arc<EntityRecord>> {
		let state = self.state.read().await;

		self.collect_valid(&state, entity_id)
	}

	/// Valid records the secondary indexes select for the criteria.
	async fn lookup_indexed(&self, criteria: &CriteriaSet) -> Vec<Arc<EntityRecord>> {
		let state = self.state.read().await;
		let Some(entity_ids) = state.indexes.lookup(criteria) else {
			return Vec::new();
		};
		let mut entity_ids: Vec<String> = entity_ids.into_iter().collect();

		// Deterministic result order regardless of bucket iteration.
		entity_ids.sort();

		entity_ids.iter().flat_map(|entity_id| self.collect_valid(&state, entity_id)).collect()
	}

	fn collect_valid(
		&self,
		state: &ResolverState,
		entity_id: &str,
	) -> Vec<Arc<EntityRecord>> {
		let now = Utc::now();
		let records: Vec<_> = state
			.backing
			.records_for(entity_id)
			.into_iter()
			.filter(|record| {
				if !self.config.require_valid_metadata {
					return true;
				}

				let valid = record.descriptor().is_valid_at(now);

				if !valid {
					tracing::warn!(entity_id, "held record is no longer valid; skipping");
				}

				valid
			})
			.collect();

		for record in &records {
			record.touch(now);
		}

		records
	}

	async fn is_negatively_cached(&self, signature: &str) -> bool {
		self.state.read().await.negative.is_negatively_cached(signature)
	}

	async fn join_flight(&self, signature: &str) -> Arc<Mutex<()>> {
		let mut inflight = self.inflight.lock().await;

		inflight
			.entry(signature.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	async fn finish_flight(&self, signature: &str) {
		self.inflight.lock().await.remove(signature);
	}

	/// Run the fetch → filter → commit tail of the state machine. All failure
	/// modes degrade to `None` plus a negative cache entry.
	async fn fetch_filter_commit(
		&self,
		criteria: &CriteriaSet,
		signature: &str,
	) -> Option<Arc<EntityRecord>> {
		tracing::debug!(signature, "fetching from origin source");

		let fetched = match self.fetcher.fetch(criteria).await {
			Ok(FetchOutcome::Found(fetched)) => fetched,
			Ok(FetchOutcome::NotFound) => {
				tracing::debug!(signature, "origin source has no record");
				self.record_miss(signature, None).await;

				return None;
			},
			Err(err) => {
				tracing::warn!(error = %err, signature, "origin fetch failed");
				self.record_miss(signature, Some(err.to_string())).await;

				return None;
			},
		};
		let fetched = match self.run_filter(fetched).await {
			Ok(fetched) => fetched,
			Err(err) => {
				tracing::warn!(error = %err, signature, "filter rejected fetched record");
				self.record_miss(signature, Some(err.to_string())).await;

				return None;
			},
		};

		Some(self.commit(fetched, signature).await)
	}

	async fn run_filter(
		&self,
		fetched: FetchedMetadata,
	) -> std::result::Result<FetchedMetadata, crate::filter::FilterError> {
		match &self.filter {
			Some(filter) => {
				let context = FilterContext::new(self.id.clone());

				filter.filter(fetched, &context).await
			},
			None => Ok(fetched),
		}
	}

	async fn commit(&self, fetched: FetchedMetadata, signature: &str) -> Arc<EntityRecord> {
		let record = build_record(fetched.descriptor, &self.config);

		{
			let mut state = self.state.write().await;

			commit_locked(&mut state, record.clone());
			state.negative.clear_key(signature);
			state.negative.clear_key(&CriteriaSet::entity_signature(record.entity_id()));
			state.last_failure = None;
		}

		tracing::debug!(
			resolver = %self.id,
			entity_id = record.entity_id(),
			"committed metadata record"
		);

		self.write_through(&record).await;

		record
	}

	async fn write_through(&self, record: &Arc<EntityRecord>) {
		let Some(cache) = &self.persistent_cache else {
			return;
		};
		let key = self.key_generator.generate(record.descriptor());

		if let Err(err) = cache.save(&key, record.descriptor()).await {
			tracing::warn!(error = %err, %key, "persistent cache write-through failed");
		}
	}

	async fn record_miss(&self, signature: &str, failure: Option<String>) {
		let mut state = self.state.write().await;

		state.negative.record_miss(signature);

		if let Some(cause) = failure {
			state.last_failure = Some(cause);
		}
	}

	fn spawn_sweeper(&self) -> JoinHandle<()> {
		let state = self.state.clone();
		let config = self.config.clone();
		let resolver_id = self.id.clone();

		tokio::spawn(async move {
			loop {
				let delay = config.cleanup_interval + sweep_jitter(config.sweep_jitter);

				time::sleep(delay).await;

				let monotonic_now = Instant::now();
				let now = Utc::now();
				let mut state = state.write().await;

				state.negative.purge_expired(monotonic_now);

				let doomed: Vec<String> = state
					.backing
					.ordered()
					.iter()
					.filter(|record| {
						record.is_expired_at(now)
							|| (config.remove_idle_entities
								&& record.idle_for(now) > config.max_idle_duration)
					})
					.map(|record| record.entity_id().to_string())
					.collect();

				for entity_id in doomed {
					tracing::debug!(
						resolver = %resolver_id,
						%entity_id,
						"sweeping expired or idle metadata record"
					);

					let removed = state.backing.remove(&entity_id);

					for record in &removed {
						state.indexes.deindex_record(record.descriptor());
					}
				}
			}
		})
	}
}
#[async_trait::async_trait]
impl MetadataResolver for DynamicMetadataResolver {
	fn id(&self) -> &str {
		&self.id
	}

	async fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<Arc<EntityRecord>>> {
		if criteria.is_empty() {
			return Err(Error::Resolution("Criteria set was empty.".into()));
		}
		if let Some(condition) = &self.activation_condition
			&& !condition(criteria)
		{
			tracing::info!(resolver = %self.id, "resolver bypassed by activation condition");

			return Ok(Vec::new());
		}

		match criteria.entity_id() {
			Some(entity_id) => {
				let entity_id = entity_id.to_string();

				self.resolve_by_entity_id(&entity_id, criteria).await
			},
			None => self.resolve_by_secondary(criteria).await,
		}
	}

	async fn clear(&self) {
		let mut state = self.state.write().await;

		state.backing.clear();
		state.indexes.clear();
		state.negative.clear_all();
	}

	async fn clear_entity(&self, entity_id: &str) {
		let mut state = self.state.write().await;
		let removed = state.backing.remove(entity_id);

		for record in &removed {
			state.indexes.deindex_record(record.descriptor());
		}

		state.negative.clear_key(&CriteriaSet::entity_signature(entity_id));
	}
}
impl Debug for DynamicMetadataResolver {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("DynamicMetadataResolver")
			.field("id", &self.id)
			.field("config", &self.config)
			.field("persistent_caching", &self.persistent_cache.is_some())
			.finish_non_exhaustive()
	}
}
impl Drop for DynamicMetadataResolver {
	fn drop(&mut self) {
		self.shutdown();
	}
}

struct PopulationContext {
	resolver_id: String,
	cache: Arc<dyn PersistentCache>,
	key_generator: Arc<dyn CacheKeyGenerator>,
	predicate: Option<CachePredicate>,
	state: Arc<RwLock<ResolverState>>,
	config: DynamicResolverConfig,
}

/// Load every persisted record, migrating entries stored under stale keys to
/// the ones the current generator produces. Returns the number admitted.
async fn populate_from_cache(context: &PopulationContext, fail_fast: bool) -> Result<usize> {
	let keys = context.cache.list_keys().await?;
	let mut admitted = 0_usize;

	for key in keys {
		let descriptor = match context.cache.load(&key).await {
			Ok(Some(descriptor)) => descriptor,
			Ok(None) => continue,
			Err(err) if fail_fast => return Err(err),
			Err(err) => {
				tracing::warn!(
					resolver = %context.resolver_id,
					error = %err,
					%key,
					"failed to load persistent cache entry; skipping"
				);

				continue;
			},
		};

		if let Some(predicate) = &context.predicate
			&& !predicate(&descriptor)
		{
			tracing::debug!(
				resolver = %context.resolver_id,
				%key,
				entity_id = %descriptor.entity_id,
				"persistent cache entry excluded by predicate"
			);

			continue;
		}

		let expected = context.key_generator.generate(&descriptor);

		if expected != key {
			if let Err(err) = migrate_key(&context.cache, &key, &expected, &descriptor).await {
				if fail_fast {
					return Err(err);
				}

				tracing::warn!(
					resolver = %context.resolver_id,
					error = %err,
					%key,
					"failed to migrate persistent cache entry"
				);
			} else {
				tracing::debug!(
					resolver = %context.resolver_id,
					old_key = %key,
					new_key = %expected,
					"migrated persistent cache entry to current key"
				);
			}
		}

		let record = build_record(descriptor, &context.config);
		let mut state = context.state.write().await;

		commit_locked(&mut state, record);

		admitted += 1;
	}

	Ok(admitted)
}

async fn migrate_key(
	cache: &Arc<dyn PersistentCache>,
	old_key: &str,
	new_key: &str,
	descriptor: &EntityDescriptor,
) -> Result<()> {
	// Save first so the record is never absent from the store.
	cache.save(new_key, descriptor).await?;
	cache.remove(old_key).await?;

	Ok(())
}

fn commit_locked(state: &mut ResolverState, record: Arc<EntityRecord>) {
	let displaced = state.backing.commit(record.clone());

	for old in &displaced {
		state.indexes.deindex_record(old.descriptor());
	}

	state.indexes.index_record(record.descriptor());
	state.last_update = Some(record.resolved_at());
}

fn build_record(
	descriptor: EntityDescriptor,
	config: &DynamicResolverConfig,
) -> Arc<EntityRecord> {
	let residency = descriptor
		.cache_duration
		.map(|suggested| suggested.min(config.max_cache_duration))
		.unwrap_or(config.max_cache_duration);
	let record = EntityRecord::fetched(descriptor, None);
	let expires_at =
		TimeDelta::from_std(residency).ok().map(|delta| record.resolved_at() + delta);

	Arc::new(record.into_committed(expires_at))
}

fn sweep_jitter(max: Duration) -> Duration {
	if max.is_zero() {
		return Duration::ZERO;
	}

	let mut rng = rand::rng();
	let jitter = rng.random_range(0.0..=max.as_secs_f64());

	Duration::from_secs_f64(jitter)
}
