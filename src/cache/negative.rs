//! Negative lookup cache: time-bounded "this key did not resolve" entries.

// std
use std::collections::HashMap;
// self
use crate::_prelude::*;

/// Remembers failed lookups so repeated callers do not re-trigger expensive
/// origin fetches within the configured window.
///
/// Entries expire lazily on probe; the background sweep calls
/// [`purge_expired`](Self::purge_expired) to reclaim memory for keys that are
/// never probed again. A zero duration disables the cache entirely.
#[derive(Debug)]
pub struct NegativeLookupCache {
	duration: Duration,
	entries: HashMap<String, Instant>,
}
impl NegativeLookupCache {
	/// Negative cache suppressing repeat fetches for `duration`.
	pub fn new(duration: Duration) -> Self {
		Self { duration, entries: HashMap::new() }
	}

	/// Whether negative caching is enabled at all.
	pub fn is_enabled(&self) -> bool {
		!self.duration.is_zero()
	}

	/// Record that the key failed to resolve as of now.
	pub fn record_miss(&mut self, signature: &str) {
		if !self.is_enabled() {
			return;
		}

		self.entries.insert(signature.to_string(), Instant::now() + self.duration);
	}

	/// Whether an unexpired miss is on file for the key.
	pub fn is_negatively_cached(&self, signature: &str) -> bool {
		self.entries.get(signature).map(|expiry| Instant::now() < *expiry).unwrap_or(false)
	}

	/// Forget the miss recorded for one key.
	pub fn clear_key(&mut self, signature: &str) {
		self.entries.remove(signature);
	}

	/// Forget every recorded miss.
	pub fn clear_all(&mut self) {
		self.entries.clear();
	}

	/// Drop entries whose window has lapsed.
	pub fn purge_expired(&mut self, now: Instant) {
		self.entries.retain(|_, expiry| now < *expiry);
	}

	/// Number of entries on file, including lapsed ones not yet purged.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether no entries are on file.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
