//! Secondary indexes: lookup by criteria other than the entity identifier.

pub mod manager;
pub mod standard;

// std
use std::collections::HashSet;
// self
use crate::{criteria::CriteriaSet, metadata::EntityDescriptor};

pub use manager::SecondaryIndexManager;
pub use standard::{ArtifactIndex, FunctionIndex, ProtocolIndex, RoleIndex};

/// Key under which an index files entity identifiers.
///
/// Namespaced by the owning index so distinct indexes never collide in the
/// manager's bucket map.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexKey {
	index: &'static str,
	value: String,
}
impl IndexKey {
	/// Key in the given index namespace.
	pub fn new(index: &'static str, value: impl Into<String>) -> Self {
		Self { index, value: value.into() }
	}

	/// Namespace of the owning index.
	pub fn index(&self) -> &str {
		self.index
	}

	/// Key value within the namespace.
	pub fn value(&self) -> &str {
		&self.value
	}
}

/// A pluggable secondary index over entity descriptors.
///
/// An index is a pair of pure functions: one filing a record under zero or
/// more keys, one mapping a criteria set to the key(s) it implies. Returning
/// `None` from [`criteria_keys`](Self::criteria_keys) means the criteria carry
/// nothing this index understands — distinct from understood-but-empty.
pub trait MetadataIndex: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &'static str;

	/// Keys the descriptor should be filed under; empty if not indexable.
	fn record_keys(&self, descriptor: &EntityDescriptor) -> HashSet<IndexKey>;

	/// Keys the criteria imply, or `None` when unrecognised.
	fn criteria_keys(&self, criteria: &CriteriaSet) -> Option<HashSet<IndexKey>>;
}
