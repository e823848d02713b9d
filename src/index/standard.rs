//! Standard secondary indexes: role, protocol, artifact, and function-driven.

// std
use std::{
	collections::HashSet,
	fmt::{Debug, Formatter, Result as FmtResult},
};
// self
use crate::{
	criteria::{ArtifactSourceId, CriteriaSet, Criterion},
	index::{IndexKey, MetadataIndex},
	metadata::EntityDescriptor,
};

const ROLE_INDEX: &str = "role";
const PROTOCOL_INDEX: &str = "protocol";
const ARTIFACT_INDEX: &str = "artifact";

/// Indexes entities by the roles they fill.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoleIndex;
impl MetadataIndex for RoleIndex {
	fn name(&self) -> &'static str {
		ROLE_INDEX
	}

	fn record_keys(&self, descriptor: &EntityDescriptor) -> HashSet<IndexKey> {
		descriptor
			.roles
			.iter()
			.map(|role| IndexKey::new(ROLE_INDEX, role.role.to_string()))
			.collect()
	}

	fn criteria_keys(&self, criteria: &CriteriaSet) -> Option<HashSet<IndexKey>> {
		let keys: HashSet<IndexKey> = criteria
			.iter()
			.filter_map(|criterion| match criterion {
				Criterion::Role(role) => Some(IndexKey::new(ROLE_INDEX, role.to_string())),
				_ => None,
			})
			.collect();

		(!keys.is_empty()).then_some(keys)
	}
}

/// Indexes entities by the protocol support URIs their roles advertise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtocolIndex;
impl MetadataIndex for ProtocolIndex {
	fn name(&self) -> &'static str {
		PROTOCOL_INDEX
	}

	fn record_keys(&self, descriptor: &EntityDescriptor) -> HashSet<IndexKey> {
		descriptor
			.roles
			.iter()
			.flat_map(|role| role.protocols.iter())
			.map(|protocol| IndexKey::new(PROTOCOL_INDEX, protocol.clone()))
			.collect()
	}

	fn criteria_keys(&self, criteria: &CriteriaSet) -> Option<HashSet<IndexKey>> {
		let keys: HashSet<IndexKey> = criteria
			.iter()
			.filter_map(|criterion| match criterion {
				Criterion::Protocol(protocol) =>
					Some(IndexKey::new(PROTOCOL_INDEX, protocol.clone())),
				_ => None,
			})
			.collect();

		(!keys.is_empty()).then_some(keys)
	}
}

/// Indexes entities by artifact source key: the key derived from the entity
/// identifier plus any source keys the descriptor declares explicitly.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArtifactIndex;
impl MetadataIndex for ArtifactIndex {
	fn name(&self) -> &'static str {
		ARTIFACT_INDEX
	}

	fn record_keys(&self, descriptor: &EntityDescriptor) -> HashSet<IndexKey> {
		let derived = ArtifactSourceId::derive(&descriptor.entity_id);
		let mut keys = HashSet::new();

		keys.insert(IndexKey::new(ARTIFACT_INDEX, derived.as_hex()));

		for declared in &descriptor.artifact_source_ids {
			keys.insert(IndexKey::new(
				ARTIFACT_INDEX,
				ArtifactSourceId::new(declared.clone()).as_hex(),
			));
		}

		keys
	}

	fn criteria_keys(&self, criteria: &CriteriaSet) -> Option<HashSet<IndexKey>> {
		let keys: HashSet<IndexKey> = criteria
			.iter()
			.filter_map(|criterion| match criterion {
				Criterion::Artifact(source) =>
					Some(IndexKey::new(ARTIFACT_INDEX, source.as_hex())),
				_ => None,
			})
			.collect();

		(!keys.is_empty()).then_some(keys)
	}
}

/// Index driven by a pair of caller-supplied functions.
pub struct FunctionIndex {
	name: &'static str,
	record_fn: Box<dyn Fn(&EntityDescriptor) -> HashSet<IndexKey> + Send + Sync>,
	criteria_fn: Box<dyn Fn(&CriteriaSet) -> Option<HashSet<IndexKey>> + Send + Sync>,
}
impl FunctionIndex {
	/// Index over the given record and criteria key functions.
	pub fn new<R, C>(name: &'static str, record_fn: R, criteria_fn: C) -> Self
	where
		R: Fn(&EntityDescriptor) -> HashSet<IndexKey> + Send + Sync + 'static,
		C: Fn(&CriteriaSet) -> Option<HashSet<IndexKey>> + Send + Sync + 'static,
	{
		Self { name, record_fn: Box::new(record_fn), criteria_fn: Box::new(criteria_fn) }
	}
}
impl MetadataIndex for FunctionIndex {
	fn name(&self) -> &'static str {
		self.name
	}

	fn record_keys(&self, descriptor: &EntityDescriptor) -> HashSet<IndexKey> {
		(self.record_fn)(descriptor)
	}

	fn criteria_keys(&self, criteria: &CriteriaSet) -> Option<HashSet<IndexKey>> {
		(self.criteria_fn)(criteria)
	}
}
impl Debug for FunctionIndex {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("FunctionIndex").field("name", &self.name).finish()
	}
}
