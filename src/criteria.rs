//! Typed lookup criteria and the unordered bag used to probe resolvers.

// self
use crate::{metadata::RoleType, persist::sha256_hex};

/// Artifact-derived source identifier, lowercase hex.
///
/// Federation artifacts carry a digest of the issuing entity's identifier;
/// resolvers map it back to the entity via the artifact index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactSourceId(String);
impl ArtifactSourceId {
	/// Wrap an existing source key; uppercase hex is canonicalised.
	pub fn new(hex: impl Into<String>) -> Self {
		Self(hex.into().to_lowercase())
	}

	/// Derive the source key an entity identifier maps to.
	pub fn derive(entity_id: &str) -> Self {
		Self(sha256_hex(entity_id.as_bytes()))
	}

	/// Hex rendering of the source key.
	pub fn as_hex(&self) -> &str {
		&self.0
	}
}

/// One lookup criterion understood by resolvers and secondary indexes.
///
/// Criteria a resolver or index does not recognise are treated as "no index
/// match" rather than an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
	/// Unique identifier of the federation participant.
	EntityId(String),
	/// Role the entity must fill.
	Role(RoleType),
	/// Protocol support URI the entity must advertise.
	Protocol(String),
	/// Artifact source key derived from a received artifact.
	Artifact(ArtifactSourceId),
	/// Arbitrary publisher-assigned string tag.
	Tag(String),
}
impl Criterion {
	fn signature_part(&self) -> String {
		match self {
			Self::EntityId(id) => format!("entity-id:{id}"),
			Self::Role(role) => format!("role:{role}"),
			Self::Protocol(protocol) => format!("protocol:{protocol}"),
			Self::Artifact(source) => format!("artifact:{}", source.as_hex()),
			Self::Tag(tag) => format!("tag:{tag}"),
		}
	}
}

/// Unordered bag of lookup criteria.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CriteriaSet {
	criteria: Vec<Criterion>,
}
impl CriteriaSet {
	/// Empty criteria set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Criteria set selecting a single entity identifier.
	pub fn entity(entity_id: impl Into<String>) -> Self {
		Self::new().with(Criterion::EntityId(entity_id.into()))
	}

	/// Add a criterion, builder style.
	pub fn with(mut self, criterion: Criterion) -> Self {
		self.add(criterion);

		self
	}

	/// Add a criterion in place.
	pub fn add(&mut self, criterion: Criterion) {
		self.criteria.push(criterion);
	}

	/// Whether the bag holds no criteria.
	pub fn is_empty(&self) -> bool {
		self.criteria.is_empty()
	}

	/// Number of criteria held.
	pub fn len(&self) -> usize {
		self.criteria.len()
	}

	/// Iterate the criteria in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
		self.criteria.iter()
	}

	/// First entity identifier criterion, if any.
	pub fn entity_id(&self) -> Option<&str> {
		self.criteria.iter().find_map(|criterion| match criterion {
			Criterion::EntityId(id) => Some(id.as_str()),
			_ => None,
		})
	}

	/// Deterministic signature of the bag, used to key the negative lookup
	/// cache. Order-insensitive; duplicates collapse.
	pub fn cache_signature(&self) -> String {
		let mut parts: Vec<String> =
			self.criteria.iter().map(Criterion::signature_part).collect();

		parts.sort();
		parts.dedup();

		parts.join("|")
	}

	/// Signature an entity-identifier-only criteria set produces; lets
	/// `clear_entity` purge the matching negative cache entry.
	pub fn entity_signature(entity_id: &str) -> String {
		format!("entity-id:{entity_id}")
	}
}
impl FromIterator<Criterion> for CriteriaSet {
	fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
		Self { criteria: iter.into_iter().collect() }
	}
}
