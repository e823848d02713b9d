//! Entity metadata document model and the committed record wrapper.

// std
use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	sync::atomic::{AtomicI64, Ordering},
};
// crates.io
use serde::{Deserialize, Serialize};
use url::Url;
// self
use crate::_prelude::*;

/// Role a federation participant may fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleType {
	/// Asserts identities to service providers.
	IdentityProvider,
	/// Consumes assertions from identity providers.
	ServiceProvider,
	/// Answers attribute queries.
	AttributeAuthority,
	/// Dereferences artifacts into protocol messages.
	ArtifactResolution,
}
impl Display for RoleType {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		let name = match self {
			Self::IdentityProvider => "identity-provider",
			Self::ServiceProvider => "service-provider",
			Self::AttributeAuthority => "attribute-authority",
			Self::ArtifactResolution => "artifact-resolution",
		};

		f.write_str(name)
	}
}

/// Protocol endpoint advertised by a role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
	/// Binding URI of the endpoint.
	pub binding: String,
	/// Network location of the endpoint.
	pub location: Url,
}

/// One role description: the role plus the protocols and endpoints it serves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
	/// Role the entity fills.
	pub role: RoleType,
	/// Protocol support URIs advertised for the role.
	#[serde(default)]
	pub protocols: Vec<String>,
	/// Endpoints serving the role.
	#[serde(default)]
	pub endpoints: Vec<Endpoint>,
}
impl RoleDescriptor {
	/// Role description with no protocols or endpoints.
	pub fn new(role: RoleType) -> Self {
		Self { role, protocols: Vec::new(), endpoints: Vec::new() }
	}

	/// Add a protocol support URI.
	pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
		self.protocols.push(protocol.into());

		self
	}

	/// Add an endpoint.
	pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
		self.endpoints.push(endpoint);

		self
	}
}

/// Parsed entity metadata document.
///
/// Opaque to the cache engine beyond the attributes surfaced here for indexing
/// and validity checks; parsing and signature handling happen upstream of the
/// origin fetcher and filter boundaries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
	/// Unique identifier of the federation participant.
	pub entity_id: String,
	/// Roles the entity fills.
	#[serde(default)]
	pub roles: Vec<RoleDescriptor>,
	/// Artifact source keys the entity publishes in addition to the one
	/// derived from its identifier, lowercase hex.
	#[serde(default)]
	pub artifact_source_ids: Vec<String>,
	/// Publisher-assigned string tags.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Hard validity deadline; absent means no expiry.
	#[serde(default)]
	pub valid_until: Option<DateTime<Utc>>,
	/// Publisher-suggested residency bound for caches.
	#[serde(default)]
	pub cache_duration: Option<Duration>,
}
impl EntityDescriptor {
	/// Descriptor carrying only an entity identifier.
	pub fn new(entity_id: impl Into<String>) -> Self {
		Self {
			entity_id: entity_id.into(),
			roles: Vec::new(),
			artifact_source_ids: Vec::new(),
			tags: Vec::new(),
			valid_until: None,
			cache_duration: None,
		}
	}

	/// Add a role description.
	pub fn with_role(mut self, role: RoleDescriptor) -> Self {
		self.roles.push(role);

		self
	}

	/// Add a publisher tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.push(tag.into());

		self
	}

	/// Set the validity deadline.
	pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
		self.valid_until = Some(valid_until);

		self
	}

	/// Whether the descriptor's validity window is open at `now`.
	pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
		self.valid_until.map(|deadline| now < deadline).unwrap_or(true)
	}

	/// Whether the entity fills the given role.
	pub fn has_role(&self, role: RoleType) -> bool {
		self.roles.iter().any(|descriptor| descriptor.role == role)
	}
}

/// A resolved metadata record as held by the backing store.
///
/// Records are immutable once committed. The raw serialized form produced by
/// the transport is retained only between fetch and commit; commit drops it to
/// bound memory.
#[derive(Debug)]
pub struct EntityRecord {
	descriptor: Arc<EntityDescriptor>,
	source: Option<Vec<u8>>,
	resolved_at: DateTime<Utc>,
	expires_at: Option<DateTime<Utc>>,
	last_access_ms: AtomicI64,
}
impl EntityRecord {
	/// Wrap freshly fetched metadata prior to filtering and commit.
	pub fn fetched(descriptor: EntityDescriptor, source: Option<Vec<u8>>) -> Self {
		let now = Utc::now();

		Self {
			descriptor: Arc::new(descriptor),
			source,
			resolved_at: now,
			expires_at: None,
			last_access_ms: AtomicI64::new(now.timestamp_millis()),
		}
	}

	/// Finalize the record for commit: stamp the residency deadline and drop
	/// the raw serialized form.
	pub fn into_committed(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
		self.source = None;
		self.expires_at = expires_at;

		self
	}

	/// Parsed metadata document.
	pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
		&self.descriptor
	}

	/// Entity identifier of the record.
	pub fn entity_id(&self) -> &str {
		&self.descriptor.entity_id
	}

	/// Raw serialized form, present only before commit.
	pub fn source(&self) -> Option<&[u8]> {
		self.source.as_deref()
	}

	/// Wall-clock time the record was resolved.
	pub fn resolved_at(&self) -> DateTime<Utc> {
		self.resolved_at
	}

	/// Residency deadline after which the sweeper may drop the record.
	pub fn expires_at(&self) -> Option<DateTime<Utc>> {
		self.expires_at
	}

	/// Note an access for idle tracking.
	pub fn touch(&self, now: DateTime<Utc>) {
		self.last_access_ms.store(now.timestamp_millis(), Ordering::Relaxed);
	}

	/// Time elapsed since the record was last served.
	pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
		let last = self.last_access_ms.load(Ordering::Relaxed);
		let idle_ms = now.timestamp_millis().saturating_sub(last).max(0);

		Duration::from_millis(idle_ms as u64)
	}

	/// Whether the residency deadline has passed.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at.map(|deadline| now >= deadline).unwrap_or(false)
	}
}
