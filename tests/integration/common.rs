//! Shared helpers for integration tests.

// std
use std::time::Duration;
// crates.io
use saml_metadata_cache::{
	DynamicResolverConfig, EntityDescriptor, RoleDescriptor, RoleType,
};

pub const ID_A: &str = "urn:test:entity:a";
pub const ID_B: &str = "urn:test:entity:b";
pub const ID_C: &str = "urn:test:entity:c";

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Test configuration: short negative cache, synchronous cache population, no
/// background sweeper.
pub fn test_config() -> DynamicResolverConfig {
	DynamicResolverConfig {
		negative_cache_duration: Duration::from_secs(1),
		cleanup_interval: Duration::ZERO,
		populate_from_cache_in_background: false,
		..Default::default()
	}
}

pub fn service_provider(entity_id: &str) -> EntityDescriptor {
	EntityDescriptor::new(entity_id).with_role(RoleDescriptor::new(RoleType::ServiceProvider))
}

pub fn identity_provider(entity_id: &str) -> EntityDescriptor {
	EntityDescriptor::new(entity_id).with_role(RoleDescriptor::new(RoleType::IdentityProvider))
}
