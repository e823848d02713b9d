//! Composition of multiple resolvers behind a single query surface.

// std
use std::fmt::{Debug, Formatter, Result as FmtResult};
// crates.io
use async_trait::async_trait;
// self
use crate::{
	_prelude::*, criteria::CriteriaSet, filter::MetadataFilter, metadata::EntityRecord,
	resolver::MetadataResolver,
};

/// Queries an ordered list of member resolvers, returning the first non-empty
/// result.
///
/// Holds no cache, indexes, or filters of its own — everything is delegated to
/// the members. Filters are meaningful only per member, so attaching one to
/// the chain is rejected when the chain is built.
pub struct ChainingMetadataResolver {
	id: String,
	members: Vec<Arc<dyn MetadataResolver>>,
}
impl ChainingMetadataResolver {
	/// Builder for a chain with the given identifier.
	pub fn builder(id: impl Into<String>) -> ChainingResolverBuilder {
		ChainingResolverBuilder::new(id)
	}

	/// Member resolvers in query order.
	pub fn members(&self) -> &[Arc<dyn MetadataResolver>] {
		&self.members
	}
}
#[async_trait]
impl MetadataResolver for ChainingMetadataResolver {
	fn id(&self) -> &str {
		&self.id
	}

	async fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<Arc<EntityRecord>>> {
		for member in &self.members {
			match member.resolve(criteria).await {
				Ok(records) if !records.is_empty() => {
					tracing::trace!(
						chain = %self.id,
						member = member.id(),
						count = records.len(),
						"chain member produced results"
					);

					return Ok(records);
				},
				Ok(_) => {},
				Err(err) => {
					tracing::warn!(
						chain = %self.id,
						member = member.id(),
						error = %err,
						"chain member failed; proceeding to next"
					);
				},
			}
		}

		Ok(Vec::new())
	}

	async fn clear(&self) {
		for member in &self.members {
			member.clear().await;
		}
	}

	async fn clear_entity(&self, entity_id: &str) {
		for member in &self.members {
			member.clear_entity(entity_id).await;
		}
	}
}
impl Debug for ChainingMetadataResolver {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("ChainingMetadataResolver")
			.field("id", &self.id)
			.field("members", &self.members.iter().map(|member| member.id()).collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`ChainingMetadataResolver`].
pub struct ChainingResolverBuilder {
	id: String,
	members: Vec<Arc<dyn MetadataResolver>>,
	filter: Option<Arc<dyn MetadataFilter>>,
}
impl ChainingResolverBuilder {
	/// Builder for a chain with the given identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), members: Vec::new(), filter: None }
	}

	/// Append a member resolver; members are queried in insertion order.
	pub fn member(mut self, resolver: Arc<dyn MetadataResolver>) -> Self {
		self.members.push(resolver);

		self
	}

	/// Request a filter on the chain itself.
	///
	/// Always rejected by [`build`](Self::build): filters belong to the
	/// members. The setter exists so the misconfiguration is reported rather
	/// than silently dropped.
	pub fn filter(mut self, filter: Arc<dyn MetadataFilter>) -> Self {
		self.filter = Some(filter);

		self
	}

	/// Validate the configuration and construct the chain.
	pub fn build(self) -> Result<ChainingMetadataResolver> {
		if self.filter.is_some() {
			return Err(Error::Configuration {
				field: "filter",
				reason: "Metadata filters are not supported on a chaining resolver; attach them \
				         to the members instead."
					.into(),
			});
		}
		if self.id.trim().is_empty() {
			return Err(Error::Configuration {
				field: "id",
				reason: "Must not be empty.".into(),
			});
		}
		if self.members.is_empty() {
			tracing::warn!(chain = %self.id, "chaining resolver configured without members");
		}

		Ok(ChainingMetadataResolver { id: self.id, members: self.members })
	}
}
impl Debug for ChainingResolverBuilder {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("ChainingResolverBuilder")
			.field("id", &self.id)
			.field("members", &self.members.len())
			.finish_non_exhaustive()
	}
}
