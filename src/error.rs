//! Crate-wide error types and `Result` alias.

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the metadata cache crate.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Serde(#[from] serde_json::Error),
	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error(transparent)]
	Filter(#[from] crate::filter::FilterError),

	#[error("Configuration failed for {field}: {reason}")]
	Configuration { field: &'static str, reason: String },
	#[error("Origin fetch failed: {0}")]
	Fetch(String),
	#[error("Persistent cache error: {0}")]
	PersistentCache(String),
	#[error("Resolution error: {0}")]
	Resolution(String),
}
