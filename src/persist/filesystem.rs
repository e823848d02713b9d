//! Filesystem-backed persistent cache: one JSON document per key.

// std
use std::{io::ErrorKind, path::PathBuf};
// crates.io
use async_trait::async_trait;
use tokio::fs;
// self
use crate::{_prelude::*, metadata::EntityDescriptor, persist::PersistentCache};

const FILE_EXTENSION: &str = "json";

/// Stores each descriptor as `<base_dir>/<key>.json`.
///
/// Keys double as file names and are restricted to ASCII alphanumerics, `-`,
/// and `_`; the default cache key generator's hex output always qualifies.
#[derive(Clone, Debug)]
pub struct FilesystemCache {
	base_dir: PathBuf,
}
impl FilesystemCache {
	/// Open the cache, creating `base_dir` if needed.
	pub async fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
		let base_dir = base_dir.into();

		fs::create_dir_all(&base_dir).await?;

		Ok(Self { base_dir })
	}

	/// Base directory holding the stored documents.
	pub fn base_dir(&self) -> &PathBuf {
		&self.base_dir
	}

	fn path_for(&self, key: &str) -> Result<PathBuf> {
		validate_key(key)?;

		Ok(self.base_dir.join(format!("{key}.{FILE_EXTENSION}")))
	}
}
#[async_trait]
impl PersistentCache for FilesystemCache {
	async fn load(&self, key: &str) -> Result<Option<EntityDescriptor>> {
		let path = self.path_for(key)?;

		match fs::read(&path).await {
			Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	async fn save(&self, key: &str, descriptor: &EntityDescriptor) -> Result<()> {
		let path = self.path_for(key)?;
		let bytes = serde_json::to_vec(descriptor)?;

		fs::write(&path, bytes).await?;

		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		let path = self.path_for(key)?;

		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err.into()),
		}
	}

	async fn list_keys(&self) -> Result<Vec<String>> {
		let mut keys = Vec::new();
		let mut entries = fs::read_dir(&self.base_dir).await?;

		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();

			if path.extension().and_then(|extension| extension.to_str()) != Some(FILE_EXTENSION)
			{
				continue;
			}
			if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
				keys.push(stem.to_string());
			}
		}

		Ok(keys)
	}
}

fn validate_key(key: &str) -> Result<()> {
	if key.is_empty()
		|| !key.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
	{
		return Err(Error::PersistentCache(format!("Key '{key}' is not a safe file name.")));
	}

	Ok(())
}
