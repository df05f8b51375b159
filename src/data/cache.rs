// ============================================================
// Layer 4 — Dataset Cache
// ============================================================
// Building the split means decoding every record, windowing and
// standardizing it. The result is cached next to the data as
// `ecg_cache.bin` (bincode) so later runs start immediately.
//
// The cache is keyed by everything that influences its
// content: a format version, the loader settings and the label
// encoding. A cache written with different settings, or one
// that fails to decode, is treated as absent and rebuilt.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::loader::{Loader, LoaderConfig};

pub const CACHE_FILE: &str = "ecg_cache.bin";

/// Bumped whenever the cached layout changes.
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheKey {
    pub version: u32,
    pub config:  LoaderConfig,
    pub one_hot: bool,
}

impl CacheKey {
    pub fn new(config: &LoaderConfig, one_hot: bool) -> Self {
        Self { version: CACHE_VERSION, config: config.clone(), one_hot }
    }
}

#[derive(Serialize)]
struct CacheEntryRef<'a> {
    key:  &'a CacheKey,
    data: &'a Loader,
}

#[derive(Deserialize)]
struct CacheEntry {
    key:  CacheKey,
    data: Loader,
}

pub struct DatasetCache {
    path: PathBuf,
}

impl DatasetCache {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { path: data_dir.as_ref().join(CACHE_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached split if one exists for exactly this key.
    pub fn load(&self, key: &CacheKey) -> Result<Option<Loader>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path)
            .with_context(|| format!("Cannot read cache '{}'", self.path.display()))?;

        let entry: CacheEntry =
            match bincode::serde::decode_from_slice(&bytes, bincode::config::standard()) {
                Ok((entry, _)) => entry,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable cache '{}': {}", self.path.display(), e);
                    return Ok(None);
                }
            };

        if &entry.key != key {
            tracing::info!("Cache '{}' was built with other settings, rebuilding", self.path.display());
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    /// Write (or overwrite) the cache.
    pub fn store(&self, key: &CacheKey, data: &Loader) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(
            CacheEntryRef { key, data },
            bincode::config::standard(),
        )
        .context("Cannot encode dataset cache")?;

        fs::write(&self.path, bytes)
            .with_context(|| format!("Cannot write cache '{}'", self.path.display()))?;

        tracing::debug!("Wrote dataset cache '{}'", self.path.display());
        Ok(())
    }
}
