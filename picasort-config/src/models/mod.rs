pub mod sources;

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub cache: CacheConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        self.cache.ensure_directories()
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache.root
    }

    pub fn thumbnail_cache_dir(&self) -> &Path {
        &self.cache.thumbnails
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Application connection URL, if configured.
    pub primary_url: Option<String>,
    /// Administrative connection URL used for provisioning.
    pub admin_url: Option<String>,
}

/// Directories scanned for photos. Empty means indexing has nothing to do
/// but the tooling still works.
#[derive(Debug, Clone, Default)]
pub struct MediaConfig {
    pub photo_roots: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub root: PathBuf,
    pub thumbnails: PathBuf,
}

impl CacheConfig {
    fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.thumbnails)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
