//! Composed configuration loading: `.env` file, process environment, and an
//! optional `picasort.toml`, merged in that order of precedence.

pub mod db_url;
pub mod error;

use std::path::{Path, PathBuf};

use crate::{
    models::{
        CacheConfig, Config, ConfigMetadata, DatabaseConfig, MediaConfig,
        sources::{EnvConfig, FileConfig},
    },
    validation::{ConfigWarning, ConfigWarnings},
};

pub use db_url::{
    DatabaseUrlSource, resolve_database_url,
    resolve_effective_database_url,
    resolve_effective_database_url_with_source,
};
pub use error::ConfigLoadError;

const DEFAULT_CONFIG_FILE: &str = "picasort.toml";
const DEFAULT_CACHE_ROOT: &str = "./cache";

#[derive(Debug, Clone, Default)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

/// A loaded configuration plus the non-fatal findings collected on the way.
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        // Process environment wins over the .env file: dotenvy only fills
        // in variables that are not already set.
        let env_file_loaded = match self.options.env_file.as_deref() {
            Some(path) if path.exists() => {
                dotenvy::from_path(path).is_ok()
            }
            Some(_) => false,
            None => dotenvy::dotenv().is_ok(),
        };

        let (file_config, config_path) = self.load_file_config()?;
        let env = EnvConfig::gather();

        let primary_url =
            resolve_database_url(&env, &file_config.database)?;
        let admin_url = env
            .database_admin_url
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| file_config.database.admin_url.clone());

        if primary_url.is_none() {
            warnings.push(ConfigWarning {
                message: "no database configuration found".to_string(),
                hint: Some(
                    "set DATABASE_URL or DATABASE_HOST/DATABASE_APP_USER/DATABASE_NAME, or run `picasort-init init`"
                        .to_string(),
                ),
            });
        }

        let photo_roots: Vec<PathBuf> = env
            .photo_roots
            .clone()
            .map(|roots| roots.into_iter().map(PathBuf::from).collect())
            .or_else(|| file_config.media.photo_roots.clone())
            .unwrap_or_default();

        if photo_roots.is_empty() {
            warnings.push(ConfigWarning {
                message: "no photo roots configured".to_string(),
                hint: Some(
                    "set PHOTO_ROOTS or [media].photo_roots in picasort.toml"
                        .to_string(),
                ),
            });
        }

        let cache_root = env
            .cache_root
            .clone()
            .or_else(|| file_config.cache.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_ROOT));
        let cache_thumbnails = env
            .cache_thumbnails
            .clone()
            .or_else(|| file_config.cache.thumbnails.clone())
            .unwrap_or_else(|| cache_root.join("thumbnails"));

        let config = Config {
            database: DatabaseConfig {
                primary_url,
                admin_url,
            },
            media: MediaConfig { photo_roots },
            cache: CacheConfig {
                root: cache_root,
                thumbnails: cache_thumbnails,
            },
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
    ) -> Result<(FileConfig, Option<PathBuf>), ConfigLoadError> {
        let path = match self.options.config_path.as_deref() {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok((FileConfig::default(), None));
                }
                default.to_path_buf()
            }
        };

        let raw = std::fs::read_to_string(&path).map_err(|source| {
            ConfigLoadError::ConfigFileIo {
                path: path.clone(),
                source,
            }
        })?;
        let parsed: FileConfig =
            toml::from_str(&raw).map_err(|source| {
                ConfigLoadError::ConfigFileParse {
                    path: path.clone(),
                    source,
                }
            })?;
        Ok((parsed, Some(path)))
    }
}
