use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::parse_csv_var;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub media: FileMediaConfig,
    #[serde(default)]
    pub cache: FileCacheConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMediaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_roots: Option<Vec<PathBuf>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<PathBuf>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub database_admin_url: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_password_file: Option<PathBuf>,
    pub photo_roots: Option<Vec<String>>,
    pub cache_root: Option<PathBuf>,
    pub cache_thumbnails: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            database_url_file: std::env::var("DATABASE_URL_FILE")
                .ok()
                .map(PathBuf::from),
            database_admin_url: std::env::var("DATABASE_URL_ADMIN").ok(),
            database_host: std::env::var("DATABASE_HOST").ok(),
            database_port: std::env::var("DATABASE_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            database_user: std::env::var("DATABASE_APP_USER").ok(),
            database_name: std::env::var("DATABASE_NAME").ok(),
            database_password: std::env::var("DATABASE_APP_PASSWORD").ok(),
            database_password_file: std::env::var(
                "DATABASE_APP_PASSWORD_FILE",
            )
            .ok()
            .map(PathBuf::from),
            photo_roots: parse_csv_var("PHOTO_ROOTS"),
            cache_root: std::env::var("CACHE_DIR").ok().map(PathBuf::from),
            cache_thumbnails: std::env::var("THUMBNAIL_CACHE_DIR")
                .ok()
                .map(PathBuf::from),
        }
    }
}
