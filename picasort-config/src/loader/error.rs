use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    ConfigFileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigFileParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to read secret file {path}: {source}")]
    SecretFileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid database URL: {source}")]
    InvalidDatabaseUrl { source: url::ParseError },

    #[error("invalid database username: {username}")]
    InvalidDatabaseUsername { username: String },

    #[error("database password could not be applied to the URL")]
    InvalidDatabasePassword,
}
