use crate::cli::RotateTarget;

use std::path::PathBuf;

#[derive(Debug, Clone)]
/// Options controlling config initialization.
pub struct InitOptions {
    pub env_path: PathBuf,
    pub non_interactive: bool,
    pub rotate: RotateTarget,
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            env_path: PathBuf::from(".env"),
            non_interactive: false,
            rotate: RotateTarget::None,
            force: false,
        }
    }
}

impl InitOptions {
    pub fn new_non_interactive(env_path: PathBuf) -> Self {
        Self {
            env_path,
            non_interactive: true,
            rotate: RotateTarget::None,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Options for configuration validation (`picasort-init check`).
pub struct CheckOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
/// Options for `picasort-init db bootstrap`.
pub struct BootstrapOptions {
    pub env_file: PathBuf,
    /// Application role; defaults to `DATABASE_APP_USER` then `picasort`.
    pub role: Option<String>,
    /// Database name; defaults to `DATABASE_NAME` then `picasort`.
    pub database: Option<String>,
    /// Admin connection URL; defaults to `DATABASE_URL_ADMIN` or is composed
    /// from `DATABASE_HOST`/`DATABASE_PORT`/`DATABASE_ADMIN_USER`.
    pub admin_url: Option<String>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            role: None,
            database: None,
            admin_url: None,
        }
    }
}

#[derive(Debug, Clone)]
/// Options for `picasort-init db preflight`.
pub struct PreflightOptions {
    pub env_file: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            config_path: None,
        }
    }
}
