//! Shared configuration library for Picasort.
//!
//! This crate centralizes `.env` generation/rotation, config loading and
//! validation, and the database provisioning helpers. The `picasort-init`
//! binary and any future Picasort service consume these utilities so there
//! is a single source of truth for config defaults, managed keys, and
//! validation rules.

pub mod cli;
pub mod constants;
pub mod env_writer;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::{
    CacheConfig, Config, ConfigMetadata, DatabaseConfig, MediaConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
