//! # Picasort Core
//!
//! Core library for Picasort, providing image metadata extraction, content
//! hashing, thumbnail generation, and the PostgreSQL layer shared by the
//! Picasort tooling.
//!
//! ## Overview
//!
//! - **Metadata**: EXIF descriptor and GPS extraction for indexed images
//! - **Hashing**: streaming SHA-256 digests used as stable image identities
//! - **Thumbnails**: orientation-aware, bounded thumbnail generation
//! - **Database**: connection pooling, preflight checks, and the one-shot
//!   bootstrap routine that provisions the Picasort role, database, and
//!   extensions
//!
//! ## Feature Flags
//!
//! - `database`: enables the PostgreSQL layer (SQLx support)

/// Database pool, preflight checks, and the bootstrap routine
#[cfg(feature = "database")]
pub mod database;

/// Error types shared across the crate
pub mod error;

/// Streaming content hashing
pub mod hash;

/// EXIF metadata extraction (descriptor and GPS block)
pub mod metadata;

/// Thumbnail generation
pub mod thumbnail;

pub use error::{CoreError, Result};
