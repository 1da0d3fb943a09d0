//! PostgreSQL layer: connection pooling, preflight checks, and the one-shot
//! bootstrap routine.

pub mod bootstrap;
pub mod postgres;

pub use bootstrap::{BootstrapPlan, BootstrapReport};
pub use postgres::PostgresDatabase;

/// Extensions every Picasort database must carry: geospatial types for GPS
/// positions and vector similarity types for image embeddings.
pub const REQUIRED_EXTENSIONS: [&str; 2] = ["postgis", "vector"];
