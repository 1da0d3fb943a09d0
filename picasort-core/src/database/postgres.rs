use std::{fmt, path::Path};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use tracing::{debug, info, warn};

use crate::database::REQUIRED_EXTENSIONS;
use crate::error::{CoreError, Result};

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
    pub min_idle: u32,
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
    min_connections: u32,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(num_cpus::get() as u32);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(2);

        let connect_options = Self::build_connect_options(connection_string)?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .idle_timeout(std::time::Duration::from_secs(600))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Database connection failed: {}",
                    e
                ))
            })?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            max_connections, min_connections
        );

        Ok(PostgresDatabase {
            pool,
            max_connections,
            min_connections,
        })
    }

    /// Create a PostgresDatabase from an existing pool (mainly for testing)
    pub fn from_pool(pool: PgPool) -> Self {
        PostgresDatabase {
            pool,
            max_connections: 10,
            min_connections: 2,
        }
    }

    fn build_connect_options(
        connection_string: &str,
    ) -> Result<PgConnectOptions> {
        let trimmed = connection_string.trim();

        let mut options = if trimmed.is_empty() {
            PgConnectOptions::new()
        } else {
            trimmed.parse::<PgConnectOptions>().map_err(|e| {
                CoreError::Internal(format!(
                    "Invalid PostgreSQL connection string: {}",
                    e
                ))
            })?
        };

        if let Ok(db_name) = std::env::var("DATABASE_NAME")
            && !db_name.is_empty()
        {
            options = options.database(&db_name);
        }

        if let Ok(user) = std::env::var("PGUSER")
            && !user.is_empty()
        {
            options = options.username(&user);
        }

        if let Ok(password) = std::env::var("PGPASSWORD")
            && !password.is_empty()
        {
            options = options.password(&password);
        }

        let mut using_socket = false;

        if let Ok(host) = std::env::var("PGHOST") {
            if !host.is_empty() {
                if host.starts_with('/') {
                    options = options.socket(Path::new(&host));
                    using_socket = true;
                    debug!("Using PostgreSQL socket from PGHOST at {}", host);
                } else {
                    options = options.host(&host);
                    debug!("Using PostgreSQL host from PGHOST: {}", host);
                }
            }
        } else if let Ok(socket_dir) = std::env::var("PG_SOCKET_DIR")
            && !socket_dir.is_empty()
        {
            options = options.socket(Path::new(&socket_dir));
            using_socket = true;
            debug!(
                "Using PostgreSQL socket from PG_SOCKET_DIR at {}",
                socket_dir
            );
        }

        if let Ok(port) = std::env::var("PGPORT")
            && let Ok(port) = port.parse::<u16>()
        {
            options = options.port(port);
        }

        if using_socket && std::env::var("PGSSLMODE").is_err() {
            options = options.ssl_mode(PgSslMode::Disable);
        }

        Ok(options)
    }

    /// Get a reference to the connection pool for use in extension modules
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get connection pool statistics for monitoring
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.max_connections,
            min_idle: self.min_connections,
        }
    }

    /// Preflight checks for schema privileges and required extensions.
    ///
    /// Surfaces clear, actionable errors (GRANTs/CREATE EXTENSION) instead
    /// of a generic "permission denied" the first time the indexer touches
    /// the database. Read-only: never mutates server state.
    pub async fn preflight(&self) -> Result<()> {
        let has_usage: bool = sqlx::query_scalar(
            "SELECT has_schema_privilege(current_user, 'public', 'USAGE')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Privilege preflight failed: {}", e))
        })?;

        let has_create: bool = sqlx::query_scalar(
            "SELECT has_schema_privilege(current_user, 'public', 'CREATE')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Privilege preflight failed: {}", e))
        })?;

        let mut missing_exts: Vec<&str> = Vec::new();
        for extension in REQUIRED_EXTENSIONS {
            let installed: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM pg_extension WHERE extname = $1)",
            )
            .bind(extension)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Extension check ({}) failed: {}",
                    extension, e
                ))
            })?;
            if !installed {
                missing_exts.push(extension);
            }
        }

        let (database, owner): (String, String) = sqlx::query_as(
            "SELECT current_database(), pg_get_userbyid(datdba) \
             FROM pg_database WHERE datname = current_database()",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Database owner lookup failed: {}", e))
        })?;

        let current_user: String = sqlx::query_scalar("SELECT current_user")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Current user lookup failed: {}",
                    e
                ))
            })?;

        let is_superuser: bool = sqlx::query_scalar(
            "SELECT rolsuper FROM pg_roles WHERE rolname = current_user",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Role check failed: {}", e))
        })?;
        let can_create_extension = current_user == owner || is_superuser;

        let mut problems: Vec<String> = Vec::new();
        if !has_usage {
            problems.push(format!(
                "Role '{current_user}' lacks USAGE on schema public."
            ));
        }
        if !has_create {
            problems.push(format!(
                "Role '{current_user}' lacks CREATE on schema public."
            ));
        }
        if !missing_exts.is_empty() && !can_create_extension {
            problems.push(format!(
                "Missing extensions ({}) and role '{current_user}' cannot CREATE EXTENSION; database owner is '{owner}'",
                missing_exts.join(", ")
            ));
        }

        if !problems.is_empty() {
            let grants = format!(
                r#"Recommended fixes (run as a superuser/DB owner):
                GRANT USAGE, CREATE ON SCHEMA public TO {current_user};

                -- If extensions are missing, install them into {database}
                -- (requires superuser or DB owner '{owner}'):
                CREATE EXTENSION IF NOT EXISTS postgis;
                CREATE EXTENSION IF NOT EXISTS vector;
                "#
            );

            return Err(CoreError::Internal(format!(
                "Database preflight failed:\n- {}\n\n{}",
                problems.join("\n- "),
                grants
            )));
        }

        if !missing_exts.is_empty() && can_create_extension {
            warn!(
                missing = %missing_exts.join(", "),
                owner = %owner,
                "Required extensions missing; run `picasort-init db bootstrap` to install them"
            );
        }

        Ok(())
    }
}
