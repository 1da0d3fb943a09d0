//! One-shot provisioning of the Picasort role, database, and extensions.
//!
//! Every step is guarded by an existence probe, so re-running the routine
//! against an already-provisioned server is a no-op. Any statement failure
//! aborts immediately with the driver error; there is no rollback of the
//! steps already applied.

use sqlx::{Connection, PgConnection};
use tracing::info;
use url::Url;

use crate::error::{CoreError, Result};

/// Inputs of a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    /// Application role to create (LOGIN, owns the database).
    pub role: String,
    /// Database to create, owned by `role`.
    pub database: String,
    /// Password installed on the role when it is first created.
    pub password: String,
    /// Extensions enabled on the target database.
    pub extensions: Vec<String>,
}

impl BootstrapPlan {
    pub fn new(role: &str, database: &str, password: &str) -> Self {
        BootstrapPlan {
            role: role.to_string(),
            database: database.to_string(),
            password: password.to_string(),
            extensions: super::REQUIRED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// What a bootstrap run actually changed. All-false means the server was
/// already fully provisioned.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub role_created: bool,
    pub database_created: bool,
    pub extensions_installed: Vec<String>,
}

impl BootstrapReport {
    pub fn is_noop(&self) -> bool {
        !self.role_created
            && !self.database_created
            && self.extensions_installed.is_empty()
    }
}

/// Run the bootstrap routine against `admin_url` (a connection to the
/// maintenance database as a role allowed to create roles and databases).
pub async fn run(
    admin_url: &str,
    plan: &BootstrapPlan,
) -> Result<BootstrapReport> {
    let mut admin = PgConnection::connect(admin_url).await?;
    let mut report = BootstrapReport::default();

    report.role_created =
        ensure_role(&mut admin, &plan.role, &plan.password).await?;
    report.database_created =
        ensure_database(&mut admin, &plan.database, &plan.role).await?;

    sqlx::query(&grant_privileges_sql(&plan.database, &plan.role))
        .execute(&mut admin)
        .await?;
    admin.close().await?;

    // Extensions are per-database; they need a connection to the target.
    let target_url = with_database(admin_url, &plan.database)?;
    let mut target = PgConnection::connect(&target_url).await?;
    for extension in &plan.extensions {
        if ensure_extension(&mut target, extension).await? {
            report.extensions_installed.push(extension.clone());
        }
    }
    target.close().await?;

    if report.is_noop() {
        info!(
            role = %plan.role,
            database = %plan.database,
            "server already provisioned, nothing to do"
        );
    } else {
        info!(
            role = %plan.role,
            database = %plan.database,
            role_created = report.role_created,
            database_created = report.database_created,
            extensions = %report.extensions_installed.join(", "),
            "bootstrap applied"
        );
    }

    Ok(report)
}

/// Create the role if absent. Returns whether it was created.
async fn ensure_role(
    conn: &mut PgConnection,
    role: &str,
    password: &str,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pg_roles WHERE rolname = $1)",
    )
    .bind(role)
    .fetch_one(&mut *conn)
    .await?;
    if exists {
        return Ok(false);
    }
    sqlx::query(&create_role_sql(role, password))
        .execute(conn)
        .await?;
    Ok(true)
}

/// Create the database if absent. Returns whether it was created.
///
/// CREATE DATABASE has no IF NOT EXISTS form, so the probe is what keeps
/// repeated runs from failing here.
async fn ensure_database(
    conn: &mut PgConnection,
    database: &str,
    owner: &str,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1)",
    )
    .bind(database)
    .fetch_one(&mut *conn)
    .await?;
    if exists {
        return Ok(false);
    }
    // CREATE DATABASE cannot run inside a transaction block; a plain
    // execute on a single connection stays autocommit.
    sqlx::query(&create_database_sql(database, owner))
        .execute(conn)
        .await?;
    Ok(true)
}

/// Enable the extension if absent. Returns whether it was missing before.
async fn ensure_extension(
    conn: &mut PgConnection,
    extension: &str,
) -> Result<bool> {
    let installed: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pg_extension WHERE extname = $1)",
    )
    .bind(extension)
    .fetch_one(&mut *conn)
    .await?;
    sqlx::query(&create_extension_sql(extension))
        .execute(conn)
        .await?;
    Ok(!installed)
}

// CREATE ROLE / CREATE DATABASE take no bind parameters, so identifiers and
// the password literal are quoted by hand.

fn create_role_sql(role: &str, password: &str) -> String {
    format!(
        "CREATE ROLE {} WITH LOGIN PASSWORD {}",
        quote_ident(role),
        quote_literal(password)
    )
}

fn create_database_sql(database: &str, owner: &str) -> String {
    format!(
        "CREATE DATABASE {} OWNER {}",
        quote_ident(database),
        quote_ident(owner)
    )
}

fn grant_privileges_sql(database: &str, role: &str) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON DATABASE {} TO {}",
        quote_ident(database),
        quote_ident(role)
    )
}

fn create_extension_sql(extension: &str) -> String {
    format!("CREATE EXTENSION IF NOT EXISTS {}", quote_ident(extension))
}

/// Double-quote an identifier, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a literal, doubling embedded quotes.
fn quote_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

/// The admin URL with its database path swapped for `database`, used to
/// reach the freshly created database for `CREATE EXTENSION`.
fn with_database(admin_url: &str, database: &str) -> Result<String> {
    let mut url = Url::parse(admin_url).map_err(|e| {
        CoreError::Internal(format!("Invalid admin database URL: {}", e))
    })?;
    url.set_path(database);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_identifiers() {
        assert_eq!(quote_ident("picasort"), "\"picasort\"");
    }

    #[test]
    fn doubles_embedded_identifier_quotes() {
        assert_eq!(quote_ident("pica\"sort"), "\"pica\"\"sort\"");
    }

    #[test]
    fn escapes_password_literals() {
        assert_eq!(quote_literal("s3cr'et"), "'s3cr''et'");
    }

    #[test]
    fn role_statement_carries_login_and_password() {
        assert_eq!(
            create_role_sql("picasort", "hunter2"),
            "CREATE ROLE \"picasort\" WITH LOGIN PASSWORD 'hunter2'"
        );
    }

    #[test]
    fn database_statement_sets_owner() {
        assert_eq!(
            create_database_sql("picasort", "picasort"),
            "CREATE DATABASE \"picasort\" OWNER \"picasort\""
        );
    }

    #[test]
    fn extension_statement_is_guarded() {
        assert_eq!(
            create_extension_sql("postgis"),
            "CREATE EXTENSION IF NOT EXISTS \"postgis\""
        );
    }

    #[test]
    fn swaps_database_in_admin_url() {
        let swapped = with_database(
            "postgresql://postgres:pw@localhost:5432/postgres",
            "picasort",
        )
        .unwrap();
        assert_eq!(
            swapped,
            "postgresql://postgres:pw@localhost:5432/picasort"
        );
    }

    #[test]
    fn rejects_invalid_admin_url() {
        assert!(with_database("not a url", "picasort").is_err());
    }

    #[test]
    fn default_plan_carries_both_extensions() {
        let plan = BootstrapPlan::new("picasort", "picasort", "pw");
        assert_eq!(plan.extensions, vec!["postgis", "vector"]);
    }

    #[test]
    fn fresh_report_is_a_noop() {
        assert!(BootstrapReport::default().is_noop());
        let report = BootstrapReport {
            role_created: true,
            ..BootstrapReport::default()
        };
        assert!(!report.is_noop());
    }
}
