//! Database subcommands: one-shot provisioning and read-only preflight.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;
use url::Url;

use picasort_core::database::{
    BootstrapPlan, BootstrapReport, PostgresDatabase, bootstrap,
};

use crate::{
    cli::options::{BootstrapOptions, PreflightOptions},
    constants::{
        DEFAULT_ADMIN_DATABASE, DEFAULT_ADMIN_USER, DEFAULT_APP_PASSWORD_FILE,
        DEFAULT_APP_USER, DEFAULT_DATABASE_NAME,
    },
    env_writer::read_env_map,
    loader::{ConfigLoader, ConfigLoaderOptions, resolve_effective_database_url},
};

pub async fn run_db_bootstrap(opts: &BootstrapOptions) -> Result<()> {
    let env_map = read_env_map(&opts.env_file)?;

    let role = opts
        .role
        .clone()
        .or_else(|| lookup(&env_map, "DATABASE_APP_USER"))
        .unwrap_or_else(|| DEFAULT_APP_USER.to_string());
    let database = opts
        .database
        .clone()
        .or_else(|| lookup(&env_map, "DATABASE_NAME"))
        .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

    let admin_url = resolve_admin_url(opts, &env_map)?;
    let password = resolve_app_password(&env_map)?;

    info!(role = %role, database = %database, "starting database bootstrap");
    let plan = BootstrapPlan::new(&role, &database, &password);
    let report = bootstrap::run(&admin_url, &plan)
        .await
        .context("database bootstrap failed")?;

    print_report(&role, &database, &report);
    Ok(())
}

pub async fn run_db_preflight(opts: &PreflightOptions) -> Result<()> {
    let loader = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: opts.config_path.clone(),
        env_file: Some(opts.env_file.clone()),
    });
    let load = loader.load()?;

    let Some(url) = resolve_effective_database_url(&load.config) else {
        bail!(
            "no database configuration found; run `picasort-init init` first"
        );
    };

    let database = PostgresDatabase::new(&url).await?;
    database.preflight().await?;
    println!("[ok] database preflight passed");
    Ok(())
}

fn resolve_admin_url(
    opts: &BootstrapOptions,
    env_map: &HashMap<String, String>,
) -> Result<String> {
    if let Some(url) = opts
        .admin_url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(url);
    }
    if let Some(url) = std::env::var("DATABASE_URL_ADMIN")
        .ok()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(url);
    }
    if let Some(url) = lookup(env_map, "DATABASE_URL_ADMIN") {
        return Ok(url);
    }

    // Compose from parts, targeting the maintenance database: the
    // application database may not exist yet.
    let host = lookup(env_map, "DATABASE_HOST")
        .or_else(|| std::env::var("DATABASE_HOST").ok())
        .unwrap_or_else(|| "localhost".to_string());
    let port = lookup(env_map, "DATABASE_PORT")
        .or_else(|| std::env::var("DATABASE_PORT").ok())
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(5432);
    let admin_user = lookup(env_map, "DATABASE_ADMIN_USER")
        .or_else(|| std::env::var("DATABASE_ADMIN_USER").ok())
        .unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string());
    let admin_password = lookup(env_map, "DATABASE_ADMIN_PASSWORD")
        .or_else(|| std::env::var("DATABASE_ADMIN_PASSWORD").ok());

    let mut url = Url::parse(&format!(
        "postgresql://{host}:{port}/{DEFAULT_ADMIN_DATABASE}"
    ))
    .context("failed to compose admin database URL")?;
    url.set_username(&admin_user)
        .map_err(|_| anyhow::anyhow!("invalid admin username"))?;
    if let Some(password) = admin_password {
        url.set_password(Some(&password))
            .map_err(|_| anyhow::anyhow!("invalid admin password"))?;
    }
    Ok(url.to_string())
}

/// Application password, in the order the loader resolves it: process env,
/// explicit secret files, the conventional secret mount, then the env file.
fn resolve_app_password(env_map: &HashMap<String, String>) -> Result<String> {
    if let Some(password) = std::env::var("DATABASE_APP_PASSWORD")
        .ok()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(password);
    }

    for key in ["DATABASE_APP_PASSWORD_FILE", "DATABASE_PASSWORD_FILE"] {
        let path = std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| lookup(env_map, key));
        if let Some(path) = path
            && let Some(secret) = read_secret(Path::new(&path))?
        {
            return Ok(secret);
        }
    }

    let default_path = Path::new(DEFAULT_APP_PASSWORD_FILE);
    if default_path.exists()
        && let Some(secret) = read_secret(default_path)?
    {
        return Ok(secret);
    }

    if let Some(password) = lookup(env_map, "DATABASE_APP_PASSWORD") {
        return Ok(password);
    }

    bail!(
        "no application password configured; set DATABASE_APP_PASSWORD(_FILE) or run `picasort-init init`"
    )
}

fn read_secret(path: &Path) -> Result<Option<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read secret file {}", path.display()))?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn lookup(env_map: &HashMap<String, String>, key: &str) -> Option<String> {
    env_map
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn print_report(role: &str, database: &str, report: &BootstrapReport) {
    if report.is_noop() {
        println!(
            "Nothing to do: role '{role}' and database '{database}' already provisioned."
        );
        return;
    }

    if report.role_created {
        println!("Created role '{role}'.");
    } else {
        println!("Role '{role}' already exists.");
    }
    if report.database_created {
        println!("Created database '{database}' owned by '{role}'.");
    } else {
        println!("Database '{database}' already exists.");
    }
    for extension in &report.extensions_installed {
        println!("Installed extension '{extension}'.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_host_overrides() {
        for key in [
            "DATABASE_URL_ADMIN",
            "DATABASE_HOST",
            "DATABASE_PORT",
            "DATABASE_ADMIN_USER",
            "DATABASE_ADMIN_PASSWORD",
            "DATABASE_APP_PASSWORD",
            "DATABASE_APP_PASSWORD_FILE",
            "DATABASE_PASSWORD_FILE",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn composes_admin_url_from_env_map() {
        clear_host_overrides();
        let mut env_map = HashMap::new();
        env_map.insert("DATABASE_HOST".to_string(), "db".to_string());
        env_map.insert("DATABASE_PORT".to_string(), "5433".to_string());
        env_map
            .insert("DATABASE_ADMIN_USER".to_string(), "root".to_string());
        env_map.insert(
            "DATABASE_ADMIN_PASSWORD".to_string(),
            "pw".to_string(),
        );

        let opts = BootstrapOptions::default();
        let url = resolve_admin_url(&opts, &env_map).unwrap();
        assert_eq!(url, "postgresql://root:pw@db:5433/postgres");
    }

    #[test]
    fn explicit_admin_url_wins() {
        let opts = BootstrapOptions {
            admin_url: Some(
                "postgresql://postgres@127.0.0.1:5432/postgres".to_string(),
            ),
            ..BootstrapOptions::default()
        };
        let url = resolve_admin_url(&opts, &HashMap::new()).unwrap();
        assert_eq!(url, "postgresql://postgres@127.0.0.1:5432/postgres");
    }

    #[test]
    fn env_file_password_is_last_resort() {
        clear_host_overrides();
        let mut env_map = HashMap::new();
        env_map.insert(
            "DATABASE_APP_PASSWORD".to_string(),
            "from-env-file".to_string(),
        );
        let password = resolve_app_password(&env_map).unwrap();
        assert_eq!(password, "from-env-file");
    }

    #[test]
    fn missing_password_is_an_error() {
        clear_host_overrides();
        let err = resolve_app_password(&HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("no application password"));
    }
}
