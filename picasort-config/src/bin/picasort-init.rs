use std::{collections::HashSet, fs, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Confirm, console::Term};
use picasort_config::{
    cli::{
        self, BootstrapOptions, CheckOptions, InitOptions, PreflightOptions,
        RotateTarget,
        db::{run_db_bootstrap, run_db_preflight},
    },
    constants::MANAGED_KEYS,
    env_writer::{merge_env_contents, read_env_map, write_env_atomically},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "picasort-init", about = "Picasort configuration bootstrapper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate or refresh .env
    Init {
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        #[arg(long)]
        non_interactive: bool,
        #[arg(long, value_enum, default_value = "none")]
        rotate: RotateArg,
        #[arg(long)]
        force: bool,
        /// Print the generated key/value pairs without writing .env
        #[arg(long)]
        print_only: bool,
    },
    /// Validate configuration and connectivity
    Check {
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Database helpers
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Provision the Picasort role, database, and extensions
    Bootstrap {
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        database: Option<String>,
        /// Admin connection URL (defaults to DATABASE_URL_ADMIN)
        #[arg(long)]
        admin_url: Option<String>,
    },
    /// Run read-only database preflight checks
    Preflight {
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RotateArg {
    None,
    Db,
}

impl From<RotateArg> for RotateTarget {
    fn from(val: RotateArg) -> Self {
        match val {
            RotateArg::None => RotateTarget::None,
            RotateArg::Db => RotateTarget::Db,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init {
            env_file,
            non_interactive,
            rotate,
            force,
            print_only,
        } => {
            let opts = InitOptions {
                env_path: env_file,
                non_interactive,
                rotate: rotate.into(),
                force,
            };
            let auto_confirm =
                std::env::var("PICASORT_INIT_AUTO_CONFIRM").is_ok();

            let outcome = cli::gen_init_merge_env(&opts)?;

            if print_only {
                for (key, value) in &outcome.kv {
                    println!("{key}={value}");
                }
                return Ok(());
            }

            let managed: HashSet<String> =
                MANAGED_KEYS.iter().map(|s: &&str| s.to_string()).collect();
            let existing_raw =
                fs::read_to_string(&opts.env_path).unwrap_or_default();
            let merged =
                merge_env_contents(&existing_raw, &outcome.kv, &managed);

            // Show a diff and ask for confirmation in interactive modes.
            if !non_interactive && !auto_confirm {
                let before_map =
                    read_env_map(&opts.env_path).unwrap_or_default();
                let after_map: std::collections::HashMap<String, String> =
                    outcome.kv.iter().cloned().collect();

                let mut additions = Vec::new();
                let mut updates = Vec::new();

                for key in MANAGED_KEYS {
                    let key = *key;
                    let before = before_map.get(key);
                    let after = after_map.get(key);
                    match (before, after) {
                        (None, Some(new)) => additions.push((key, new.clone())),
                        (Some(old), Some(new)) if old != new => {
                            updates.push((key, old.clone(), new.clone()))
                        }
                        _ => {}
                    }
                }

                if !additions.is_empty() || !updates.is_empty() {
                    println!();
                    println!(
                        "Proposed changes to {}:",
                        opts.env_path.display()
                    );

                    if !additions.is_empty() {
                        println!();
                        println!("  Added managed keys:");
                        for (k, v) in &additions {
                            println!("    + {k}={v}");
                        }
                    }
                    if !updates.is_empty() {
                        println!();
                        println!("  Updated managed keys:");
                        for (k, old, new) in &updates {
                            println!("    ~ {k}: {old} -> {new}");
                        }
                    }

                    println!();
                    let confirmed = Confirm::new()
                        .with_prompt("Confirm and write .env?")
                        .default(true)
                        .interact_on(&Term::stderr())?;
                    if !confirmed {
                        println!("Aborted; .env was not modified.");
                        return Ok(());
                    }
                } else {
                    println!(
                        "No changes to managed keys; .env will remain unchanged."
                    );
                }
            }

            write_env_atomically(&opts.env_path, &merged)?;

            println!(
                "Wrote {} ({} managed keys, {} rotated)",
                opts.env_path.display(),
                outcome.kv.len(),
                outcome.rotated_keys.len(),
            );
            if !outcome.rotated_keys.is_empty() {
                println!("Rotated: {}", outcome.rotated_keys.join(", "));
            }
        }
        Command::Check { env_file, config } => {
            let opts = CheckOptions {
                config_path: config,
                env_file: Some(env_file),
            };
            cli::run_config_check(&opts).await?;
        }
        Command::Db { action } => match action {
            DbAction::Bootstrap {
                env_file,
                role,
                database,
                admin_url,
            } => {
                let opts = BootstrapOptions {
                    env_file,
                    role,
                    database,
                    admin_url,
                };
                run_db_bootstrap(&opts).await?;
            }
            DbAction::Preflight { env_file, config } => {
                let opts = PreflightOptions {
                    env_file,
                    config_path: config,
                };
                run_db_preflight(&opts).await?;
            }
        },
    }

    Ok(())
}
