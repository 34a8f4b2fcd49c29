mod cli;

use refresharr::{
    config,
    hunter::Hunter,
    state::{reset_interval, CategoryStores},
};
use refresharr_common::{MediaKind, WorkCategory};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::time::SystemTime;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose || config::debug_mode_from_env() {
            "refresharr=debug,refresharr_common=debug".to_string()
        } else {
            "refresharr=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Run => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run(cli.config.as_deref()))
        }
        Commands::Once => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_once(cli.config.as_deref()))
        }
        Commands::Status => status(cli.config.as_deref()),
        Commands::Reset { kind } => reset(cli.config.as_deref(), kind.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("refresharr {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    config::require_targets(&config)?;
    config::log_configuration(&config);

    let reload_path = config::resolve_config_path(config_path);
    let mut hunter = Hunter::new(config);
    hunter.run(reload_path.as_deref()).await
}

async fn run_once(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    config::require_targets(&config)?;
    config::log_configuration(&config);

    let mut hunter = Hunter::new(config);
    let report = hunter.run_cycle().await?;
    report.log();

    println!("Searched {} item(s) this cycle", report.total());
    if let Some(error) = report.config_error {
        anyhow::bail!("{}", error);
    }
    Ok(())
}

fn status(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let hours = config.hunt.state_reset_interval_hours;
    let now = SystemTime::now();

    println!("State directory: {}", config.state.dir.display());
    for kind in MediaKind::ALL {
        let enabled = if config.arr(kind).is_some() {
            "enabled"
        } else {
            "not configured"
        };
        println!("\n{} ({})", kind.arr_name(), enabled);

        let Some(stores) = CategoryStores::load_existing(&config.state.dir, kind) else {
            println!("  No processed state yet");
            continue;
        };

        for category in WorkCategory::ALL {
            let store = stores.get(category);
            let modified = store
                .modified()
                .map(|t| {
                    chrono::DateTime::<chrono::Local>::from(t)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                })
                .unwrap_or_else(|_| "unknown".to_string());
            println!(
                "  {:<8} {:>6} processed, last modified {}",
                category,
                store.len(),
                modified
            );
        }

        match stores.time_until_reset(now, hours) {
            Some(remaining) => println!(
                "  Reset in approximately {} minutes",
                remaining.as_secs() / 60
            ),
            None => println!("  Reset disabled"),
        }
    }

    if reset_interval(hours).is_some() {
        println!("\nReset interval: {} hours", hours);
    }
    Ok(())
}

fn reset(config_path: Option<&Path>, kind: Option<&str>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let kinds = match kind {
        Some(kind) => vec![kind.parse::<MediaKind>()?],
        None => MediaKind::ALL.to_vec(),
    };

    for kind in kinds {
        let mut stores = CategoryStores::open(&config.state.dir, kind);
        stores
            .clear()
            .with_context(|| format!("Failed to clear processed {} state", kind))?;
        println!("Cleared processed {} state", kind);
    }
    Ok(())
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    match config::resolve_config_path(config_path) {
        Some(path) => {
            let config = config::load_config(&path)?;
            config.hunt.hunt_mode()?;
            println!("Configuration is valid: {}", path.display());
            for kind in config.enabled_kinds() {
                println!("  {} enabled", kind.arr_name());
            }
            Ok(())
        }
        None => {
            println!("No configuration file found; defaults and environment variables will be used");
            Ok(())
        }
    }
}
