mod env;
mod types;

pub use env::{apply_env_overrides, apply_overrides_from, debug_mode_from_env};
pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_PATHS: [&str; 4] = [
    "./refresharr.toml",
    "./config.toml",
    "~/.config/refresharr/config.toml",
    "/etc/refresharr/config.toml",
];

/// Parse a TOML config file and apply environment overrides
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// The config file to use: `custom_path`, or the first default that exists
pub fn resolve_config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = custom_path {
        return Some(path.to_path_buf());
    }

    DEFAULT_PATHS.iter().find_map(|path_str| {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());
        path.exists().then(|| path.to_path_buf())
    })
}

/// Load config from the given or default locations, or build it from
/// defaults and the environment when no file exists
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = resolve_config_path(custom_path) {
        return load_config(&path);
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    for (name, arr) in [("sonarr", &config.sonarr), ("radarr", &config.radarr)] {
        let Some(arr) = arr else {
            continue;
        };
        if !arr.enabled {
            continue;
        }
        if arr.url.trim().is_empty() {
            anyhow::bail!("{} is enabled but has no URL", name);
        }
        if !(arr.url.starts_with("http://") || arr.url.starts_with("https://")) {
            anyhow::bail!("{} URL must start with http:// or https://: {}", name, arr.url);
        }
        if arr.api_key.trim().is_empty() {
            anyhow::bail!("{} is enabled but has no API key", name);
        }
        if arr.timeout_secs == 0 {
            anyhow::bail!("{} timeout_secs cannot be 0", name);
        }
    }

    // An unknown mode is reported per cycle, not here; warn early anyway
    if let Err(e) = config.hunt.hunt_mode() {
        tracing::warn!("{}", e);
    }

    Ok(())
}

/// Fail unless at least one *arr is enabled
pub fn require_targets(config: &Config) -> Result<()> {
    if config.enabled_kinds().is_empty() {
        anyhow::bail!(
            "No Sonarr or Radarr instance is configured; add a [sonarr] or [radarr] section or set API_URL/API_KEY"
        );
    }
    Ok(())
}

/// Log the effective configuration once at startup
pub fn log_configuration(config: &Config) {
    for kind in refresharr_common::MediaKind::ALL {
        match config.arr(kind) {
            Some(arr) => {
                tracing::info!(
                    "{} API URL: {} (timeout {}s)",
                    kind.arr_name(),
                    arr.url,
                    arr.timeout_secs
                );
                tracing::debug!("{} API key: {}", kind.arr_name(), arr.masked_api_key());
            }
            None => tracing::info!("{} is not configured", kind.arr_name()),
        }
    }

    let hunt = &config.hunt;
    tracing::info!(
        "Configuration: HUNT_MODE={}, MAX_MISSING={}, MAX_UPGRADES={}, SLEEP_DURATION={}s",
        hunt.mode,
        hunt.max_missing,
        hunt.max_upgrades,
        hunt.sleep_duration_secs
    );
    tracing::info!(
        "Configuration: MONITORED_ONLY={}, RANDOM_SELECTION={}, STATE_RESET_INTERVAL_HOURS={}",
        hunt.monitored_only,
        hunt.random_selection,
        hunt.state_reset_interval_hours
    );
    tracing::info!("State directory: {:?}", config.state.dir);
}
