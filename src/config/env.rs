//! Environment variable overrides, applied on top of the config file.
//!
//! The names match the ones used by container deployments, so an existing
//! `docker run -e HUNT_MODE=...` setup keeps working without a config file.

use super::{ArrConfig, Config};
use std::path::PathBuf;
use std::str::FromStr;

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary lookup (the environment, in production)
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    override_arr(&mut config.sonarr, &lookup, "API_URL", "API_KEY", "API_TIMEOUT");
    override_arr(
        &mut config.radarr,
        &lookup,
        "RADARR_API_URL",
        "RADARR_API_KEY",
        "RADARR_API_TIMEOUT",
    );

    let hunt = &mut config.hunt;
    if let Some(mode) = lookup("HUNT_MODE") {
        hunt.mode = mode;
    }
    override_parsed(&lookup, "HUNT_MISSING_SHOWS", &mut hunt.max_missing);
    override_parsed(&lookup, "HUNT_UPGRADE_EPISODES", &mut hunt.max_upgrades);
    override_parsed(&lookup, "SLEEP_DURATION", &mut hunt.sleep_duration_secs);
    override_parsed(
        &lookup,
        "STATE_RESET_INTERVAL_HOURS",
        &mut hunt.state_reset_interval_hours,
    );
    override_flag(&lookup, "RANDOM_SELECTION", &mut hunt.random_selection);
    override_flag(&lookup, "MONITORED_ONLY", &mut hunt.monitored_only);

    if let Some(dir) = lookup("STATE_DIR") {
        config.state.dir = PathBuf::from(dir);
    }
}

/// `DEBUG_MODE=true` turns on debug logging
pub fn debug_mode_from_env() -> bool {
    std::env::var("DEBUG_MODE")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn override_arr<F>(
    arr: &mut Option<ArrConfig>,
    lookup: &F,
    url_var: &str,
    key_var: &str,
    timeout_var: &str,
) where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup(url_var);
    let key = lookup(key_var);

    if arr.is_none() && url.is_some() {
        *arr = Some(ArrConfig::new(String::new(), String::new()));
    }
    let Some(arr) = arr.as_mut() else {
        return;
    };

    if let Some(url) = url {
        arr.url = url;
    }
    if let Some(key) = key {
        arr.api_key = key;
    }
    override_parsed(lookup, timeout_var, &mut arr.timeout_secs);
}

fn override_parsed<F, T>(lookup: &F, name: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(
            "Invalid {} value {:?}, using {}",
            name,
            raw,
            target
        ),
    }
}

fn override_flag<F>(lookup: &F, name: &str, target: &mut bool)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *target = raw.trim().eq_ignore_ascii_case("true");
    }
}
