use crate::selection::Quota;
use refresharr_common::{HuntMode, MediaKind, SelectionOrder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub sonarr: Option<ArrConfig>,

    #[serde(default)]
    pub radarr: Option<ArrConfig>,

    #[serde(default)]
    pub hunt: HuntConfig,

    #[serde(default)]
    pub state: StateConfig,
}

impl Config {
    /// Connection settings for `kind`, if configured and enabled
    pub fn arr(&self, kind: MediaKind) -> Option<&ArrConfig> {
        let arr = match kind {
            MediaKind::Series => self.sonarr.as_ref(),
            MediaKind::Movies => self.radarr.as_ref(),
        };
        arr.filter(|a| a.enabled)
    }

    pub fn enabled_kinds(&self) -> Vec<MediaKind> {
        MediaKind::ALL
            .into_iter()
            .filter(|kind| self.arr(*kind).is_some())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ArrConfig {
    pub url: String,

    pub api_key: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ArrConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            enabled: true,
            timeout_secs: default_timeout(),
        }
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let count = self.api_key.chars().count();
        if count <= 4 {
            return "****".to_string();
        }
        let tail: String = self.api_key.chars().skip(count - 4).collect();
        format!("****{}", tail)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HuntConfig {
    /// "missing", "upgrade" or "both". Kept as text so a typo is reported
    /// each cycle instead of refusing to start.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Skip unmonitored shows, episodes and movies
    #[serde(default = "default_true")]
    pub monitored_only: bool,

    /// Visit candidates and pages in random order
    #[serde(default = "default_true")]
    pub random_selection: bool,

    /// Shows (or movies) with missing items to search per cycle; 0 = no cap
    #[serde(default = "default_max_missing")]
    pub max_missing: i64,

    /// Cutoff-unmet episodes (or movies) to search per cycle; 0 = no cap
    #[serde(default = "default_max_upgrades")]
    pub max_upgrades: i64,

    #[serde(default = "default_sleep_duration")]
    pub sleep_duration_secs: u64,

    /// Clear the processed stores after this many hours; 0 or less disables
    #[serde(default = "default_reset_interval")]
    pub state_reset_interval_hours: i64,

    /// Wait between an accepted refresh and the search
    #[serde(default = "default_refresh_delay")]
    pub refresh_delay_secs: u64,

    /// Wait after a rejected refresh or search
    #[serde(default = "default_failure_delay")]
    pub failure_delay_secs: u64,

    /// Upgrade-store bound applied after each cycle in "both" mode
    #[serde(default = "default_combined_retention")]
    pub combined_mode_retention: usize,
}

impl HuntConfig {
    pub fn hunt_mode(&self) -> refresharr_common::Result<HuntMode> {
        self.mode.parse()
    }

    pub fn order(&self) -> SelectionOrder {
        SelectionOrder::from_random_flag(self.random_selection)
    }

    pub fn missing_quota(&self) -> Quota {
        Quota::from_config(self.max_missing)
    }

    pub fn upgrade_quota(&self) -> Quota {
        Quota::from_config(self.max_upgrades)
    }

    pub fn sleep_duration(&self) -> Duration {
        Duration::from_secs(self.sleep_duration_secs)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_secs(self.failure_delay_secs)
    }
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            monitored_only: true,
            random_selection: true,
            max_missing: default_max_missing(),
            max_upgrades: default_max_upgrades(),
            sleep_duration_secs: default_sleep_duration(),
            state_reset_interval_hours: default_reset_interval(),
            refresh_delay_secs: default_refresh_delay(),
            failure_delay_secs: default_failure_delay(),
            combined_mode_retention: default_combined_retention(),
        }
    }
}

fn default_mode() -> String {
    "both".to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_missing() -> i64 {
    1
}
fn default_max_upgrades() -> i64 {
    5
}
fn default_sleep_duration() -> u64 {
    900
}
fn default_reset_interval() -> i64 {
    168
}
fn default_refresh_delay() -> u64 {
    5
}
fn default_failure_delay() -> u64 {
    10
}
fn default_combined_retention() -> usize {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StateConfig {
    /// Directory holding `<kind>/processed_<category>.txt`
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
        }
    }
}
