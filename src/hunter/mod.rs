//! The hunt loop: one cycle per sleep interval, over every configured *arr.
//!
//! A cycle checks the processed stores for staleness, runs the missing
//! and/or upgrade hunt for each media kind, bounds the upgrade store in
//! "both" mode, and reports how much was searched. Remote failures only
//! skip the item, page or phase they hit; anything else aborts the cycle
//! and is returned to the caller.

mod movies;
mod report;
mod series;

pub use report::CycleReport;

use crate::arr::{create_transport, ArrTransport, RadarrApi, SonarrApi};
use crate::config::{self, Config, HuntConfig};
use crate::state::{reset_interval, CategoryStores, ProcessedStore, ResetOutcome};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use refresharr_common::{CommandId, HuntMode, MediaKind, WorkCategory};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Waits imposed around refresh and search commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After an accepted refresh, before searching
    pub refresh_delay: Duration,
    /// After a rejected refresh or search
    pub failure_delay: Duration,
}

impl From<&HuntConfig> for Pacing {
    fn from(hunt: &HuntConfig) -> Self {
        Self {
            refresh_delay: hunt.refresh_delay(),
            failure_delay: hunt.failure_delay(),
        }
    }
}

/// What the hunt workflows share for the duration of one phase
pub(crate) struct HuntContext<'a> {
    pub hunt: &'a HuntConfig,
    pub pacing: Pacing,
    pub rng: &'a mut StdRng,
}

enum Library {
    Series(SonarrApi),
    Movies(RadarrApi),
}

struct Target {
    kind: MediaKind,
    library: Library,
    stores: CategoryStores,
}

pub struct Hunter {
    config: Config,
    targets: Vec<Target>,
    rng: StdRng,
}

impl Hunter {
    /// Build a hunter talking HTTP to every enabled *arr in `config`
    pub fn new(config: Config) -> Self {
        let sonarr = config.arr(MediaKind::Series).map(create_transport);
        let radarr = config.arr(MediaKind::Movies).map(create_transport);
        Self::with_transports(config, sonarr, radarr)
    }

    /// Build a hunter over explicit transports; a `None` transport disables
    /// that media kind
    pub fn with_transports(
        config: Config,
        sonarr: Option<Arc<dyn ArrTransport>>,
        radarr: Option<Arc<dyn ArrTransport>>,
    ) -> Self {
        let mut targets = Vec::new();
        if let Some(transport) = sonarr {
            targets.push(Target {
                kind: MediaKind::Series,
                library: Library::Series(SonarrApi::new(transport)),
                stores: CategoryStores::open(&config.state.dir, MediaKind::Series),
            });
        }
        if let Some(transport) = radarr {
            targets.push(Target {
                kind: MediaKind::Movies,
                library: Library::Movies(RadarrApi::new(transport)),
                stores: CategoryStores::open(&config.state.dir, MediaKind::Movies),
            });
        }
        for kind in MediaKind::ALL {
            if !targets.iter().any(|t| t.kind == kind) {
                tracing::debug!("{} is not configured, skipping {}", kind.arr_name(), kind);
            }
        }

        Self {
            config,
            targets,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed random source (for reproducible selection)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Processed stores of `kind`, if that kind is configured
    pub fn stores(&self, kind: MediaKind) -> Option<&CategoryStores> {
        self.targets
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| &t.stores)
    }

    /// Replace the `[hunt]` settings used from the next cycle on
    pub fn set_hunt_config(&mut self, hunt: HuntConfig) {
        self.config.hunt = hunt;
    }

    /// Run cycles until interrupted.
    ///
    /// When `config_path` is given, the file is re-read before every cycle
    /// so hunt settings can be corrected without a restart.
    pub async fn run(&mut self, config_path: Option<&Path>) -> Result<()> {
        tracing::info!("=== Refresharr starting ===");

        loop {
            if let Some(path) = config_path {
                self.reload_config(path);
            }

            let cycle = tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Refresharr stopped by user.");
                    return Ok(());
                }
                result = self.run_cycle() => result,
            };

            match cycle {
                Ok(report) => report.log(),
                Err(e) => {
                    tracing::error!("Unexpected error during hunt cycle: {:#}", e);
                    return Err(e);
                }
            }

            let sleep = self.config.hunt.sleep_duration();
            tracing::info!(
                "Cycle complete. Waiting {} seconds before next cycle...",
                sleep.as_secs()
            );

            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Refresharr stopped by user.");
                    return Ok(());
                }
                _ = tokio::time::sleep(sleep) => {}
            }
        }
    }

    /// Run one cycle across all configured media kinds
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        self.check_state_reset(&mut report);

        let mode = match self.config.hunt.hunt_mode() {
            Ok(mode) => mode,
            Err(e) => {
                tracing::error!("{}", e);
                report.config_error = Some(e.to_string());
                return Ok(report);
            }
        };
        report.mode = Some(mode);

        let Self {
            config,
            targets,
            rng,
        } = self;
        let hunt = &config.hunt;

        for target in targets.iter_mut() {
            for &category in mode.categories() {
                let store = target.stores.get_mut(category);
                let mut ctx = HuntContext {
                    hunt,
                    pacing: Pacing::from(hunt),
                    rng: &mut *rng,
                };

                let searched = match (&target.library, category) {
                    (Library::Series(api), WorkCategory::Missing) => {
                        series::hunt_missing(api, store, &mut ctx).await
                    }
                    (Library::Series(api), WorkCategory::Upgrade) => {
                        series::hunt_upgrades(api, store, &mut ctx).await
                    }
                    (Library::Movies(api), WorkCategory::Missing) => {
                        movies::hunt_missing(api, store, &mut ctx).await
                    }
                    (Library::Movies(api), WorkCategory::Upgrade) => {
                        movies::hunt_upgrades(api, store, &mut ctx).await
                    }
                }
                .with_context(|| format!("{} {} hunt failed", target.kind, category))?;

                report.add(target.kind, category, searched);
            }

            if mode == HuntMode::Both {
                let upgrade = target.stores.get_mut(WorkCategory::Upgrade);
                if let Err(e) = upgrade.truncate(hunt.combined_mode_retention) {
                    tracing::error!("Failed to truncate processed {} upgrades: {}", target.kind, e);
                }
            }
        }

        self.log_time_until_reset();
        Ok(report)
    }

    fn check_state_reset(&mut self, report: &mut CycleReport) {
        let hours = self.config.hunt.state_reset_interval_hours;
        if reset_interval(hours).is_none() {
            tracing::info!(
                "State reset is disabled. Processed items will be remembered indefinitely."
            );
            return;
        }

        let now = SystemTime::now();
        for target in &mut self.targets {
            match target.stores.reset_if_stale(now, hours) {
                Ok(ResetOutcome::Reset) => report.resets.push(target.kind),
                Ok(_) => {}
                Err(e) => tracing::error!(
                    "Failed to reset processed {} state, retrying next cycle: {}",
                    target.kind,
                    e
                ),
            }
        }
    }

    fn log_time_until_reset(&self) {
        let hours = self.config.hunt.state_reset_interval_hours;
        let now = SystemTime::now();
        let remaining = self
            .targets
            .iter()
            .filter_map(|t| t.stores.time_until_reset(now, hours))
            .min();

        if let Some(remaining) = remaining {
            tracing::info!(
                "State reset will occur in approximately {} minutes.",
                remaining.as_secs() / 60
            );
        }
    }

    fn reload_config(&mut self, path: &Path) {
        match config::load_config(path) {
            Ok(reloaded) => {
                if reloaded.sonarr != self.config.sonarr
                    || reloaded.radarr != self.config.radarr
                    || reloaded.state != self.config.state
                {
                    tracing::warn!(
                        "Connection or state changes in {:?} take effect after a restart",
                        path
                    );
                }
                if reloaded.hunt != self.config.hunt {
                    tracing::info!("Reloaded hunt settings from {:?}", path);
                    self.config.hunt = reloaded.hunt;
                }
            }
            Err(e) => tracing::warn!(
                "Failed to reload config, keeping previous settings: {:#}",
                e
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionOutcome {
    Searched(CommandId),
    RefreshFailed,
    SearchFailed,
}

/// Refresh, wait for the refresh to settle, then search.
///
/// Both futures are lazy; `search` is only polled once `refresh` succeeded.
pub(crate) async fn refresh_then_search<R, S>(
    label: &str,
    pacing: &Pacing,
    refresh: R,
    search: S,
) -> refresharr_common::Result<ActionOutcome>
where
    R: Future<Output = refresharr_common::Result<CommandId>>,
    S: Future<Output = refresharr_common::Result<CommandId>>,
{
    tracing::info!(" - Refreshing {}...", label);
    match refresh.await {
        Ok(command) => tracing::info!(
            "Refresh command accepted (ID: {}). Waiting {}s...",
            command,
            pacing.refresh_delay.as_secs()
        ),
        Err(e) if e.is_transient() => {
            tracing::warn!("Refresh command failed for {}, skipping: {}", label, e);
            tokio::time::sleep(pacing.failure_delay).await;
            return Ok(ActionOutcome::RefreshFailed);
        }
        Err(e) => return Err(e),
    }
    tokio::time::sleep(pacing.refresh_delay).await;

    tracing::info!(" - Searching for {}...", label);
    match search.await {
        Ok(command) => {
            tracing::info!("Search command accepted (ID: {}).", command);
            Ok(ActionOutcome::Searched(command))
        }
        Err(e) if e.is_transient() => {
            tracing::warn!("Search command failed for {}: {}", label, e);
            tokio::time::sleep(pacing.failure_delay).await;
            Ok(ActionOutcome::SearchFailed)
        }
        Err(e) => Err(e),
    }
}

/// Record a searched item; a failed write is retried on a later cycle
pub(crate) fn mark_processed(store: &mut ProcessedStore, id: i64) {
    if let Err(e) = store.record(id) {
        tracing::error!(
            "Failed to record {} as processed, it may be searched again next cycle: {}",
            id,
            e
        );
    }
}
