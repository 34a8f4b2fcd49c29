use super::ProcessedStore;
use refresharr_common::{MediaKind, Result, WorkCategory};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Outcome of a staleness check on a pair of stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Reset interval is zero or negative
    Disabled,
    /// Neither store is old enough; `remaining` until the oldest one is
    Fresh { remaining: Duration },
    /// Both stores were cleared
    Reset,
}

/// Reset interval in seconds, or `None` when resetting is disabled
pub fn reset_interval(interval_hours: i64) -> Option<Duration> {
    if interval_hours <= 0 {
        None
    } else {
        Some(Duration::from_secs((interval_hours as u64).saturating_mul(3600)))
    }
}

/// The missing and upgrade stores of one media kind
pub struct CategoryStores {
    kind: MediaKind,
    missing: ProcessedStore,
    upgrade: ProcessedStore,
}

impl CategoryStores {
    /// Open (or create) `<state_dir>/<kind>/processed_<category>.txt`
    pub fn open(state_dir: &Path, kind: MediaKind) -> Self {
        Self {
            kind,
            missing: ProcessedStore::open(store_path(state_dir, kind, WorkCategory::Missing)),
            upgrade: ProcessedStore::open(store_path(state_dir, kind, WorkCategory::Upgrade)),
        }
    }

    /// Read-only view of the stores, or `None` when neither file exists.
    pub fn load_existing(state_dir: &Path, kind: MediaKind) -> Option<Self> {
        let missing = store_path(state_dir, kind, WorkCategory::Missing);
        let upgrade = store_path(state_dir, kind, WorkCategory::Upgrade);
        if !missing.exists() && !upgrade.exists() {
            return None;
        }

        Some(Self {
            kind,
            missing: ProcessedStore::load(missing),
            upgrade: ProcessedStore::load(upgrade),
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn get(&self, category: WorkCategory) -> &ProcessedStore {
        match category {
            WorkCategory::Missing => &self.missing,
            WorkCategory::Upgrade => &self.upgrade,
        }
    }

    pub fn get_mut(&mut self, category: WorkCategory) -> &mut ProcessedStore {
        match category {
            WorkCategory::Missing => &mut self.missing,
            WorkCategory::Upgrade => &mut self.upgrade,
        }
    }

    /// Clear both stores when either is at least `interval_hours` old.
    pub fn reset_if_stale(&mut self, now: SystemTime, interval_hours: i64) -> Result<ResetOutcome> {
        let Some(interval) = reset_interval(interval_hours) else {
            return Ok(ResetOutcome::Disabled);
        };

        let oldest = self.oldest_age(now);
        if oldest >= interval {
            tracing::info!(
                "Resetting processed {} state (older than {} hours)",
                self.kind,
                interval_hours
            );
            self.clear()?;
            return Ok(ResetOutcome::Reset);
        }

        Ok(ResetOutcome::Fresh {
            remaining: interval - oldest,
        })
    }

    /// Time until the next reset, or `None` when resetting is disabled.
    pub fn time_until_reset(&self, now: SystemTime, interval_hours: i64) -> Option<Duration> {
        let interval = reset_interval(interval_hours)?;
        Some(interval.saturating_sub(self.oldest_age(now)))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.missing.clear()?;
        self.upgrade.clear()
    }

    fn oldest_age(&self, now: SystemTime) -> Duration {
        self.missing.age(now).max(self.upgrade.age(now))
    }
}

pub fn store_path(state_dir: &Path, kind: MediaKind, category: WorkCategory) -> PathBuf {
    state_dir
        .join(kind.to_string())
        .join(format!("processed_{}.txt", category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn backdate(path: &Path, by: Duration) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    fn seeded(dir: &Path) -> CategoryStores {
        let mut stores = CategoryStores::open(dir, MediaKind::Series);
        stores.get_mut(WorkCategory::Missing).record(1).unwrap();
        stores.get_mut(WorkCategory::Upgrade).record(2).unwrap();
        stores
    }

    #[test]
    fn test_store_layout() {
        let path = store_path(Path::new("/state"), MediaKind::Movies, WorkCategory::Upgrade);
        assert_eq!(path, PathBuf::from("/state/movies/processed_upgrade.txt"));
    }

    #[test]
    fn test_load_existing_does_not_create_files() {
        let dir = tempdir().unwrap();
        assert!(CategoryStores::load_existing(dir.path(), MediaKind::Movies).is_none());
        assert!(!dir.path().join("movies").exists());

        seeded(dir.path());
        std::fs::remove_file(store_path(dir.path(), MediaKind::Series, WorkCategory::Upgrade))
            .unwrap();

        let stores = CategoryStores::load_existing(dir.path(), MediaKind::Series).unwrap();
        assert!(stores.get(WorkCategory::Missing).contains(1));
        assert!(stores.get(WorkCategory::Upgrade).is_empty());
        assert!(!store_path(dir.path(), MediaKind::Series, WorkCategory::Upgrade).exists());
    }

    #[test]
    fn test_stale_store_resets_both() {
        let dir = tempdir().unwrap();
        let mut stores = seeded(dir.path());
        backdate(stores.get(WorkCategory::Missing).path(), 25 * HOUR);

        let outcome = stores.reset_if_stale(SystemTime::now(), 24).unwrap();
        assert_eq!(outcome, ResetOutcome::Reset);
        assert!(stores.get(WorkCategory::Missing).is_empty());
        assert!(stores.get(WorkCategory::Upgrade).is_empty());
    }

    #[test]
    fn test_fresh_stores_untouched() {
        let dir = tempdir().unwrap();
        let mut stores = seeded(dir.path());
        backdate(stores.get(WorkCategory::Missing).path(), HOUR);

        let outcome = stores.reset_if_stale(SystemTime::now(), 24).unwrap();
        match outcome {
            ResetOutcome::Fresh { remaining } => {
                assert!(remaining <= 23 * HOUR);
                assert!(remaining > 22 * HOUR);
            }
            other => panic!("expected Fresh, got {:?}", other),
        }
        assert!(stores.get(WorkCategory::Missing).contains(1));
        assert!(stores.get(WorkCategory::Upgrade).contains(2));
    }

    #[test]
    fn test_disabled_reset() {
        let dir = tempdir().unwrap();
        let mut stores = seeded(dir.path());
        backdate(stores.get(WorkCategory::Upgrade).path(), 1000 * HOUR);

        assert_eq!(
            stores.reset_if_stale(SystemTime::now(), 0).unwrap(),
            ResetOutcome::Disabled
        );
        assert_eq!(
            stores.reset_if_stale(SystemTime::now(), -5).unwrap(),
            ResetOutcome::Disabled
        );
        assert!(stores.get(WorkCategory::Upgrade).contains(2));
        assert_eq!(stores.time_until_reset(SystemTime::now(), 0), None);
    }

    #[test]
    fn test_huge_reset_interval_saturates() {
        assert_eq!(reset_interval(1), Some(HOUR));
        assert_eq!(reset_interval(i64::MAX), Some(Duration::from_secs(u64::MAX)));

        let dir = tempdir().unwrap();
        let mut stores = seeded(dir.path());
        assert!(matches!(
            stores.reset_if_stale(SystemTime::now(), i64::MAX).unwrap(),
            ResetOutcome::Fresh { .. }
        ));
        assert!(stores.get(WorkCategory::Missing).contains(1));
    }

    #[test]
    fn test_time_until_reset_uses_oldest_store() {
        let dir = tempdir().unwrap();
        let stores = seeded(dir.path());
        backdate(stores.get(WorkCategory::Upgrade).path(), 10 * HOUR);

        let remaining = stores.time_until_reset(SystemTime::now(), 12).unwrap();
        assert!(remaining <= 2 * HOUR);
        assert!(remaining > HOUR);
    }
}
