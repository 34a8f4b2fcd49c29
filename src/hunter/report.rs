use refresharr_common::{HuntMode, MediaKind, WorkCategory};

/// Summary of one hunt cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Mode the cycle ran in; `None` when the configured mode was invalid
    pub mode: Option<HuntMode>,
    pub config_error: Option<String>,
    /// Media kinds whose processed stores were cleared for staleness
    pub resets: Vec<MediaKind>,
    searched: Vec<(MediaKind, WorkCategory, usize)>,
}

impl CycleReport {
    pub(crate) fn add(&mut self, kind: MediaKind, category: WorkCategory, count: usize) {
        self.searched.push((kind, category, count));
    }

    /// Items searched and recorded for `kind`/`category` this cycle
    pub fn searched(&self, kind: MediaKind, category: WorkCategory) -> usize {
        self.searched
            .iter()
            .filter(|(k, c, _)| *k == kind && *c == category)
            .map(|(_, _, count)| count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.searched.iter().map(|(_, _, count)| count).sum()
    }

    /// Whether `kind`/`category` ran at all this cycle
    pub fn ran(&self, kind: MediaKind, category: WorkCategory) -> bool {
        self.searched
            .iter()
            .any(|(k, c, _)| *k == kind && *c == category)
    }

    pub fn log(&self) {
        if self.searched.is_empty() {
            tracing::info!("Cycle summary: nothing searched");
            return;
        }

        let parts: Vec<String> = self
            .searched
            .iter()
            .map(|(kind, category, count)| format!("{} {}={}", kind, category, count))
            .collect();
        tracing::info!("Cycle summary: {}", parts.join(", "));
    }
}
