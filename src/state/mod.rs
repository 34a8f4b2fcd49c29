//! Durable record of items that have already been searched.
//!
//! Each [`ProcessedStore`] is a newline-delimited file of integer IDs kept in
//! insertion order. Appends are written through to disk before the in-memory
//! set changes, so whatever a store reports as recorded survives an
//! interrupt. Rewrites (truncation, clearing) go through a temp file in the
//! same directory and a rename.

mod stores;

pub use stores::*;

use refresharr_common::{Error, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub struct ProcessedStore {
    path: PathBuf,
    order: Vec<i64>,
    members: HashSet<i64>,
    /// The file does not end in a newline (hand edited), so the next append
    /// must start one.
    needs_newline: bool,
}

impl ProcessedStore {
    /// Open the store at `path`, creating an empty file when missing.
    ///
    /// Never fails: unreadable or malformed content loads as an empty store
    /// and is logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if let Err(e) = ensure_file(&path) {
            tracing::warn!("Failed to create processed store {:?}: {}", path, e);
        }

        Self::load(path)
    }

    /// Read the store at `path` without touching the filesystem; a missing
    /// file loads as an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let (order, needs_newline) = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let needs_newline = !content.is_empty() && !content.ends_with('\n');
                (decode(&content), needs_newline)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Vec::new(), false),
            Err(e) => {
                tracing::warn!(
                    "Failed to read processed store {:?}, treating as empty: {}",
                    path,
                    e
                );
                (Vec::new(), false)
            }
        };

        let mut members = HashSet::with_capacity(order.len());
        let order: Vec<i64> = order.into_iter().filter(|id| members.insert(*id)).collect();

        Self {
            path,
            order,
            members,
            needs_newline,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: i64) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// IDs in the order they were recorded, oldest first.
    pub fn ids(&self) -> &[i64] {
        &self.order
    }

    /// A copy of the membership set, for selecting while recording.
    pub fn snapshot(&self) -> HashSet<i64> {
        self.members.clone()
    }

    /// Record `id`. Returns `false` when it was already present.
    pub fn record(&mut self, id: i64) -> Result<bool> {
        if self.members.contains(&id) {
            return Ok(false);
        }

        let mut line = String::new();
        if self.needs_newline {
            line.push('\n');
        }
        line.push_str(&id.to_string());
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| storage_error(&self.path, "open", e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| storage_error(&self.path, "append to", e))?;

        self.needs_newline = false;
        self.members.insert(id);
        self.order.push(id);
        Ok(true)
    }

    /// Keep only the `max_size` most recently recorded IDs.
    ///
    /// Returns how many entries were dropped. The file is only rewritten
    /// when something is dropped.
    pub fn truncate(&mut self, max_size: usize) -> Result<usize> {
        if self.order.len() <= max_size {
            return Ok(0);
        }

        let dropped = self.order.len() - max_size;
        let kept = self.order[dropped..].to_vec();
        self.rewrite(&kept)?;

        for id in &self.order[..dropped] {
            self.members.remove(id);
        }
        self.order = kept;

        tracing::debug!(
            "Truncated {:?} to {} entries ({} dropped)",
            self.path,
            max_size,
            dropped
        );
        Ok(dropped)
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.rewrite(&[])?;
        self.order.clear();
        self.members.clear();
        Ok(())
    }

    /// Last successful write to the backing file.
    pub fn modified(&self) -> Result<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| storage_error(&self.path, "stat", e))
    }

    /// Time since the last write, as seen from `now`.
    ///
    /// A store whose modification time is unavailable counts as brand new,
    /// and one modified "in the future" has age zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        match self.modified() {
            Ok(modified) => now.duration_since(modified).unwrap_or(Duration::ZERO),
            Err(e) => {
                tracing::debug!("{}", e);
                Duration::ZERO
            }
        }
    }

    fn rewrite(&mut self, ids: &[i64]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut content = String::with_capacity(ids.len() * 8);
        for id in ids {
            content.push_str(&id.to_string());
            content.push('\n');
        }

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| storage_error(&self.path, "create temp file for", e))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| storage_error(&self.path, "write", e))?;
        temp.persist(&self.path)
            .map_err(|e| storage_error(&self.path, "replace", e.error))?;

        self.needs_newline = false;
        Ok(())
    }
}

/// Parse newline-delimited IDs. Blank and unparsable lines are skipped.
pub fn decode(content: &str) -> Vec<i64> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!("Ignoring unparsable processed-store line: {:?}", line);
                None
            }
        })
        .collect()
}

fn ensure_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

fn storage_error(path: &Path, action: &str, e: std::io::Error) -> Error {
    Error::storage(format!("failed to {} {:?}: {}", action, path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/processed_missing.txt");

        let store = ProcessedStore::open(&path);
        assert!(store.is_empty());
        assert!(path.exists());
        assert!(store.modified().is_ok());
    }

    #[test]
    fn test_whitespace_only_content_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "  \n\n\t\n").unwrap();

        assert!(ProcessedStore::open(&path).is_empty());
    }

    #[test]
    fn test_decode_skips_garbage_and_duplicates_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "1\nabc\n2\n1\n 3 \n").unwrap();

        let store = ProcessedStore::open(&path);
        assert_eq!(store.ids(), &[1, 2, 3]);
    }

    #[test]
    fn test_record_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let mut store = ProcessedStore::open(&path);

        assert!(store.record(42).unwrap());
        assert!(!store.record(42).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.contains(42));

        let reopened = ProcessedStore::open(&path);
        assert_eq!(reopened.ids(), &[42]);
    }

    #[test]
    fn test_record_after_missing_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "4").unwrap();

        let mut store = ProcessedStore::open(&path);
        store.record(5).unwrap();

        assert_eq!(ProcessedStore::open(&path).ids(), &[4, 5]);
    }

    #[test]
    fn test_truncate_keeps_most_recent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let mut store = ProcessedStore::open(&path);
        for id in 1..=300 {
            store.record(id).unwrap();
        }

        assert_eq!(store.truncate(250).unwrap(), 50);
        assert_eq!(store.len(), 250);
        assert!(!store.contains(50));
        assert!(store.contains(51));
        assert_eq!(store.ids().first(), Some(&51));
        assert_eq!(store.ids().last(), Some(&300));

        let reopened = ProcessedStore::open(&path);
        assert_eq!(reopened.ids(), store.ids());
    }

    #[test]
    fn test_truncate_under_bound_is_noop() {
        let dir = tempdir().unwrap();
        let mut store = ProcessedStore::open(dir.path().join("ids.txt"));
        store.record(1).unwrap();
        assert_eq!(store.truncate(250).unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let mut store = ProcessedStore::open(&path);
        store.record(1).unwrap();
        store.record(2).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!store.contains(1));
        assert!(ProcessedStore::open(&path).is_empty());

        // Still usable after clearing
        store.record(1).unwrap();
        assert_eq!(ProcessedStore::open(&path).ids(), &[1]);
    }

    #[test]
    fn test_age_of_fresh_store_is_small() {
        let dir = tempdir().unwrap();
        let store = ProcessedStore::open(dir.path().join("ids.txt"));
        let age = store.age(SystemTime::now() + Duration::from_secs(60));
        assert!(age >= Duration::from_secs(59));
        assert!(age < Duration::from_secs(3600));
    }
}
