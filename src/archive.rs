//! Flat JSON archive of feed entries that have already been posted.
//!
//! The archive only grows. It is read at the start of a run and rewritten
//! wholesale when a run adds to it. Concurrent runs against the same file
//! are not coordinated and the last writer wins.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::rss::FeedEntry;

/// Posted entries keyed by entry id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive {
    entries: BTreeMap<String, FeedEntry>,
}

/// Entries not yet in the archive, and whether the archive must be rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveDiff {
    pub new_entries: Vec<FeedEntry>,
    pub should_persist: bool,
}

impl Archive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the archive at `path`.
    ///
    /// A missing or unreadable file yields an empty archive, so the first run
    /// posts everything currently in the feed.
    pub async fn load(path: &Path) -> Self {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No archive yet, starting empty");
                return Self::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read archive, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_slice::<Self>(&bytes) {
            Ok(archive) => {
                debug!(path = %path.display(), entries = archive.len(), "Loaded archive");
                archive
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt archive, starting empty");
                Self::new()
            }
        }
    }

    /// Overwrite the archive file at `path`.
    ///
    /// The JSON is written to a sibling temp file that is then renamed into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create archive directory: {}", parent.display())
            })?;
        }

        let bytes = serde_json::to_vec_pretty(self).context("Failed to serialize archive")?;

        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to replace archive: {}", path.display()))?;

        debug!(path = %path.display(), entries = self.len(), "Saved archive");
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FeedEntry> {
        self.entries.get(id)
    }

    /// Add an entry. An entry already present is left untouched.
    ///
    /// Returns `true` if the archive grew.
    pub fn insert(&mut self, entry: FeedEntry) -> bool {
        if self.entries.contains_key(&entry.id) {
            return false;
        }
        self.entries.insert(entry.id.clone(), entry);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `fetched` that are not archived, in `fetched` order.
    ///
    /// Repeated ids in `fetched` are reported once.
    #[must_use]
    pub fn diff(&self, fetched: &[FeedEntry]) -> ArchiveDiff {
        let mut seen = HashSet::new();
        let new_entries: Vec<FeedEntry> = fetched
            .iter()
            .filter(|entry| !self.contains(&entry.id) && seen.insert(entry.id.as_str()))
            .cloned()
            .collect();

        ArchiveDiff {
            should_persist: !new_entries.is_empty(),
            new_entries,
        }
    }
}

impl FromIterator<FeedEntry> for Archive {
    fn from_iter<I: IntoIterator<Item = FeedEntry>>(iter: I) -> Self {
        let mut archive = Self::new();
        for entry in iter {
            archive.insert(entry);
        }
        archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> FeedEntry {
        FeedEntry {
            id: id.to_string(),
            title: format!("Title of {id}. (arXiv)"),
            link: id.to_string(),
            description: format!("<p>Abstract: about {id}</p>"),
        }
    }

    #[test]
    fn test_diff_finds_new_entries() {
        let archive: Archive = [entry("A")].into_iter().collect();
        let diff = archive.diff(&[entry("A"), entry("B")]);

        assert_eq!(diff.new_entries, vec![entry("B")]);
        assert!(diff.should_persist);
    }

    #[test]
    fn test_diff_empty_inputs() {
        let diff = Archive::new().diff(&[]);
        assert!(diff.new_entries.is_empty());
        assert!(!diff.should_persist);
    }

    #[test]
    fn test_diff_nothing_new() {
        let archive: Archive = [entry("A"), entry("B")].into_iter().collect();
        let diff = archive.diff(&[entry("B")]);
        assert_eq!(diff, ArchiveDiff::default());
    }

    #[test]
    fn test_diff_is_idempotent_and_ordered() {
        let archive: Archive = [entry("B")].into_iter().collect();
        let fetched = [entry("D"), entry("B"), entry("A"), entry("C")];

        let first = archive.diff(&fetched);
        let second = archive.diff(&fetched);

        assert_eq!(first, second);
        let ids: Vec<_> = first.new_entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["D", "A", "C"]);
    }

    #[test]
    fn test_diff_reports_repeated_id_once() {
        let diff = Archive::new().diff(&[entry("A"), entry("A")]);
        assert_eq!(diff.new_entries.len(), 1);
    }

    #[test]
    fn test_insert_never_replaces() {
        let mut archive = Archive::new();
        assert!(archive.insert(entry("A")));

        let mut changed = entry("A");
        changed.title = "Different".to_string();
        assert!(!archive.insert(changed));

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get("A"), Some(&entry("A")));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = Archive::load(&dir.path().join("nope.json")).await;
        assert!(archive.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("archive.json");
        tokio::fs::write(&path, b"[1, 2, 3]").await.unwrap();

        assert!(Archive::load(&path).await.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_directories_and_replaces_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("archive.json");

        let mut archive: Archive = [entry("A")].into_iter().collect();
        archive.save(&path).await.unwrap();
        archive.insert(entry("B"));
        archive.save(&path).await.unwrap();

        assert_eq!(Archive::load(&path).await, archive);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_serializes_as_object_keyed_by_id() {
        let archive: Archive = [entry("https://arxiv.org/abs/1")].into_iter().collect();
        let json = serde_json::to_value(&archive).unwrap();

        assert_eq!(
            json["https://arxiv.org/abs/1"]["link"],
            "https://arxiv.org/abs/1"
        );
        assert_eq!(
            json["https://arxiv.org/abs/1"]["description"],
            "<p>Abstract: about https://arxiv.org/abs/1</p>"
        );
    }
}
