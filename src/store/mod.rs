//! Content-addressed artifact store.
//!
//! Each processed video owns one cache entry keyed by its content hash:
//!
//! ```text
//! <root>/<hash>/entry.json          creation metadata
//! <root>/<hash>/audio.mp3           extracted audio
//! <root>/<hash>/transcript.txt      full transcript
//! <root>/<hash>/summary.txt         sanitized summary
//! <root>/<hash>/slides/slide_N.jpg  captured frames (1-based)
//! <root>/<hash>/slides/slide_N.txt  OCR text per frame
//! <root>/<hash>/LectureNotes.pdf    rendered deliverable
//! <root>/current                    hash of the most recently active entry
//! <root>/tmp/                       staging area for atomic publishes
//! ```
//!
//! Artifacts are either absent or fully written: every write lands in the
//! staging area first and is published with a rename. The store owns on-disk
//! artifact lifetime exclusively; callers evict through it, never directly.

mod hash;

pub use hash::hash_file;

use crate::config::CacheSettings;
use crate::error::{LektorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const ENTRY_META_FILE: &str = "entry.json";
const CURRENT_FILE: &str = "current";
const STAGING_DIR: &str = "tmp";
const SLIDES_DIR: &str = "slides";

/// The artifact kinds a cache entry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Audio,
    Transcript,
    Summary,
    /// Captured slide frame, 1-based index.
    SlideImage(u32),
    /// OCR text for a slide frame, 1-based index.
    SlideText(u32),
    Deliverable,
}

impl ArtifactKind {
    /// Path of this artifact relative to its entry directory.
    pub fn rel_path(&self) -> PathBuf {
        match self {
            ArtifactKind::Audio => PathBuf::from("audio.mp3"),
            ArtifactKind::Transcript => PathBuf::from("transcript.txt"),
            ArtifactKind::Summary => PathBuf::from("summary.txt"),
            ArtifactKind::SlideImage(n) => {
                Path::new(SLIDES_DIR).join(format!("slide_{}.jpg", n))
            }
            ArtifactKind::SlideText(n) => Path::new(SLIDES_DIR).join(format!("slide_{}.txt", n)),
            ArtifactKind::Deliverable => PathBuf::from("LectureNotes.pdf"),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Audio => write!(f, "audio"),
            ArtifactKind::Transcript => write!(f, "transcript"),
            ArtifactKind::Summary => write!(f, "summary"),
            ArtifactKind::SlideImage(n) => write!(f, "slide_image_{}", n),
            ArtifactKind::SlideText(n) => write!(f, "slide_text_{}", n),
            ArtifactKind::Deliverable => write!(f, "deliverable"),
        }
    }
}

/// Per-entry metadata persisted as entry.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

/// Content-addressed filesystem store for pipeline artifacts.
pub struct ArtifactStore {
    root: PathBuf,
    /// Per-hash write serialization.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    /// Reference counts of entries currently being written; never evicted.
    active: Mutex<HashMap<String, usize>>,
}

/// RAII pin for the entry a request is writing; eviction skips it.
pub struct PinGuard<'a> {
    store: &'a ArtifactStore,
    hash: String,
}

impl Drop for PinGuard<'_> {
    fn drop(&mut self) {
        let mut active = self.store.active.lock().unwrap();
        if let Some(count) = active.get_mut(&self.hash) {
            *count -= 1;
            if *count == 0 {
                active.remove(&self.hash);
            }
        }
    }
}

impl ArtifactStore {
    /// Open (or create) a store rooted at the configured cache directory.
    ///
    /// Stale staging files from cancelled requests are swept on open.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let staging = root.join(STAGING_DIR);
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
        })
    }

    /// Open a store from cache settings.
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        Self::open(crate::config::Settings::expand_path(&settings.dir))
    }

    fn entry_dir(&self, hash: &str) -> PathBuf {
        self.root.join(hash)
    }

    /// Absolute path an artifact would occupy (whether or not it exists).
    pub fn artifact_path(&self, hash: &str, kind: ArtifactKind) -> PathBuf {
        self.entry_dir(hash).join(kind.rel_path())
    }

    /// Whether an entry exists for this hash.
    pub fn has_entry(&self, hash: &str) -> bool {
        self.entry_dir(hash).join(ENTRY_META_FILE).exists()
    }

    /// Whether an artifact is fully published for this hash.
    pub fn has_artifact(&self, hash: &str, kind: ArtifactKind) -> bool {
        self.artifact_path(hash, kind).exists()
    }

    /// Acquire the write lock serializing publishes for one hash.
    pub fn entry_lock(&self, hash: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(hash.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Pin an entry as actively written for the lifetime of the guard.
    pub fn pin(&self, hash: &str) -> PinGuard<'_> {
        *self
            .active
            .lock()
            .unwrap()
            .entry(hash.to_string())
            .or_insert(0) += 1;
        PinGuard {
            store: self,
            hash: hash.to_string(),
        }
    }

    fn is_pinned(&self, hash: &str) -> bool {
        self.active.lock().unwrap().contains_key(hash)
    }

    /// Create the entry directory and metadata if this hash is new.
    fn ensure_entry(&self, hash: &str) -> Result<()> {
        let dir = self.entry_dir(hash);
        std::fs::create_dir_all(&dir)?;

        let meta_path = dir.join(ENTRY_META_FILE);
        if !meta_path.exists() {
            let meta = EntryMeta {
                hash: hash.to_string(),
                created_at: Utc::now(),
            };
            std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;
            debug!(%hash, "Created cache entry");
        }
        Ok(())
    }

    /// Atomically publish an artifact.
    ///
    /// The data is staged under tmp/ and moved into place with a rename, so
    /// readers either see the complete artifact or none at all.
    pub async fn write_artifact(&self, hash: &str, kind: ArtifactKind, data: &[u8]) -> Result<()> {
        self.ensure_entry(hash)?;

        let staged = self
            .root
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        tokio::fs::write(&staged, data).await?;

        let target = self.artifact_path(hash, kind);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&staged, &target).await?;

        debug!(%hash, artifact = %kind, bytes = data.len(), "Published artifact");
        Ok(())
    }

    /// Read a published artifact, or NotFound.
    pub async fn read_artifact(&self, hash: &str, kind: ArtifactKind) -> Result<Vec<u8>> {
        let path = self.artifact_path(hash, kind);
        if !path.exists() {
            return Err(LektorError::NotFound(format!(
                "artifact {} for entry {}",
                kind, hash
            )));
        }
        Ok(tokio::fs::read(&path).await?)
    }

    /// List entries ordered by creation time (oldest first, ties by hash).
    pub fn list_entries(&self) -> Result<Vec<EntryMeta>> {
        let mut entries = Vec::new();

        for item in std::fs::read_dir(&self.root)? {
            let item = item?;
            if !item.path().is_dir() {
                continue;
            }
            let meta_path = item.path().join(ENTRY_META_FILE);
            if !meta_path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&meta_path)?;
            match serde_json::from_str::<EntryMeta>(&content) {
                Ok(meta) => entries.push(meta),
                Err(e) => warn!(path = %meta_path.display(), error = %e, "Skipping unreadable entry metadata"),
            }
        }

        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        Ok(entries)
    }

    /// Remove an entry and all its artifacts. Idempotent; pinned entries are
    /// left untouched.
    pub fn evict(&self, hash: &str) -> Result<()> {
        if self.is_pinned(hash) {
            warn!(%hash, "Refusing to evict entry with an in-progress write");
            return Ok(());
        }

        let dir = self.entry_dir(hash);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!(%hash, "Evicted cache entry");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Evict oldest-created entries until at most `max_entries` remain.
    ///
    /// Returns the number of entries evicted. The pinned entry is never
    /// considered.
    pub fn enforce_limit(&self, max_entries: usize) -> Result<usize> {
        let entries = self.list_entries()?;
        if entries.len() <= max_entries {
            return Ok(0);
        }

        let mut evicted = 0;
        let excess = entries.len() - max_entries;
        for meta in entries.iter().filter(|m| !self.is_pinned(&m.hash)) {
            if evicted == excess {
                break;
            }
            self.evict(&meta.hash)?;
            evicted += 1;
        }
        Ok(evicted)
    }

    /// Clear every entry and the current-hash cursor.
    pub fn reset(&self) -> Result<()> {
        info!("Clearing artifact cache");
        for meta in self.list_entries()? {
            self.evict(&meta.hash)?;
        }
        let cursor = self.root.join(CURRENT_FILE);
        match std::fs::remove_file(&cursor) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Hash of the most recently active entry, if any.
    pub fn current_hash(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.root.join(CURRENT_FILE)).ok()?;
        let trimmed = content.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Persist the current-hash cursor.
    pub fn set_current_hash(&self, hash: &str) -> Result<()> {
        let staged = self
            .root
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        std::fs::write(&staged, hash)?;
        std::fs::rename(&staged, self.root.join(CURRENT_FILE))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ArtifactStore) {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    /// Backdate an entry so eviction ordering is deterministic in tests.
    fn backdate(store: &ArtifactStore, hash: &str, minutes_ago: i64) {
        let meta = EntryMeta {
            hash: hash.to_string(),
            created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
        };
        std::fs::write(
            store.entry_dir(hash).join(ENTRY_META_FILE),
            serde_json::to_string(&meta).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let (_tmp, store) = store();

        store
            .write_artifact("abc", ArtifactKind::Transcript, b"hello lecture")
            .await
            .unwrap();

        assert!(store.has_entry("abc"));
        assert!(store.has_artifact("abc", ArtifactKind::Transcript));
        assert!(!store.has_artifact("abc", ArtifactKind::Deliverable));

        let data = store
            .read_artifact("abc", ArtifactKind::Transcript)
            .await
            .unwrap();
        assert_eq!(data, b"hello lecture");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_tmp, store) = store();
        let err = store
            .read_artifact("missing", ArtifactKind::Audio)
            .await
            .unwrap_err();
        assert!(matches!(err, LektorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_staged_file_is_not_visible() {
        let (_tmp, store) = store();
        store
            .write_artifact("abc", ArtifactKind::Transcript, b"done")
            .await
            .unwrap();

        // Simulate an interrupted write: data sitting in staging only.
        std::fs::write(store.root.join(STAGING_DIR).join("partial"), b"trunc").unwrap();
        assert!(!store.has_artifact("abc", ArtifactKind::Deliverable));

        // Reopening sweeps the staging area.
        let reopened = ArtifactStore::open(store.root.clone()).unwrap();
        assert!(!reopened.root.join(STAGING_DIR).join("partial").exists());
        assert!(reopened.has_artifact("abc", ArtifactKind::Transcript));
    }

    #[tokio::test]
    async fn test_slide_artifacts_are_scoped() {
        let (_tmp, store) = store();
        store
            .write_artifact("abc", ArtifactKind::SlideImage(1), b"jpg")
            .await
            .unwrap();
        store
            .write_artifact("abc", ArtifactKind::SlideText(1), b"ocr")
            .await
            .unwrap();

        assert!(store
            .artifact_path("abc", ArtifactKind::SlideImage(1))
            .ends_with("slides/slide_1.jpg"));
        assert!(store.has_artifact("abc", ArtifactKind::SlideText(1)));
    }

    #[tokio::test]
    async fn test_list_entries_oldest_first() {
        let (_tmp, store) = store();
        for hash in ["h1", "h2", "h3"] {
            store
                .write_artifact(hash, ArtifactKind::Transcript, b"t")
                .await
                .unwrap();
        }
        backdate(&store, "h2", 30);
        backdate(&store, "h3", 10);

        let order: Vec<String> = store
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|m| m.hash)
            .collect();
        assert_eq!(order, vec!["h2", "h3", "h1"]);
    }

    #[tokio::test]
    async fn test_evict_is_idempotent() {
        let (_tmp, store) = store();
        store
            .write_artifact("abc", ArtifactKind::Transcript, b"t")
            .await
            .unwrap();

        store.evict("abc").unwrap();
        assert!(!store.has_entry("abc"));
        store.evict("abc").unwrap();
        store.evict("never-existed").unwrap();
    }

    #[tokio::test]
    async fn test_enforce_limit_evicts_oldest() {
        let (_tmp, store) = store();
        for (i, hash) in ["h1", "h2", "h3", "h4"].iter().enumerate() {
            store
                .write_artifact(hash, ArtifactKind::Transcript, b"t")
                .await
                .unwrap();
            backdate(&store, hash, 40 - i as i64 * 10);
        }

        let evicted = store.enforce_limit(2).unwrap();
        assert_eq!(evicted, 2);

        let remaining: Vec<String> = store
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|m| m.hash)
            .collect();
        assert_eq!(remaining, vec!["h3", "h4"]);
    }

    #[tokio::test]
    async fn test_pinned_entry_survives_eviction() {
        let (_tmp, store) = store();
        for (i, hash) in ["h1", "h2", "h3"].iter().enumerate() {
            store
                .write_artifact(hash, ArtifactKind::Transcript, b"t")
                .await
                .unwrap();
            backdate(&store, hash, 30 - i as i64 * 10);
        }

        let _pin = store.pin("h1");
        store.enforce_limit(1).unwrap();

        // The oldest entry is pinned, so the next-oldest ones went instead.
        assert!(store.has_entry("h1"));
        let remaining = store.list_entries().unwrap();
        assert!(remaining.len() <= 2);

        drop(_pin);
        store.enforce_limit(1).unwrap();
        assert_eq!(store.list_entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pins_are_reference_counted() {
        let (_tmp, store) = store();
        store
            .write_artifact("h1", ArtifactKind::Transcript, b"t")
            .await
            .unwrap();

        let first = store.pin("h1");
        let second = store.pin("h1");
        drop(first);

        // Still pinned by the second guard.
        store.evict("h1").unwrap();
        assert!(store.has_entry("h1"));

        drop(second);
        store.evict("h1").unwrap();
        assert!(!store.has_entry("h1"));
    }

    #[tokio::test]
    async fn test_reset_clears_entries_and_cursor() {
        let (_tmp, store) = store();
        store
            .write_artifact("abc", ArtifactKind::Transcript, b"t")
            .await
            .unwrap();
        store.set_current_hash("abc").unwrap();

        store.reset().unwrap();
        assert!(store.list_entries().unwrap().is_empty());
        assert!(store.current_hash().is_none());
    }

    #[tokio::test]
    async fn test_current_hash_roundtrip() {
        let (_tmp, store) = store();
        assert!(store.current_hash().is_none());
        store.set_current_hash("deadbeef").unwrap();
        assert_eq!(store.current_hash().as_deref(), Some("deadbeef"));
    }
}
