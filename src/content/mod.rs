//! Content store for the watched markdown file.
//!
//! Every [`ContentStore::read`] goes to disk so external edits are visible on
//! the next request. The last successful read is kept in an [`ArcSwap`] so
//! concurrent readers see either the old or the new snapshot, never a mix.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwap;

use crate::error::PreviewError;
use crate::utils::path::normalize_path;

/// One successful read of the watched file.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub content: String,
    pub read_at: SystemTime,
    /// Increments on every successful read; `0` means never read.
    pub version: u64,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            content: String::new(),
            read_at: SystemTime::UNIX_EPOCH,
            version: 0,
        }
    }
}

/// Owns the watched path and its last-read content.
#[derive(Debug)]
pub struct ContentStore {
    path: PathBuf,
    last: ArcSwap<Snapshot>,
}

impl ContentStore {
    /// Create a store for `path`. Nothing is read until [`read`](Self::read).
    pub fn new(path: &Path) -> Self {
        Self {
            path: normalize_path(path),
            last: ArcSwap::from_pointee(Snapshot::empty()),
        }
    }

    /// Open a store and perform the first read, failing if the file is missing.
    pub fn open(path: &Path) -> Result<Self, PreviewError> {
        let store = Self::new(path);
        store.read()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used as the page title.
    pub fn title(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Read the file from disk and replace the stored snapshot.
    ///
    /// On failure the previous snapshot is left untouched.
    pub fn read(&self) -> Result<Arc<Snapshot>, PreviewError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| PreviewError::from_read(self.path.clone(), e))?;

        let mut next = None;
        self.last.rcu(|prev| {
            let snapshot = Arc::new(Snapshot {
                content: content.clone(),
                read_at: SystemTime::now(),
                version: prev.version + 1,
            });
            next = Some(Arc::clone(&snapshot));
            snapshot
        });
        // rcu always runs the closure at least once
        Ok(next.unwrap_or_else(|| self.last.load_full()))
    }

    /// Last successfully read snapshot, without touching the disk.
    pub fn last(&self) -> Arc<Snapshot> {
        self.last.load_full()
    }

    pub fn version(&self) -> u64 {
        self.last.load().version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_reflects_external_edits() {
        let (_dir, path) = setup("# Hello");
        let store = ContentStore::open(&path).unwrap();
        assert_eq!(store.last().content, "# Hello");
        assert_eq!(store.version(), 1);

        fs::write(&path, "# Updated").unwrap();
        let snap = store.read().unwrap();
        assert_eq!(snap.content, "# Updated");
        assert_eq!(snap.version, 2);
        assert_eq!(store.last().content, "# Updated");
    }

    #[test]
    fn test_failed_read_keeps_last_content() {
        let (_dir, path) = setup("# Keep me");
        let store = ContentStore::open(&path).unwrap();

        fs::remove_file(&path).unwrap();
        let err = store.read().unwrap_err();
        assert!(matches!(err, PreviewError::FileNotFound(_)));

        let last = store.last();
        assert_eq!(last.content, "# Keep me");
        assert_eq!(last.version, 1);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ContentStore::open(&dir.path().join("missing.md"));
        assert!(matches!(result, Err(PreviewError::FileNotFound(_))));
    }

    #[test]
    fn test_read_directory_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path());
        assert!(store.read().is_err());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_title_is_file_name() {
        let (_dir, path) = setup("");
        let store = ContentStore::new(&path);
        assert_eq!(store.title(), "doc.md");
        assert!(store.path().is_absolute());
    }

    #[test]
    fn test_concurrent_reads_never_torn() {
        let (dir, path) = setup("a");
        let store = Arc::new(ContentStore::open(&path).unwrap());
        let xs = "x".repeat(512);
        let ys = "y".repeat(512);

        let writer = {
            let (path, staged) = (path.clone(), dir.path().join("doc.md.tmp"));
            let (xs, ys) = (xs.clone(), ys.clone());
            std::thread::spawn(move || {
                for i in 0..50 {
                    // Replace by rename so the file itself is never half written.
                    fs::write(&staged, if i % 2 == 0 { &xs } else { &ys }).unwrap();
                    fs::rename(&staged, &path).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let (xs, ys) = (xs.clone(), ys.clone());
                std::thread::spawn(move || {
                    let mut seen = 0;
                    for _ in 0..50 {
                        let _ = store.read();
                        let snap = store.last();
                        let content = snap.content.as_str();
                        assert!(
                            content == "a" || content == xs || content == ys,
                            "torn snapshot of {} bytes",
                            content.len()
                        );
                        assert!(snap.version >= seen, "version went backwards");
                        seen = snap.version;
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert!(store.version() >= 1);
    }
}
