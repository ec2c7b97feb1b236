//! Scratch storage for uploaded and derived artifacts.
//!
//! Every file a pipeline run writes lives in the shared scratch directory under
//! a name derived from the run's unique token, and is owned by a [`TempHandle`].
//! Handles delete their file when released or dropped, so cleanup happens on
//! every exit path (success, adapter error, timeout or panic unwinding).

use crate::error::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempPath;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Snapshot of acquire/release activity on a scratch directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScratchStats {
    pub acquired: usize,
    pub released: usize,
}

impl ScratchStats {
    /// Handles acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        self.acquired.saturating_sub(self.released)
    }
}

/// A shared scratch directory that hands out uniquely named temp files.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
    counters: Arc<Counters>,
}

impl ScratchDir {
    /// Open (and create if needed) a scratch directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            counters: Arc::new(Counters::default()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create an empty file named `<token>-<random><suffix>`.
    pub fn acquire(&self, token: &str, suffix: &str) -> Result<TempHandle> {
        let file = tempfile::Builder::new()
            .prefix(&format!("{}-", token))
            .suffix(suffix)
            .tempfile_in(&self.root)?;
        let path = file.into_temp_path();

        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        debug!(path = %path.display(), "Acquired temp file");

        Ok(TempHandle {
            path: Some(path),
            counters: self.counters.clone(),
        })
    }

    /// Release a handle. Equivalent to [`TempHandle::release`].
    pub fn release(&self, handle: TempHandle) {
        handle.release();
    }

    pub fn stats(&self) -> ScratchStats {
        ScratchStats {
            acquired: self.counters.acquired.load(Ordering::SeqCst),
            released: self.counters.released.load(Ordering::SeqCst),
        }
    }

    /// Number of entries currently in the scratch directory.
    pub fn entry_count(&self) -> Result<usize> {
        Ok(std::fs::read_dir(&self.root)?.flatten().count())
    }

    /// Remove every entry named `<token>-*`, returning how many were removed.
    ///
    /// Catches files written next to a handle by external tools (partial
    /// downloads, segment directories) that no handle owns.
    pub fn sweep(&self, token: &str) -> usize {
        let prefix = format!("{}-", token);
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }
            let path = entry.path();
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to sweep {:?}: {}", path, e),
            }
        }

        if removed > 0 {
            debug!(token, removed, "Swept leftover scratch entries");
        }
        removed
    }

    /// Remove files left behind by a previous process.
    pub fn purge_stale(&self, max_age: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.root)?.flatten() {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age >= max_age {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Failed to remove stale file {:?}: {}", entry.path(), e),
                }
            }
        }

        if removed > 0 {
            info!("Removed {} stale scratch file(s)", removed);
        }
        Ok(removed)
    }
}

/// Exclusive ownership of one scratch path for the duration of a run.
#[derive(Debug)]
pub struct TempHandle {
    path: Option<TempPath>,
    counters: Arc<Counters>,
}

impl TempHandle {
    pub fn path(&self) -> &Path {
        // Only `None` after release, which consumes the handle.
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the file. A path that is already gone is not an error.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.display().to_string();

        match path.close() {
            Ok(()) => debug!(path = %shown, "Released temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %shown, "Temp file already removed")
            }
            Err(e) => warn!("Failed to remove temp file {}: {}", shown, e),
        }

        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for TempHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, ScratchDir) {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path().join("scratch")).unwrap();
        (dir, scratch)
    }

    #[test]
    fn test_acquire_creates_unique_files() {
        let (_dir, scratch) = scratch();

        let a = scratch.acquire("req1", ".mp4").unwrap();
        let b = scratch.acquire("req1", ".mp4").unwrap();

        assert!(a.path().exists());
        assert!(b.path().exists());
        assert_ne!(a.path(), b.path());

        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("req1-"));
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn test_release_deletes_file() {
        let (_dir, scratch) = scratch();

        let handle = scratch.acquire("req", ".wav").unwrap();
        let path = handle.path().to_path_buf();
        scratch.release(handle);

        assert!(!path.exists());
        assert_eq!(scratch.stats(), ScratchStats { acquired: 1, released: 1 });
    }

    #[test]
    fn test_release_is_idempotent_for_missing_path() {
        let (_dir, scratch) = scratch();

        let handle = scratch.acquire("req", ".mp3").unwrap();
        std::fs::remove_file(handle.path()).unwrap();
        handle.release();

        assert_eq!(scratch.stats().outstanding(), 0);
    }

    #[test]
    fn test_drop_releases() {
        let (_dir, scratch) = scratch();
        let path;
        {
            let handle = scratch.acquire("req", ".pdf").unwrap();
            path = handle.path().to_path_buf();
        }
        assert!(!path.exists());
        assert_eq!(scratch.stats(), ScratchStats { acquired: 1, released: 1 });
        assert_eq!(scratch.entry_count().unwrap(), 0);
    }

    #[test]
    fn test_sweep_removes_only_matching_token() {
        let (_dir, scratch) = scratch();
        let root = scratch.root();
        std::fs::write(root.join("run1-abc.webm.part"), b"x").unwrap();
        std::fs::write(root.join("run1-abc.ytdl"), b"x").unwrap();
        std::fs::create_dir(root.join("run1-segments")).unwrap();
        std::fs::write(root.join("run1-segments").join("segment_000.mp3"), b"x").unwrap();
        std::fs::write(root.join("run2-abc.webm.part"), b"x").unwrap();

        assert_eq!(scratch.sweep("run1"), 3);
        assert_eq!(scratch.entry_count().unwrap(), 1);
        assert!(root.join("run2-abc.webm.part").exists());
        assert_eq!(scratch.sweep("run1"), 0);
        assert_eq!(scratch.stats(), ScratchStats::default());
    }

    #[test]
    fn test_purge_stale() {
        let (_dir, scratch) = scratch();
        std::fs::write(scratch.root().join("leftover.mp3"), b"x").unwrap();

        assert_eq!(scratch.purge_stale(Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(scratch.purge_stale(Duration::ZERO).unwrap(), 1);
        assert_eq!(scratch.entry_count().unwrap(), 0);
    }
}
