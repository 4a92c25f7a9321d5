//! In-memory run bookkeeping shared between the monitor and the pipeline.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(set: &Mutex<T>) -> MutexGuard<'_, T> {
    // The guarded sets stay consistent even if a holder panicked.
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Directories with a pipeline run in progress.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLockSet {
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl DirectoryLockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `dir` for one run. `None` if another run holds it.
    pub fn try_acquire(&self, dir: &Path) -> Option<DirectoryLease> {
        let mut active = lock(&self.active);
        if !active.insert(dir.to_path_buf()) {
            return None;
        }
        Some(DirectoryLease {
            dir: dir.to_path_buf(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_locked(&self, dir: &Path) -> bool {
        lock(&self.active).contains(dir)
    }

    pub fn len(&self) -> usize {
        lock(&self.active).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive claim on a directory; released on drop, including during unwinding.
#[derive(Debug)]
pub struct DirectoryLease {
    dir: PathBuf,
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl DirectoryLease {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for DirectoryLease {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.dir);
    }
}

/// Video files already handed to the pipeline during this process lifetime.
#[derive(Debug, Clone, Default)]
pub struct ProcessedFileRegistry {
    seen: Arc<Mutex<HashSet<PathBuf>>>,
}

impl ProcessedFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`. Returns false if it was already recorded.
    pub fn insert(&self, path: &Path) -> bool {
        lock(&self.seen).insert(path.to_path_buf())
    }

    pub fn contains(&self, path: &Path) -> bool {
        lock(&self.seen).contains(path)
    }

    pub fn len(&self) -> usize {
        lock(&self.seen).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
