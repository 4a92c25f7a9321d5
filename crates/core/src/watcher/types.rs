//! Types for the directory monitor.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent the monitor from starting.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// No root directory configured.
    #[error("watcher root not configured")]
    NotConfigured,

    /// The root directory does not exist.
    #[error("watch root does not exist: {0}")]
    RootMissing(PathBuf),

    /// The platform watcher could not be created or attached.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of entry appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchEventKind {
    File,
    Directory,
}

impl WatchEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchEventKind::File => "file",
            WatchEventKind::Directory => "directory",
        }
    }
}

/// A new entry under the watch root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

impl WatchEvent {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: WatchEventKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: WatchEventKind::Directory,
        }
    }
}

/// Current state of the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct WatcherStatus {
    /// The platform watcher is attached.
    pub watching: bool,
    /// The initial scan finished and events are being dispatched.
    pub ready: bool,
    pub root: PathBuf,
    /// Video files handed off since start.
    pub processed_files: usize,
}
