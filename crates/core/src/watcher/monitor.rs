//! Filesystem monitor that hands new movie directories to the pipeline.
//!
//! - Platform events arrive through `notify` and are bridged into a tokio channel
//! - Files are handed off only once their size stops changing
//! - Nothing is dispatched until the initial scan of the root has finished
//! - Deferred runs are cancelled when the monitor stops

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::config::WatcherConfig;
use super::stability::wait_for_write_finish;
use super::types::{WatchEvent, WatchEventKind, WatcherError, WatcherStatus};
use crate::media::is_video_file;
use crate::metrics::WATCH_EVENTS;
use crate::pipeline::{DirectoryProcessor, ProcessedFileRegistry};

/// State shared with the event loop and deferred tasks.
struct MonitorShared {
    config: WatcherConfig,
    root: PathBuf,
    processor: Arc<dyn DirectoryProcessor>,
    registry: ProcessedFileRegistry,
    ready: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

/// Watches the root directory and schedules directory runs.
pub struct DirectoryMonitor {
    shared: Arc<MonitorShared>,
    running: AtomicBool,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl DirectoryMonitor {
    /// Create a monitor for `config.root`. The root must exist.
    pub fn new(
        config: WatcherConfig,
        processor: Arc<dyn DirectoryProcessor>,
    ) -> Result<Self, WatcherError> {
        let root = config.root.clone().ok_or(WatcherError::NotConfigured)?;
        let root = std::fs::canonicalize(&root).map_err(|_| WatcherError::RootMissing(root))?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            shared: Arc::new(MonitorShared {
                config,
                root,
                processor,
                registry: ProcessedFileRegistry::new(),
                ready: AtomicBool::new(false),
                shutdown_tx,
            }),
            running: AtomicBool::new(false),
            watcher: Mutex::new(None),
        })
    }

    /// The canonical watch root.
    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    /// Attach the platform watcher, run the initial scan and start dispatching.
    pub async fn start(&self) -> Result<(), WatcherError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Directory monitor already running");
            return Ok(());
        }

        info!(root = %self.shared.root.display(), "Starting directory monitor");

        let watcher = match self.attach() {
            Ok(watcher) => watcher,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        *self.watcher.lock().await = Some(watcher);

        let root = self.shared.root.clone();
        let depth = self.shared.config.depth;
        let existing = tokio::task::spawn_blocking(move || initial_scan(&root, depth))
            .await
            .unwrap_or(0);

        self.shared.ready.store(true, Ordering::SeqCst);
        info!(existing_videos = existing, "Directory monitor ready");
        Ok(())
    }

    fn attach(&self) -> Result<RecommendedWatcher, WatcherError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                // The receiver is gone once the monitor stopped.
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )?;
        watcher.watch(&self.shared.root, RecursiveMode::Recursive)?;

        let shutdown_rx = self.shared.shutdown_tx.subscribe();
        tokio::spawn(event_loop(Arc::clone(&self.shared), rx, shutdown_rx));
        Ok(watcher)
    }

    /// Detach the watcher and cancel every run still waiting out its delay.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Directory monitor not running");
            return;
        }

        info!("Stopping directory monitor");
        self.shared.ready.store(false, Ordering::SeqCst);
        let _ = self.shared.shutdown_tx.send(());
        self.watcher.lock().await.take();
        info!("Directory monitor stopped");
    }

    /// Apply the dispatch rules to one event. Returns true if a run was scheduled.
    pub fn handle_event(&self, event: WatchEvent) -> bool {
        self.shared.handle_event(event)
    }

    pub fn status(&self) -> WatcherStatus {
        WatcherStatus {
            watching: self.running.load(Ordering::Relaxed),
            ready: self.shared.ready.load(Ordering::Relaxed),
            root: self.shared.root.clone(),
            processed_files: self.shared.registry.len(),
        }
    }
}

impl MonitorShared {
    fn handle_event(self: &Arc<Self>, event: WatchEvent) -> bool {
        let ready = self.ready.load(Ordering::SeqCst);
        match event.kind {
            WatchEventKind::File => {
                if !is_video_file(&event.path) || self.registry.contains(&event.path) {
                    return false;
                }
                if !ready {
                    debug!(path = %event.path.display(), "Ignoring file seen before ready");
                    return false;
                }
                if !self.registry.insert(&event.path) {
                    return false;
                }
                let Some(dir) = event.path.parent() else {
                    return false;
                };
                info!(path = %event.path.display(), "New video file detected");
                WATCH_EVENTS.with_label_values(&[event.kind.as_str()]).inc();
                self.schedule(dir.to_path_buf());
                true
            }
            WatchEventKind::Directory => {
                if event.path == self.root {
                    return false;
                }
                if !ready {
                    debug!(path = %event.path.display(), "Ignoring directory seen before ready");
                    return false;
                }
                info!(path = %event.path.display(), "New directory detected");
                WATCH_EVENTS.with_label_values(&[event.kind.as_str()]).inc();
                self.schedule(event.path);
                true
            }
        }
    }

    /// Run the pipeline for `dir` after the processing delay unless the monitor stops first.
    fn schedule(self: &Arc<Self>, dir: PathBuf) {
        let shared = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let delay = self.config.process_delay();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!(dir = %dir.display(), "Deferred run cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            // Outcomes and failures are logged by the processor.
            if let Err(e) = shared.processor.process_directory(&dir).await {
                debug!(dir = %dir.display(), error = %e, "Deferred run failed");
            }
        });
    }

    /// Whether `path` is within the configured depth and not hidden.
    fn accepts(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let mut levels = 0;
        for component in relative.components() {
            let Component::Normal(name) = component else {
                return false;
            };
            if name.to_string_lossy().starts_with('.') {
                return false;
            }
            levels += 1;
        }
        (1..=self.config.depth + 1).contains(&levels)
    }

    async fn on_created(self: Arc<Self>, path: PathBuf) {
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Entry vanished before it was inspected");
                return;
            }
        };

        if metadata.is_dir() {
            self.handle_event(WatchEvent::directory(path));
            return;
        }
        if !metadata.is_file() || !is_video_file(&path) || self.registry.contains(&path) {
            return;
        }

        let window = self.config.stability_window();
        let poll = self.config.poll_interval();
        match wait_for_write_finish(&path, window, poll).await {
            Ok(size) => {
                debug!(path = %path.display(), size, "File write finished");
                self.handle_event(WatchEvent::file(path));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "File disappeared while being written");
            }
        }
    }
}

async fn event_loop(
    shared: Arc<MonitorShared>,
    mut rx: mpsc::UnboundedReceiver<std::result::Result<Event, notify::Error>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            message = rx.recv() => match message {
                Some(Ok(event)) => dispatch(&shared, event),
                Some(Err(e)) => error!(error = %e, "Filesystem watch error"),
                None => break,
            },
        }
    }
    debug!("Directory monitor event loop exited");
}

fn dispatch(shared: &Arc<MonitorShared>, event: Event) {
    let paths = match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths,
        // Both carries [from, to].
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.into_iter().last().into_iter().collect()
        }
        _ => return,
    };

    for path in paths {
        if !shared.accepts(&path) {
            continue;
        }
        if !shared.ready.load(Ordering::SeqCst) {
            debug!(path = %path.display(), "Dropping event seen during initial scan");
            continue;
        }
        tokio::spawn(Arc::clone(shared).on_created(path));
    }
}

/// Count the video files already under the root.
fn initial_scan(root: &Path, depth: usize) -> usize {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(depth + 1)
        .into_iter()
        .filter_entry(|entry| !crate::media::is_hidden(entry.path()))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_video_file(entry.path()))
        .count()
}
