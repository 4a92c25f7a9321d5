//! Directory monitor: turns new movie directories under a root into pipeline runs.

mod config;
mod monitor;
mod stability;
mod types;

pub use config::WatcherConfig;
pub use monitor::DirectoryMonitor;
pub use stability::wait_for_write_finish;
pub use types::{WatchEvent, WatchEventKind, WatcherError, WatcherStatus};
