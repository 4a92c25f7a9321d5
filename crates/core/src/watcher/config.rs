//! Directory monitor configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the directory monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Whether the monitor starts with the server.
    #[serde(default)]
    pub enabled: bool,

    /// Directory holding one sub-directory per movie.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Levels below the root that are reported. 1 = movie directories and their files.
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// A new file must keep its size this long before it is handed off.
    #[serde(default = "default_stability_window_ms")]
    pub stability_window_ms: u64,

    /// How often the size of a file being written is checked.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay between an accepted event and processing its directory.
    #[serde(default = "default_process_delay_ms")]
    pub process_delay_ms: u64,
}

fn default_depth() -> usize {
    1
}

fn default_stability_window_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_process_delay_ms() -> u64 {
    3000
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: None,
            depth: default_depth(),
            stability_window_ms: default_stability_window_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            process_delay_ms: default_process_delay_ms(),
        }
    }
}

impl WatcherConfig {
    pub fn stability_window(&self) -> Duration {
        Duration::from_millis(self.stability_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn process_delay(&self) -> Duration {
        Duration::from_millis(self.process_delay_ms)
    }
}
