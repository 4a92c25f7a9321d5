//! Mock directory processor for monitor tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::pipeline::{DirectoryProcessor, PipelineError, PipelineOutcome};

/// Records every directory it is asked to process.
#[derive(Debug)]
pub struct MockDirectoryProcessor {
    calls: Mutex<Vec<PathBuf>>,
    outcome: Mutex<PipelineOutcome>,
    delay: Mutex<Duration>,
}

impl Default for MockDirectoryProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectoryProcessor {
    /// Answers `NoCandidate` immediately.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Mutex::new(PipelineOutcome::NoCandidate),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_outcome(&self, outcome: PipelineOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// Make each run take this long.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DirectoryProcessor for MockDirectoryProcessor {
    async fn process_directory(&self, dir: &Path) -> Result<PipelineOutcome, PipelineError> {
        self.calls.lock().unwrap().push(dir.to_path_buf());
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.outcome.lock().unwrap().clone())
    }
}
