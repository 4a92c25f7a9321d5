//! Directory pipeline: candidate selection through translation for one movie directory.

mod config;
mod coordinator;
mod state;
mod types;

pub use config::PipelineConfig;
pub use coordinator::{DirectoryPipeline, DirectoryProcessor};
pub use state::{DirectoryLease, DirectoryLockSet, ProcessedFileRegistry};
pub use types::{PipelineError, PipelineOutcome};
