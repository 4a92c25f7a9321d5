//! Waiting for files that are still being written.

use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Poll the size of `path` until it has not changed for `window`.
///
/// Returns the final size. Fails if the file disappears while waiting.
pub async fn wait_for_write_finish(
    path: &Path,
    window: Duration,
    poll: Duration,
) -> io::Result<u64> {
    let mut last_size = tokio::fs::metadata(path).await?.len();
    let mut stable_since = Instant::now();

    loop {
        if stable_since.elapsed() >= window {
            return Ok(last_size);
        }
        sleep(poll).await;

        let size = tokio::fs::metadata(path).await?.len();
        if size != last_size {
            last_size = size;
            stable_since = Instant::now();
        }
    }
}
