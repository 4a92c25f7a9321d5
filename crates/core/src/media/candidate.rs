use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::video::{is_sample_file, is_video_file};

/// A video file found directly inside a movie directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieCandidateFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub is_sample: bool,
}

/// List the video files directly inside `dir`, sorted by file name.
pub async fn scan_directory(dir: &Path) -> io::Result<Vec<MovieCandidateFile>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_video_file(&path) {
            continue;
        }
        // Follows symlinks; dangling links are skipped
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        found.push(MovieCandidateFile {
            is_sample: is_sample_file(&file_name),
            size_bytes: metadata.len(),
            path,
        });
    }

    found.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!(dir = %dir.display(), count = found.len(), "Scanned directory for video files");
    Ok(found)
}

/// Pick the largest non-sample file. Ties keep the earlier entry.
pub fn select_candidate(files: &[MovieCandidateFile]) -> Option<&MovieCandidateFile> {
    files
        .iter()
        .filter(|f| !f.is_sample)
        .fold(None, |best: Option<&MovieCandidateFile>, f| match best {
            Some(b) if b.size_bytes >= f.size_bytes => Some(b),
            _ => Some(f),
        })
}
