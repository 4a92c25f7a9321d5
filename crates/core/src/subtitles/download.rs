//! Session-token caching and idempotent subtitle downloads.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Credentials, SubtitleDownloader, SubtitleError, SubtitleRecord};
use crate::media::is_subtitle_file;
use crate::metrics::{SUBTITLE_DOWNLOADS, TOKEN_EXCHANGES};

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A download token, valid only on the day it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub issued: NaiveDate,
}

/// Result of [`DownloadManager::download_if_missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A recognizable subtitle was already next to the movie.
    AlreadyPresent(PathBuf),
    Downloaded(PathBuf),
}

/// Downloads subtitle files, reusing one login token per calendar day.
pub struct DownloadManager {
    downloader: Arc<dyn SubtitleDownloader>,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<SessionToken>>,
}

impl DownloadManager {
    /// Fails when the account credentials are missing.
    pub fn new(
        downloader: Arc<dyn SubtitleDownloader>,
        credentials: Credentials,
    ) -> Result<Self, SubtitleError> {
        if !credentials.is_complete() {
            return Err(SubtitleError::NotConfigured(
                "OpenSubtitles username and password are required for downloads".to_string(),
            ));
        }

        Ok(Self {
            downloader,
            credentials,
            clock: Arc::new(SystemClock),
            token: Mutex::new(None),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Today's token, logging in at most once per day.
    ///
    /// The cache lock is held across the login so concurrent callers wait
    /// for a single exchange instead of racing their own.
    pub async fn token(&self) -> Result<String, SubtitleError> {
        let today = self.clock.today();
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.issued == today {
                debug!(issued = %token.issued, "Reusing cached download token");
                return Ok(token.value.clone());
            }
            info!(issued = %token.issued, "Download token expired");
        }

        let value = self.downloader.authenticate(&self.credentials).await?;
        TOKEN_EXCHANGES.inc();
        info!(issued = %today, "Obtained download token");

        *cached = Some(SessionToken {
            value: value.clone(),
            issued: today,
        });
        Ok(value)
    }

    /// Download `subtitle` into `dest_dir`.
    ///
    /// The file name comes from the download link when it has one,
    /// otherwise `fallback_name` is used. Returns the written path.
    pub async fn download(
        &self,
        subtitle: &SubtitleRecord,
        dest_dir: &Path,
        fallback_name: &str,
    ) -> Result<PathBuf, SubtitleError> {
        self.download_file(subtitle.id, dest_dir, fallback_name).await
    }

    /// Download a provider file by id. See [`DownloadManager::download`].
    pub async fn download_file(
        &self,
        file_id: u64,
        dest_dir: &Path,
        fallback_name: &str,
    ) -> Result<PathBuf, SubtitleError> {
        let result = self.fetch_and_write(file_id, dest_dir, fallback_name).await;
        let label = if result.is_ok() { "success" } else { "failed" };
        SUBTITLE_DOWNLOADS.with_label_values(&[label]).inc();
        result
    }

    async fn fetch_and_write(
        &self,
        file_id: u64,
        dest_dir: &Path,
        fallback_name: &str,
    ) -> Result<PathBuf, SubtitleError> {
        let token = self.token().await?;
        let link = self.downloader.request_link(file_id, &token).await?;
        debug!(file_id, %link, "Got download link");

        let file_name = filename_from_link(&link, fallback_name);
        let bytes = self.downloader.fetch(&link).await?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        info!(
            file_id,
            path = %path.display(),
            bytes = bytes.len(),
            "Subtitle downloaded"
        );
        Ok(path)
    }

    /// Like [`DownloadManager::download`], but does nothing when `dest_dir`
    /// already holds a subtitle recognizably belonging to `movie_name`.
    /// The check runs before any network call.
    pub async fn download_if_missing(
        &self,
        subtitle: &SubtitleRecord,
        dest_dir: &Path,
        movie_name: &str,
        fallback_name: &str,
    ) -> Result<DownloadOutcome, SubtitleError> {
        if let Some(existing) = find_existing_subtitle(dest_dir, movie_name).await? {
            info!(existing = %existing.display(), "Subtitle already present, skipping download");
            SUBTITLE_DOWNLOADS.with_label_values(&["skipped"]).inc();
            return Ok(DownloadOutcome::AlreadyPresent(existing));
        }

        let path = self.download(subtitle, dest_dir, fallback_name).await?;
        Ok(DownloadOutcome::Downloaded(path))
    }
}

const CHINESE_MARKERS: &[&str] = &["chinese", "zh", "cn"];

fn looks_like_movie_subtitle(stem: &str, movie_name: &str) -> bool {
    let stem = stem.to_lowercase();
    let movie = movie_name.to_lowercase();

    if !movie.is_empty() && !stem.is_empty() && (stem.contains(&movie) || movie.contains(&stem)) {
        return true;
    }
    CHINESE_MARKERS.iter().any(|m| stem.contains(m))
}

/// First subtitle file in `dir` (by name) that appears to belong to `movie_name`.
///
/// Best-effort: a stem that contains or is contained in the movie name
/// matches, as does any stem carrying a Chinese marker. A missing
/// directory has no subtitles.
pub async fn find_existing_subtitle(
    dir: &Path,
    movie_name: &str,
) -> io::Result<Option<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut matches = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_subtitle_file(&path) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if looks_like_movie_subtitle(&stem, movie_name) {
            matches.push(path);
        }
    }

    matches.sort();
    Ok(matches.into_iter().next())
}

fn bare_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

/// File name carried by a download link: the last path segment,
/// percent-decoded and stripped of any directory parts.
/// Falls back to `fallback` when the link has no usable name.
pub fn filename_from_link(link: &str, fallback: &str) -> String {
    let from_link = url::Url::parse(link).ok().and_then(|url| {
        let segment = url.path_segments()?.last()?.to_string();
        let decoded = urlencoding::decode(&segment).ok()?.into_owned();
        bare_file_name(&decoded)
    });

    match from_link {
        Some(name) => name,
        None => {
            warn!(%link, "No file name in download link, using fallback");
            bare_file_name(fallback).unwrap_or_else(|| "subtitle.srt".to_string())
        }
    }
}

/// A file in the download directory.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Files in `dir`, newest first. A missing directory is empty.
pub async fn list_download_history(dir: &Path) -> io::Result<Vec<DownloadedFile>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        files.push(DownloadedFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(files)
}
