use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::Path;

/// Extensions treated as movie files (compared case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

/// Extensions treated as subtitle files (compared case-insensitively).
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "ssa", "sub", "vtt"];

const SAMPLE_KEYWORDS: &[&str] = &["sample", "trailer", "preview", "teaser", "promo"];

/// Files announcing less than this many megabytes are samples.
const SAMPLE_MAX_MB: f64 = 50.0;
/// Files announcing less than this many gigabytes are samples.
const SAMPLE_MAX_GB: f64 = 0.1;

static SIZE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(mb|gb)").expect("valid size token regex"));

fn extension_in(path: &Path, set: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| set.iter().any(|s| s.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

pub fn is_video_file(path: &Path) -> bool {
    extension_in(path, VIDEO_EXTENSIONS)
}

pub fn is_subtitle_file(path: &Path) -> bool {
    extension_in(path, SUBTITLE_EXTENSIONS)
}

/// Dotfiles are never considered, whether file or directory.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// File name without its final extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether a file name looks like a sample, trailer or other short clip.
///
/// Matches on keywords anywhere in the lowercased name, or on an embedded
/// size token such as `40MB` / `0.05 GB`. Only the first size token counts.
pub fn is_sample_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();

    if SAMPLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    let Some(caps) = SIZE_TOKEN.captures(&lower) else {
        return false;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return false;
    };

    match &caps[2] {
        "mb" => value < SAMPLE_MAX_MB,
        "gb" => value < SAMPLE_MAX_GB,
        _ => false,
    }
}
