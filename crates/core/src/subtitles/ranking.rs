//! Subtitle quality ordering and language-aware selection.

use std::cmp::Ordering;

use super::types::SubtitleRecord;

/// Languages tried after the caller's preference, in order.
pub const FALLBACK_LANGUAGES: &[&str] = &["zh-CN", "zh", "en"];

/// Popularity score: downloads weighted by rating, with ratings below 1 counted as 1.
pub fn quality_score(record: &SubtitleRecord) -> f64 {
    record.download_count as f64 * record.rating.max(1.0)
}

/// Total order where `Less` means `a` is the better subtitle.
///
/// Human translations beat AI and machine translations, HD beats non-HD,
/// then the higher score wins and the newer upload breaks score ties.
pub fn compare_quality(a: &SubtitleRecord, b: &SubtitleRecord) -> Ordering {
    a.ai_translated
        .cmp(&b.ai_translated)
        .then_with(|| a.machine_translated.cmp(&b.machine_translated))
        .then_with(|| b.hd.cmp(&a.hd))
        .then_with(|| quality_score(b).total_cmp(&quality_score(a)))
        // None sorts before Some, so a missing date is the oldest
        .then_with(|| b.upload_date.cmp(&a.upload_date))
}

/// Sort best-first. Stable, so fully equal records keep their input order.
pub fn rank(records: &mut [SubtitleRecord]) {
    records.sort_by(compare_quality);
}

fn best_of<'a>(records: impl Iterator<Item = &'a SubtitleRecord>) -> Option<&'a SubtitleRecord> {
    // min_by returns the first of several equal minima
    records.min_by(|a, b| compare_quality(a, b))
}

/// Pick the single best subtitle.
///
/// Languages are tried in the order `[preferred, "zh-CN", "zh", "en"]`
/// (duplicates removed); the best record of the first language with any
/// records wins. When none of those languages is present the best record
/// overall is returned.
pub fn select_best<'a>(
    records: &'a [SubtitleRecord],
    preferred: &str,
) -> Option<&'a SubtitleRecord> {
    let mut priority: Vec<&str> = Vec::with_capacity(FALLBACK_LANGUAGES.len() + 1);
    for lang in std::iter::once(preferred).chain(FALLBACK_LANGUAGES.iter().copied()) {
        if !lang.is_empty() && !priority.contains(&lang) {
            priority.push(lang);
        }
    }

    priority
        .iter()
        .find_map(|lang| best_of(records.iter().filter(|r| r.language == *lang)))
        .or_else(|| best_of(records.iter()))
}
