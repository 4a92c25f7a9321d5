//! Local media inspection: extension sets, sample detection and candidate selection.

mod candidate;
mod video;

pub use candidate::{scan_directory, select_candidate, MovieCandidateFile};
pub use video::{
    file_stem, is_hidden, is_sample_file, is_subtitle_file, is_video_file, SUBTITLE_EXTENSIONS,
    VIDEO_EXTENSIONS,
};
