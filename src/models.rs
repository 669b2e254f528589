//! Core data models for the episode sorter

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Media kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Video files (mkv, mp4, avi)
    Video,
    /// Subtitle files (srt)
    Subtitle,
    /// Anything else
    Unknown,
}

impl MediaKind {
    /// Infer media kind from a file extension, with or without the dot
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        match ext_lower.as_str() {
            "mkv" | "mp4" | "avi" => MediaKind::Video,
            "srt" => MediaKind::Subtitle,
            _ => MediaKind::Unknown,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Subtitle => "subtitle",
            MediaKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a file reaches its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Original stays in place
    Copy,
    /// Original is removed
    Move,
}

impl TransferMode {
    /// Pick the mode from the leave-originals flag
    pub fn from_leave_originals(leave_originals: bool) -> Self {
        if leave_originals {
            TransferMode::Copy
        } else {
            TransferMode::Move
        }
    }

    /// Past-tense verb used in progress lines
    pub fn past_tense(&self) -> &'static str {
        match self {
            TransferMode::Copy => "Copied",
            TransferMode::Move => "Moved",
        }
    }

    /// Infinitive used for dry-run lines
    pub fn verb(&self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

/// A file discovered by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedEntry {
    /// Directory containing the file
    pub directory: PathBuf,
    /// Full path to the file
    pub path: PathBuf,
    /// Directory levels between the scan root and the file (root = 0)
    pub depth: usize,
}

impl ScannedEntry {
    /// File name as UTF-8, if it is representable
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// A scanned file whose name carries a season marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Show title with separators turned into spaces
    pub title: String,
    /// Two-digit season number
    pub season: String,
    /// Two-digit episode number, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    /// Name the file gets at its destination
    pub new_file_name: String,
    /// Current location of the file
    pub old_file_name: PathBuf,
    /// Directory currently holding the file
    pub old_directory: PathBuf,
    /// Scan depth of the file
    pub depth: usize,
    /// Media kind from the extension
    pub kind: MediaKind,
}

/// A record together with where it will be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTransfer {
    /// Source record
    pub record: EpisodeRecord,
    /// Directory that must exist before the transfer
    pub destination_dir: PathBuf,
    /// Full destination path
    pub destination: PathBuf,
}

/// Summary of a reorganization run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeReport {
    /// Files seen by the scanner
    pub scanned_files: u64,
    /// Media files matching the season pattern
    pub matched_files: u64,
    /// Media files without a season marker
    pub unmatched_files: u64,
    /// Files copied
    pub copied: u64,
    /// Files moved
    pub moved: u64,
    /// Transfers skipped because the destination was already in place
    pub skipped: u64,
    /// Source directories removed after moving
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_dirs: Vec<PathBuf>,
    /// Source directories kept because other files remain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kept_dirs: Vec<PathBuf>,
    /// Whether the run only planned
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    /// Total run duration in milliseconds
    pub duration_ms: u64,
}

impl OrganizeReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files placed at a destination
    pub fn transferred(&self) -> u64 {
        self.copied + self.moved
    }
}
