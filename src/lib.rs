//! Sorts TV episode files into a show/season layout
//!
//! This library scans a directory tree with walkdir, recognizes
//! `Show.Name.S01E02` style file names and copies or moves the matching
//! video and subtitle files into `<root>/TV Shows/<title>/Season <nn>/`.

pub mod config;
pub mod episode;
pub mod error;
pub mod models;
pub mod organizer;
pub mod progress;
pub mod scanner;

pub use config::OrganizeConfig;
pub use episode::{parse_episode, EpisodeInfo};
pub use error::{OrganizeError, OrganizeErrorKind};
pub use models::{
    EpisodeRecord, MediaKind, OrganizeReport, PlannedTransfer, ScannedEntry, TransferMode,
};
pub use organizer::{reorganize, Organizer};
pub use progress::{ProgressReporter, ReportFormat, TransferOutcome};
pub use scanner::scan_directory;
