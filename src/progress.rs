//! Progress reporting for reorganization runs
//!
//! Every file operation produces one message. In text mode the message is a
//! human-readable line on stdout (`Copied a to b`); in JSON mode each message
//! is a JSON object on its own stderr line so callers can follow a run.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::config::OrganizeConfig;
use crate::error::OrganizeError;
use crate::models::{OrganizeReport, PlannedTransfer, TransferMode};

/// Output format of the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain lines on stdout
    #[default]
    Text,
    /// JSON lines on stderr
    Json,
    /// No output
    Quiet,
}

/// Outcome of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOutcome {
    /// File was copied or moved
    Done,
    /// Destination already held the same content
    AlreadyInPlace,
    /// Destination differs and overwriting is disabled
    Conflict,
    /// Dry run, nothing touched
    Planned,
}

/// Start message sent when a run begins
#[derive(Debug, Clone, Serialize)]
pub struct StartMessage {
    /// Message type identifier
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Scan root
    pub root: String,
    /// Destination folder name
    pub folder: String,
    /// Copy or move
    pub mode: TransferMode,
    /// Whether nothing will be touched
    pub dry_run: bool,
}

/// Message sent per copied or moved file
#[derive(Debug, Clone, Serialize)]
pub struct TransferMessage {
    /// Message type identifier ("t" for transfer)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Copy or move
    pub mode: TransferMode,
    /// What happened
    pub outcome: TransferOutcome,
    /// Source path
    pub from: String,
    /// Destination path
    pub to: String,
}

/// Message sent when a source directory is removed or kept
#[derive(Debug, Clone, Serialize)]
pub struct CleanupMessage {
    /// Message type identifier ("rm" for cleanup)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Directory path
    pub dir: String,
    /// Whether the directory was removed
    pub removed: bool,
}

/// Error message sent when a run aborts
#[derive(Debug, Clone, Serialize)]
pub struct ErrorProgressMessage {
    /// Message type identifier ("err" for error)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Error type/category
    pub error_type: String,
    /// Error message description
    pub message: String,
    /// Path that caused the error (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Done message sent when a run completes
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    /// Message type identifier ("done" for completion)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Files matched
    #[serde(rename = "mf")]
    pub matched_files: u64,
    /// Files copied
    #[serde(rename = "cp")]
    pub copied: u64,
    /// Files moved
    #[serde(rename = "mv")]
    pub moved: u64,
    /// Transfers skipped
    #[serde(rename = "sk")]
    pub skipped: u64,
    /// Directories removed
    #[serde(rename = "rd")]
    pub removed_dirs: usize,
    /// Total run duration in milliseconds
    pub ms: u64,
}

/// Progress reporter for file operations
///
/// Holds the output format, a monotonically increasing sequence number and
/// the reporter's start time used for message timestamps.
#[derive(Debug)]
pub struct ProgressReporter {
    format: ReportFormat,
    seq: AtomicU64,
    start_time: Instant,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(ReportFormat::Text)
    }
}

impl ProgressReporter {
    /// Create a new ProgressReporter
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            seq: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Reporter that prints nothing
    pub fn quiet() -> Self {
        Self::new(ReportFormat::Quiet)
    }

    /// Get the next sequence number (monotonically increasing)
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Get the current timestamp in milliseconds since reporter creation
    pub fn current_timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Output format in use
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Output a serializable message to stderr as JSON
    pub fn output_to_stderr<T: Serialize>(&self, msg: &T) {
        if let Ok(json) = serde_json::to_string(msg) {
            eprintln!("{}", json);
            std::io::stderr().flush().ok();
        }
    }

    fn print_line(&self, line: &str) {
        println!("{}", line);
        std::io::stdout().flush().ok();
    }

    /// Report run start
    pub fn report_start(&self, root: &Path, config: &OrganizeConfig) {
        match self.format {
            ReportFormat::Quiet => {}
            ReportFormat::Text => {
                if config.dry_run {
                    self.print_line(&format!("Dry run over {}", root.display()));
                }
            }
            ReportFormat::Json => {
                let msg = StartMessage {
                    msg_type: "start",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    root: root.to_string_lossy().to_string(),
                    folder: config.tv_shows_folder.clone(),
                    mode: TransferMode::from_leave_originals(config.leave_originals),
                    dry_run: config.dry_run,
                };
                self.output_to_stderr(&msg);
            }
        }
    }

    /// Report one transfer
    pub fn report_transfer(
        &self,
        mode: TransferMode,
        transfer: &PlannedTransfer,
        outcome: TransferOutcome,
    ) {
        let from = &transfer.record.old_file_name;
        let to = &transfer.destination;
        match self.format {
            ReportFormat::Quiet => {}
            ReportFormat::Text => {
                let line = match outcome {
                    TransferOutcome::Done => format!(
                        "{} {} to {}",
                        mode.past_tense(),
                        from.display(),
                        to.display()
                    ),
                    TransferOutcome::AlreadyInPlace => {
                        format!("Already in place {} at {}", from.display(), to.display())
                    }
                    TransferOutcome::Conflict => format!(
                        "Skipped {}: {} already exists",
                        from.display(),
                        to.display()
                    ),
                    TransferOutcome::Planned => format!(
                        "Would {} {} to {}",
                        mode.verb(),
                        from.display(),
                        to.display()
                    ),
                };
                self.print_line(&line);
            }
            ReportFormat::Json => {
                let msg = TransferMessage {
                    msg_type: "t",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    mode,
                    outcome,
                    from: from.to_string_lossy().to_string(),
                    to: to.to_string_lossy().to_string(),
                };
                self.output_to_stderr(&msg);
            }
        }
    }

    /// Report a source directory removed or kept after moving
    pub fn report_cleanup(&self, dir: &Path, removed: bool) {
        match self.format {
            ReportFormat::Quiet => {}
            ReportFormat::Text => {
                if removed {
                    self.print_line(&format!("Removed {}", dir.display()));
                }
            }
            ReportFormat::Json => {
                let msg = CleanupMessage {
                    msg_type: "rm",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    dir: dir.to_string_lossy().to_string(),
                    removed,
                };
                self.output_to_stderr(&msg);
            }
        }
    }

    /// Report the error that aborted a run
    ///
    /// Text mode leaves printing to the caller.
    pub fn report_error(&self, error: &OrganizeError) {
        if self.format != ReportFormat::Json {
            return;
        }

        let msg = ErrorProgressMessage {
            msg_type: "err",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            error_type: format!("{:?}", error.kind),
            message: error.message.clone(),
            path: error.path.as_ref().map(|p| p.to_string_lossy().to_string()),
        };
        self.output_to_stderr(&msg);
    }

    /// Report run completion
    pub fn report_done(&self, report: &OrganizeReport) {
        if self.format != ReportFormat::Json {
            return;
        }

        let msg = DoneMessage {
            msg_type: "done",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            matched_files: report.matched_files,
            copied: report.copied,
            moved: report.moved,
            skipped: report.skipped,
            removed_dirs: report.removed_dirs.len(),
            ms: report.duration_ms,
        };
        self.output_to_stderr(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrganizeErrorKind;
    use crate::models::{EpisodeRecord, MediaKind};
    use std::path::PathBuf;

    fn sample_transfer() -> PlannedTransfer {
        PlannedTransfer {
            record: EpisodeRecord {
                title: "Show".to_string(),
                season: "01".to_string(),
                episode: Some("02".to_string()),
                new_file_name: "Show - S01E02.mkv".to_string(),
                old_file_name: PathBuf::from("/media/Show.S01E02.mkv"),
                old_directory: PathBuf::from("/media"),
                depth: 0,
                kind: MediaKind::Video,
            },
            destination_dir: PathBuf::from("/media/TV Shows/Show/Season 01"),
            destination: PathBuf::from("/media/TV Shows/Show/Season 01/Show - S01E02.mkv"),
        }
    }

    #[test]
    fn test_report_format_serialization() {
        assert_eq!(serde_json::to_string(&ReportFormat::Text).unwrap(), "\"text\"");
        assert_eq!(serde_json::to_string(&ReportFormat::Json).unwrap(), "\"json\"");
    }

    #[test]
    fn test_transfer_message_serialization() {
        let msg = TransferMessage {
            msg_type: "t",
            seq: 3,
            ts: 40,
            mode: TransferMode::Move,
            outcome: TransferOutcome::AlreadyInPlace,
            from: "/a.mkv".to_string(),
            to: "/b.mkv".to_string(),
        };
        let parsed: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(parsed["_t"], "t");
        assert_eq!(parsed["seq"], 3);
        assert_eq!(parsed["mode"], "move");
        assert_eq!(parsed["outcome"], "alreadyinplace");
        assert_eq!(parsed["to"], "/b.mkv");
    }

    #[test]
    fn test_error_message_without_path() {
        let msg = ErrorProgressMessage {
            msg_type: "err",
            seq: 0,
            ts: 0,
            error_type: "IoError".to_string(),
            message: "disk full".to_string(),
            path: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("path"));
    }

    #[test]
    fn test_done_message_short_keys() {
        let report = OrganizeReport {
            matched_files: 4,
            copied: 4,
            removed_dirs: vec![PathBuf::from("/x")],
            ..OrganizeReport::new()
        };
        let msg = DoneMessage {
            msg_type: "done",
            seq: 9,
            ts: 10,
            matched_files: report.matched_files,
            copied: report.copied,
            moved: report.moved,
            skipped: report.skipped,
            removed_dirs: report.removed_dirs.len(),
            ms: 12,
        };
        let parsed: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(parsed["mf"], 4);
        assert_eq!(parsed["cp"], 4);
        assert_eq!(parsed["rd"], 1);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let reporter = ProgressReporter::new(ReportFormat::Json);
        assert_eq!(reporter.next_seq(), 0);
        assert_eq!(reporter.next_seq(), 1);
        assert_eq!(reporter.next_seq(), 2);
    }

    #[test]
    fn test_quiet_reporter_consumes_no_sequence() {
        let reporter = ProgressReporter::quiet();
        reporter.report_start(Path::new("/media"), &OrganizeConfig::default());
        reporter.report_transfer(TransferMode::Copy, &sample_transfer(), TransferOutcome::Done);
        reporter.report_cleanup(Path::new("/media/old"), true);
        reporter.report_error(&OrganizeError::new(OrganizeErrorKind::IoError, None, "x"));
        reporter.report_done(&OrganizeReport::new());
        assert_eq!(reporter.next_seq(), 0);
    }

    #[test]
    fn test_json_reporter_counts_messages() {
        let reporter = ProgressReporter::new(ReportFormat::Json);
        reporter.report_transfer(TransferMode::Copy, &sample_transfer(), TransferOutcome::Done);
        reporter.report_done(&OrganizeReport::new());
        assert_eq!(reporter.next_seq(), 2);
    }
}
