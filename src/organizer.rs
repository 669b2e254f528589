//! Organizer module - turns scanned files into a show/season layout

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use crate::config::OrganizeConfig;
use crate::episode::{extension_of, parse_episode, season_folder};
use crate::error::{OrganizeError, Result};
use crate::models::{
    EpisodeRecord, MediaKind, OrganizeReport, PlannedTransfer, ScannedEntry, TransferMode,
};
use crate::progress::{ProgressReporter, TransferOutcome};
use crate::scanner::scan_directory;

/// Records grouped by title, then by season
pub type GroupedRecords = BTreeMap<String, BTreeMap<String, Vec<EpisodeRecord>>>;

/// Planned transfers grouped by title, then by season
pub type TransferPlan = BTreeMap<String, BTreeMap<String, Vec<PlannedTransfer>>>;

/// Copy (`leave_originals`) or move every episode under `root` into
/// `<root>/<tv_shows_folder>/<title>/Season <season>/`
pub fn reorganize(
    root: impl Into<PathBuf>,
    leave_originals: bool,
    tv_shows_folder: &str,
) -> Result<OrganizeReport> {
    let config = OrganizeConfig::builder()
        .root(root)
        .leave_originals(leave_originals)
        .tv_shows_folder(tv_shows_folder)
        .build();
    Organizer::new(config).run()
}

/// Build an EpisodeRecord for every media entry whose name carries a season marker
///
/// Returns the records and the number of media files that did not match.
pub fn build_records(entries: &[ScannedEntry], config: &OrganizeConfig) -> (Vec<EpisodeRecord>, u64) {
    let mut records = Vec::new();
    let mut unmatched = 0;

    for entry in entries {
        let Some(file_name) = entry.file_name() else {
            continue;
        };
        if !config.is_media_file(file_name) {
            continue;
        }

        let Some(info) = parse_episode(file_name) else {
            log::debug!("No season marker in {}", entry.path.display());
            unmatched += 1;
            continue;
        };

        let extension = extension_of(&entry.path);
        records.push(EpisodeRecord {
            new_file_name: info.file_name(&extension),
            title: info.title,
            season: info.season,
            episode: info.episode,
            old_file_name: entry.path.clone(),
            old_directory: entry.directory.clone(),
            depth: entry.depth,
            kind: MediaKind::from_extension(&extension),
        });
    }

    (records, unmatched)
}

/// Group records by title, then by season
pub fn group_records(records: Vec<EpisodeRecord>) -> GroupedRecords {
    let mut grouped = GroupedRecords::new();
    for record in records {
        grouped
            .entry(record.title.clone())
            .or_default()
            .entry(record.season.clone())
            .or_default()
            .push(record);
    }
    grouped
}

/// Sub-path kept below the season folder
///
/// The file's directory relative to the scan root, minus its first component
/// (the release folder the file arrived in). Files directly in the root or in
/// a top-level folder get an empty sub-path.
pub fn relative_sub_path(root: &Path, directory: &Path) -> Result<PathBuf> {
    let relative = directory.strip_prefix(root).map_err(|_| {
        OrganizeError::invalid_path(
            Some(directory.to_path_buf()),
            format!("not under scan root {}", root.display()),
        )
    })?;

    Ok(relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .skip(1)
        .collect())
}

/// Compute where a record ends up
pub fn plan_transfer(
    root: &Path,
    tv_shows_folder: &str,
    record: EpisodeRecord,
) -> Result<PlannedTransfer> {
    let destination_dir = root
        .join(tv_shows_folder)
        .join(&record.title)
        .join(season_folder(&record.season))
        .join(relative_sub_path(root, &record.old_directory)?);
    let destination = destination_dir.join(&record.new_file_name);

    Ok(PlannedTransfer {
        record,
        destination_dir,
        destination,
    })
}

/// Runs one scan-and-reorganize pass
#[derive(Debug)]
pub struct Organizer {
    config: OrganizeConfig,
    reporter: ProgressReporter,
}

impl Organizer {
    /// Create an organizer that prints text progress
    pub fn new(config: OrganizeConfig) -> Self {
        Self {
            config,
            reporter: ProgressReporter::default(),
        }
    }

    /// Replace the progress reporter
    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &OrganizeConfig {
        &self.config
    }

    /// Scan the root and group every matched record with its destination
    pub fn plan(&self, root: &Path) -> Result<(TransferPlan, OrganizeReport)> {
        let entries = scan_directory(root, &self.config.effective_ignored_names())?;
        let (records, unmatched) = build_records(&entries, &self.config);

        let mut report = OrganizeReport::new();
        report.scanned_files = entries.len() as u64;
        report.matched_files = records.len() as u64;
        report.unmatched_files = unmatched;
        report.dry_run = self.config.dry_run;

        let mut plan = TransferPlan::new();
        for (title, seasons) in group_records(records) {
            let mut planned_seasons = BTreeMap::new();
            for (season, records) in seasons {
                let transfers = records
                    .into_iter()
                    .map(|record| plan_transfer(root, &self.config.tv_shows_folder, record))
                    .collect::<Result<Vec<_>>>()?;
                planned_seasons.insert(season, transfers);
            }
            plan.insert(title, planned_seasons);
        }

        Ok((plan, report))
    }

    /// Perform the run
    pub fn run(&self) -> Result<OrganizeReport> {
        match self.run_inner() {
            Ok(report) => {
                self.reporter.report_done(&report);
                Ok(report)
            }
            Err(e) => {
                self.reporter.report_error(&e);
                Err(e)
            }
        }
    }

    fn run_inner(&self) -> Result<OrganizeReport> {
        let start = Instant::now();
        let root = self.config.expand_root()?;
        let mode = TransferMode::from_leave_originals(self.config.leave_originals);

        log::info!("Scanning {}", root.display());
        self.reporter.report_start(&root, &self.config);

        let (plan, mut report) = self.plan(&root)?;
        log::info!(
            "{} episode files across {} shows ({} media files without a season marker)",
            report.matched_files,
            plan.len(),
            report.unmatched_files
        );

        let mut source_dirs = BTreeSet::new();
        let mut written = HashSet::new();
        for (title, seasons) in &plan {
            for (season, transfers) in seasons {
                let season_dir = root
                    .join(&self.config.tv_shows_folder)
                    .join(title)
                    .join(season_folder(season));
                self.ensure_dir(&season_dir)?;

                for transfer in transfers {
                    self.ensure_dir(&transfer.destination_dir)?;
                    let outcome = self.transfer(mode, transfer, &mut written)?;
                    self.reporter.report_transfer(mode, transfer, outcome);

                    match (outcome, mode) {
                        (TransferOutcome::Done | TransferOutcome::Planned, TransferMode::Copy) => {
                            report.copied += 1
                        }
                        (TransferOutcome::Done | TransferOutcome::Planned, TransferMode::Move) => {
                            report.moved += 1
                        }
                        (TransferOutcome::AlreadyInPlace | TransferOutcome::Conflict, _) => {
                            report.skipped += 1
                        }
                    }

                    if mode == TransferMode::Move
                        && matches!(outcome, TransferOutcome::Done | TransferOutcome::AlreadyInPlace)
                    {
                        source_dirs.insert(transfer.record.old_directory.clone());
                    }
                }
            }
        }

        if mode == TransferMode::Move && !self.config.dry_run {
            self.remove_source_dirs(&root, source_dirs, &mut report)?;
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Finished: {} copied, {} moved, {} skipped in {}ms",
            report.copied,
            report.moved,
            report.skipped,
            report.duration_ms
        );
        Ok(report)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if self.config.dry_run || dir.is_dir() {
            return Ok(());
        }
        log::debug!("Creating {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| OrganizeError::io(dir, e))
    }

    /// Place one file at its destination
    ///
    /// `written` holds the destinations already claimed in this run; a second
    /// source for the same destination is left in place as a conflict.
    fn transfer(
        &self,
        mode: TransferMode,
        transfer: &PlannedTransfer,
        written: &mut HashSet<PathBuf>,
    ) -> Result<TransferOutcome> {
        let source = &transfer.record.old_file_name;
        let destination = &transfer.destination;

        if !written.insert(destination.clone()) {
            log::warn!(
                "{} also maps to {}, leaving it in place",
                source.display(),
                destination.display()
            );
            return Ok(TransferOutcome::Conflict);
        }

        if self.config.dry_run {
            return Ok(TransferOutcome::Planned);
        }

        if destination.exists() {
            if same_content(source, destination)? {
                if mode == TransferMode::Move {
                    fs::remove_file(source).map_err(|e| OrganizeError::io(source, e))?;
                }
                return Ok(TransferOutcome::AlreadyInPlace);
            }
            if !self.config.overwrite {
                log::warn!(
                    "{} exists with different content, leaving {} in place",
                    destination.display(),
                    source.display()
                );
                return Ok(TransferOutcome::Conflict);
            }
            log::debug!("Overwriting {}", destination.display());
        }

        match mode {
            TransferMode::Copy => {
                fs::copy(source, destination).map_err(|e| OrganizeError::io(source, e))?;
            }
            TransferMode::Move => move_file(source, destination)?,
        }
        Ok(TransferOutcome::Done)
    }

    /// Remove the directories files were moved out of, deepest first
    fn remove_source_dirs(
        &self,
        root: &Path,
        source_dirs: BTreeSet<PathBuf>,
        report: &mut OrganizeReport,
    ) -> Result<()> {
        let destination_root = root.join(&self.config.tv_shows_folder);
        let ignored = self.config.effective_ignored_names();

        let mut dirs: Vec<PathBuf> = source_dirs
            .into_iter()
            .filter(|dir| dir != root && !dir.starts_with(&destination_root))
            .collect();
        dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

        for dir in dirs {
            if !dir.is_dir() {
                continue;
            }
            if only_ignored_files_left(&dir, &ignored)? {
                fs::remove_dir_all(&dir).map_err(|e| OrganizeError::io(&dir, e))?;
                self.reporter.report_cleanup(&dir, true);
                report.removed_dirs.push(dir);
            } else {
                log::warn!("Keeping {}: other files remain", dir.display());
                self.reporter.report_cleanup(&dir, false);
                report.kept_dirs.push(dir);
            }
        }
        Ok(())
    }
}

/// Rename, falling back to copy + remove when rename is refused (e.g. across devices)
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if let Err(e) = fs::rename(source, destination) {
        log::debug!(
            "Rename of {} failed ({}), copying instead",
            source.display(),
            e
        );
        fs::copy(source, destination).map_err(|e| OrganizeError::io(source, e))?;
        fs::remove_file(source).map_err(|e| OrganizeError::io(source, e))?;
    }
    Ok(())
}

fn only_ignored_files_left(dir: &Path, ignored: &HashSet<String>) -> Result<bool> {
    for entry in fs::read_dir(dir).map_err(|e| OrganizeError::io(dir, e))? {
        let entry = entry.map_err(|e| OrganizeError::io(dir, e))?;
        let is_file = entry
            .file_type()
            .map_err(|e| OrganizeError::io(entry.path(), e))?
            .is_file();
        let name_ignored = entry
            .file_name()
            .to_str()
            .map(|name| ignored.contains(name))
            .unwrap_or(false);
        if !(is_file && name_ignored) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Compare two files by size, then by MD5 digest
fn same_content(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a).map_err(|e| OrganizeError::io(a, e))?.len();
    let len_b = fs::metadata(b).map_err(|e| OrganizeError::io(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(file_digest(a)? == file_digest(b)?)
}

fn file_digest(path: &Path) -> Result<String> {
    use md5::{Digest, Md5};

    let mut file = File::open(path).map_err(|e| OrganizeError::io(path, e))?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; 1024 * 1024];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|e| OrganizeError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(root: &Path, rel_dir: &str, name: &str, depth: usize) -> ScannedEntry {
        let directory = if rel_dir.is_empty() {
            root.to_path_buf()
        } else {
            root.join(rel_dir)
        };
        ScannedEntry {
            path: directory.join(name),
            directory,
            depth,
        }
    }

    fn quiet(config: OrganizeConfig) -> Organizer {
        Organizer::new(config).with_reporter(ProgressReporter::quiet())
    }

    #[test]
    fn test_build_records_filters_and_parses() {
        let root = Path::new("/media/Cinema");
        let entries = vec![
            entry(root, "", "Show.Name.S01E02.mkv", 0),
            entry(root, "", "Show.Name.S01E02.nfo", 0),
            entry(root, "", "Movie.2020.mkv", 0),
            entry(root, "Show.Name.S01", "Show.Name.S01E03.en.srt", 1),
        ];
        let (records, unmatched) = build_records(&entries, &OrganizeConfig::default());

        assert_eq!(unmatched, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Show Name");
        assert_eq!(records[0].new_file_name, "Show Name - S01E02.mkv");
        assert_eq!(records[0].kind, MediaKind::Video);
        assert_eq!(records[1].new_file_name, "Show Name - S01E03.srt");
        assert_eq!(records[1].kind, MediaKind::Subtitle);
        assert_eq!(records[1].depth, 1);
    }

    #[test]
    fn test_group_records_by_title_and_season() {
        let root = Path::new("/m");
        let entries = vec![
            entry(root, "", "A.S01E01.mkv", 0),
            entry(root, "", "A.S02E01.mkv", 0),
            entry(root, "", "A.S01E02.mkv", 0),
            entry(root, "", "B.S01E01.mkv", 0),
        ];
        let (records, _) = build_records(&entries, &OrganizeConfig::default());
        let grouped = group_records(records);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["A"].len(), 2);
        assert_eq!(grouped["A"]["01"].len(), 2);
        assert_eq!(grouped["A"]["02"].len(), 1);
        assert_eq!(grouped["B"]["01"].len(), 1);
    }

    #[test]
    fn test_relative_sub_path_drops_release_folder() {
        let root = Path::new("/m");
        assert_eq!(relative_sub_path(root, root).unwrap(), PathBuf::new());
        assert_eq!(
            relative_sub_path(root, &root.join("Show.S01")).unwrap(),
            PathBuf::new()
        );
        assert_eq!(
            relative_sub_path(root, &root.join("Show.S01").join("Subs")).unwrap(),
            PathBuf::from("Subs")
        );
        assert!(relative_sub_path(root, Path::new("/elsewhere")).is_err());
    }

    #[test]
    fn test_plan_transfer_destination() {
        let root = Path::new("/media/Cinema");
        let (mut records, _) = build_records(
            &[entry(root, "Pack/Extras", "Show.S01E01.mkv", 2)],
            &OrganizeConfig::default(),
        );
        let transfer = plan_transfer(root, "TV Shows", records.remove(0)).unwrap();
        assert_eq!(
            transfer.destination,
            PathBuf::from("/media/Cinema/TV Shows/Show/Season 01/Extras/Show - S01E01.mkv")
        );
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Show.S01E01.mkv"), b"data").unwrap();

        let config = OrganizeConfig::builder()
            .root(dir.path())
            .leave_originals(false)
            .dry_run(true)
            .build();
        let report = quiet(config).run().unwrap();

        assert!(report.dry_run);
        assert_eq!(report.moved, 1);
        assert!(dir.path().join("Show.S01E01.mkv").exists());
        assert!(!dir.path().join("TV Shows").exists());
    }

    #[test]
    fn test_conflict_without_overwrite_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Show.S01E01.mkv"), b"new").unwrap();
        let season = dir.path().join("TV Shows").join("Show").join("Season 01");
        fs::create_dir_all(&season).unwrap();
        fs::write(season.join("Show - S01E01.mkv"), b"old!").unwrap();

        let config = OrganizeConfig::builder()
            .root(dir.path())
            .overwrite(false)
            .build();
        let report = quiet(config).run().unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.copied, 0);
        assert_eq!(fs::read(season.join("Show - S01E01.mkv")).unwrap(), b"old!");
    }

    #[test]
    fn test_overwrite_replaces_different_destination() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Show.S01E01.mkv"), b"new").unwrap();
        let season = dir.path().join("TV Shows").join("Show").join("Season 01");
        fs::create_dir_all(&season).unwrap();
        fs::write(season.join("Show - S01E01.mkv"), b"old!").unwrap();

        let report = quiet(OrganizeConfig::new(dir.path())).run().unwrap();

        assert_eq!(report.copied, 1);
        assert_eq!(fs::read(season.join("Show - S01E01.mkv")).unwrap(), b"new");
    }

    #[test]
    fn test_move_keeps_directory_with_other_files() {
        let dir = TempDir::new().unwrap();
        let release = dir.path().join("Show.S01.1080p");
        fs::create_dir(&release).unwrap();
        fs::write(release.join("Show.S01E01.mkv"), b"ep").unwrap();
        fs::write(release.join("notes.txt"), b"keep me").unwrap();

        let config = OrganizeConfig::builder()
            .root(dir.path())
            .leave_originals(false)
            .build();
        let report = quiet(config).run().unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.kept_dirs, vec![release.clone()]);
        assert!(release.join("notes.txt").exists());
        assert!(!release.join("Show.S01E01.mkv").exists());
    }

    #[test]
    fn test_move_removes_nested_source_dirs() {
        let dir = TempDir::new().unwrap();
        let release = dir.path().join("Show.S01");
        let subs = release.join("Subs");
        fs::create_dir_all(&subs).unwrap();
        fs::write(release.join("Show.S01E01.mkv"), b"ep").unwrap();
        fs::write(release.join(".DS_Store"), b"").unwrap();
        fs::write(subs.join("Show.S01E01.srt"), b"sub").unwrap();

        let config = OrganizeConfig::builder()
            .root(dir.path())
            .leave_originals(false)
            .build();
        let report = quiet(config).run().unwrap();

        let season = dir.path().join("TV Shows").join("Show").join("Season 01");
        assert!(season.join("Show - S01E01.mkv").exists());
        assert!(season.join("Subs").join("Show - S01E01.srt").exists());
        assert!(!release.exists());
        assert_eq!(report.removed_dirs.len(), 2);
        assert_eq!(report.removed_dirs[0], subs);
    }

    #[test]
    fn test_move_same_destination_keeps_second_source() {
        let dir = TempDir::new().unwrap();
        let low = dir.path().join("Show.S01E01.720p.mkv");
        let high = dir.path().join("Show.S01E01.1080p.mkv");
        fs::write(&low, b"seven-twenty").unwrap();
        fs::write(&high, b"ten-eighty!!").unwrap();

        let config = OrganizeConfig::builder()
            .root(dir.path())
            .leave_originals(false)
            .build();
        let report = quiet(config).run().unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.skipped, 1);

        let dest = dir
            .path()
            .join("TV Shows")
            .join("Show")
            .join("Season 01")
            .join("Show - S01E01.mkv");
        let placed = fs::read(&dest).unwrap();
        let (kept, expected_left) = if low.exists() {
            (fs::read(&low).unwrap(), b"seven-twenty".to_vec())
        } else {
            (fs::read(&high).unwrap(), b"ten-eighty!!".to_vec())
        };
        assert!(low.exists() != high.exists());
        assert_eq!(kept, expected_left);
        assert_ne!(placed, kept);
    }

    #[test]
    fn test_copy_same_destination_is_conflict() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Show.S01E02.HDTV.mkv"), b"a").unwrap();
        fs::write(dir.path().join("Show.S01E02.WEB.mkv"), b"bb").unwrap();

        let report = quiet(OrganizeConfig::new(dir.path())).run().unwrap();

        assert_eq!(report.copied, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_same_content_compares_digest() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        fs::write(&a, b"abcd").unwrap();
        fs::write(&b, b"abcd").unwrap();
        fs::write(&c, b"abce").unwrap();

        assert!(same_content(&a, &b).unwrap());
        assert!(!same_content(&a, &c).unwrap());
    }
}
