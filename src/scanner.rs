//! Scanner module - recursive discovery of files under the scan root

use std::collections::HashSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::{OrganizeError, Result};
use crate::models::ScannedEntry;

/// Recursively list every non-ignored file under `root`
///
/// Directories whose name is in `ignored_names` are not descended into and
/// ignored files are not reported. Symlinks are not followed. Any I/O error
/// aborts the scan.
pub fn scan_directory(root: &Path, ignored_names: &HashSet<String>) -> Result<Vec<ScannedEntry>> {
    if !root.is_dir() {
        return Err(OrganizeError::not_found(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry, ignored_names));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        // directories and links to them are not files
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let directory = path
            .parent()
            .ok_or_else(|| OrganizeError::invalid_path(Some(path.to_path_buf()), "file has no parent"))?;

        log::debug!("Found {}", path.display());
        entries.push(ScannedEntry {
            directory: directory.to_path_buf(),
            path: path.to_path_buf(),
            // walkdir counts the root as depth 0, so its files sit at 1
            depth: entry.depth() - 1,
        });
    }

    Ok(entries)
}

/// The root itself is never filtered by name
fn is_ignored(entry: &DirEntry, ignored_names: &HashSet<String>) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| ignored_names.contains(name))
        .unwrap_or(false)
}
