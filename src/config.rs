//! Configuration for a reorganization run

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{OrganizeError, Result};

/// Default name of the destination folder created under the root
pub const DEFAULT_TV_SHOWS_FOLDER: &str = "TV Shows";

/// Configuration for the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeConfig {
    /// Directory to scan; may start with `~`
    pub root: PathBuf,

    /// File and directory names skipped during the scan
    pub ignored_names: HashSet<String>,

    /// Destination folder created under the root
    pub tv_shows_folder: String,

    /// Copy files instead of moving them
    pub leave_originals: bool,

    /// Media extensions eligible for reorganization (lowercase, with dot)
    pub extensions: HashSet<String>,

    /// Replace a destination file whose content differs from the source
    pub overwrite: bool,

    /// Compute and report the plan without touching the file system
    pub dry_run: bool,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignored_names: Self::default_ignored_names(),
            tv_shows_folder: DEFAULT_TV_SHOWS_FOLDER.to_string(),
            leave_originals: true,
            extensions: Self::default_extensions(),
            overwrite: true,
            dry_run: false,
        }
    }
}

impl OrganizeConfig {
    /// Create a new config for the given root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Create a config builder
    pub fn builder() -> OrganizeConfigBuilder {
        OrganizeConfigBuilder::new()
    }

    /// Get the default video extensions
    pub fn default_video_extensions() -> HashSet<String> {
        [".mkv", ".mp4", ".avi"].iter().map(|s| s.to_string()).collect()
    }

    /// Get the default subtitle extensions
    pub fn default_subtitle_extensions() -> HashSet<String> {
        [".srt"].iter().map(|s| s.to_string()).collect()
    }

    /// Get all default media extensions
    pub fn default_extensions() -> HashSet<String> {
        let mut extensions = Self::default_video_extensions();
        extensions.extend(Self::default_subtitle_extensions());
        extensions
    }

    /// Get the default names to skip while scanning
    pub fn default_ignored_names() -> HashSet<String> {
        [DEFAULT_TV_SHOWS_FOLDER, ".DS_Store"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Check whether a file name ends with a media extension
    pub fn is_media_file(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Names skipped by the scanner, always including the destination folder
    pub fn effective_ignored_names(&self) -> HashSet<String> {
        let mut names = self.ignored_names.clone();
        names.insert(self.tv_shows_folder.clone());
        names
    }

    /// Root with a leading `~` expanded to the home directory
    pub fn expand_root(&self) -> Result<PathBuf> {
        let raw = self.root.to_str().ok_or_else(|| {
            OrganizeError::invalid_path(Some(self.root.clone()), "root is not valid UTF-8")
        })?;
        let expanded = shellexpand::tilde(raw);
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// Builder for OrganizeConfig
#[derive(Debug, Default)]
pub struct OrganizeConfigBuilder {
    config: OrganizeConfig,
}

impl OrganizeConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directory
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Replace the ignored names
    pub fn ignored_names(mut self, names: HashSet<String>) -> Self {
        self.config.ignored_names = names;
        self
    }

    /// Add a name to ignore
    pub fn add_ignored_name(mut self, name: impl Into<String>) -> Self {
        self.config.ignored_names.insert(name.into());
        self
    }

    /// Set the destination folder name
    pub fn tv_shows_folder(mut self, folder: impl Into<String>) -> Self {
        self.config.tv_shows_folder = folder.into();
        self
    }

    /// Copy (true) or move (false) files
    pub fn leave_originals(mut self, leave: bool) -> Self {
        self.config.leave_originals = leave;
        self
    }

    /// Replace the media extensions; a missing leading dot is added
    pub fn extensions(mut self, extensions: HashSet<String>) -> Self {
        self.config.extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        self
    }

    /// Enable or disable overwriting differing destinations
    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.config.overwrite = enabled;
        self
    }

    /// Enable or disable dry run
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.config.dry_run = enabled;
        self
    }

    /// Build the config
    pub fn build(self) -> OrganizeConfig {
        self.config
    }
}
