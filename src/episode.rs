//! Episode identity parsed from release-style file names

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `Show.Name.S01E02...`, `Show.S01.E02...`, `Show.S01-E02...` or just `Show.S01...`
static EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\.S(\d{2})(?:[.\-]?E(\d{2}))?").expect("episode pattern is valid")
});

/// Show, season and episode pulled from a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeInfo {
    /// Show title with separators turned into spaces
    pub title: String,
    /// Two-digit season number
    pub season: String,
    /// Two-digit episode number, when the name carries one
    pub episode: Option<String>,
}

impl EpisodeInfo {
    /// `<title> - S<season>E<episode><extension>`, or without `E..` when no episode is known
    pub fn file_name(&self, extension: &str) -> String {
        match &self.episode {
            Some(episode) => format!(
                "{} - S{}E{}{}",
                self.title, self.season, episode, extension
            ),
            None => format!("{} - S{}{}", self.title, self.season, extension),
        }
    }

    /// Folder name for the season, e.g. `Season 01`
    pub fn season_folder(&self) -> String {
        season_folder(&self.season)
    }
}

/// Folder name for a two-digit season
pub fn season_folder(season: &str) -> String {
    format!("Season {}", season)
}

/// Match the season marker in a bare file name
pub fn parse_episode(file_name: &str) -> Option<EpisodeInfo> {
    let captures = EPISODE_PATTERN.captures(file_name)?;
    let title = clean_title(captures.get(1)?.as_str());
    if title.is_empty() {
        return None;
    }

    Some(EpisodeInfo {
        title,
        season: captures.get(2)?.as_str().to_string(),
        episode: captures.get(3).map(|m| m.as_str().to_string()),
    })
}

/// Extension including the leading dot, case preserved
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

fn clean_title(raw: &str) -> String {
    raw.replace(['.', '_'], " ").trim().to_string()
}
