//! Error types for the episode sorter

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur while scanning or reorganizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeErrorKind {
    /// Permission denied when accessing a file or directory
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// I/O error during file operations
    IoError,
    /// Path cannot be expanded or has no usable file name
    InvalidPath,
    /// Unknown error
    Unknown,
}

/// Represents an error that aborted a run
#[derive(Debug, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct OrganizeError {
    /// The kind of error
    pub kind: OrganizeErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, OrganizeError>;

impl OrganizeError {
    /// Create a new error
    pub fn new(kind: OrganizeErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(path: PathBuf) -> Self {
        Self::new(
            OrganizeErrorKind::NotFound,
            Some(path.clone()),
            format!("Not found: {:?}", path),
        )
    }

    /// Create an invalid path error
    pub fn invalid_path(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(OrganizeErrorKind::InvalidPath, path, message)
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let mut error = Self::from(err);
        error.path = Some(path.into());
        error
    }
}

fn kind_of(err: &std::io::Error) -> OrganizeErrorKind {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => OrganizeErrorKind::PermissionDenied,
        std::io::ErrorKind::NotFound => OrganizeErrorKind::NotFound,
        _ => OrganizeErrorKind::IoError,
    }
}

impl From<std::io::Error> for OrganizeError {
    fn from(err: std::io::Error) -> Self {
        Self::new(kind_of(&err), None, err.to_string())
    }
}

impl From<walkdir::Error> for OrganizeError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf());
        let kind = err
            .io_error()
            .map(kind_of)
            .unwrap_or(OrganizeErrorKind::Unknown);
        Self::new(kind, path, err.to_string())
    }
}
