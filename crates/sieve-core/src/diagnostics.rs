//! Notices and error types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Kind of per-file event worth showing to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    /// The quarantine already holds a file with the same name; the file stayed in place.
    Collision,
    /// Processing the file failed; it was neither classified nor moved.
    ProcessingFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoticeLevel {
    Error,
    Warning,
}

/// A non-fatal, per-file event reported at the end of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: NoticeKind,
    pub file: PathBuf,
    pub message: String,
}

impl Notice {
    pub fn collision(file: PathBuf, destination: &std::path::Path) -> Self {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            level: NoticeLevel::Warning,
            kind: NoticeKind::Collision,
            message: format!(
                "File '{}' already exists in destination ({}); left in place",
                name,
                destination.display()
            ),
            file,
        }
    }

    pub fn failure(file: PathBuf, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            kind: NoticeKind::ProcessingFailure,
            file,
            message: message.into(),
        }
    }

    pub fn is_collision(&self) -> bool {
        self.kind == NoticeKind::Collision
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("text confidence threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f32),

    #[error("worker count must be at least 1")]
    ZeroJobs,

    #[error("no home directory found; set quarantine_dir explicitly")]
    NoHomeDirectory,
}

/// Core errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to create directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name: {path}")]
    NoFileName { path: PathBuf },

    #[error("Scan root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Too many files to scan: {count} files found, limit is {limit}")]
    TooManyFiles { count: usize, limit: usize },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
