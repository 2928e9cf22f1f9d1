//! Scan configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::diagnostics::ConfigError;

/// Name of the project-level config file looked up in the scan root.
pub const CONFIG_FILE_NAME: &str = ".sieve.toml";

/// Default quarantine folder name, created under `~/Desktop`.
pub const MISMATCHED_DIR_NAME: &str = "Mismatched Files";

/// Declared output folder that current logic never populates.
pub const NON_TEXT_DIR_NAME: &str = "Non-Text Files";

/// Minimum detector confidence (exclusive) for a `.txt` file to pass.
pub const DEFAULT_TEXT_CONFIDENCE: f32 = 0.90;

/// Default error log, relative to the working directory.
pub const DEFAULT_ERROR_LOG: &str = "error_log.txt";

/// Configuration for a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Where flagged files are moved. Defaults to `~/Desktop/Mismatched Files`.
    quarantine_dir: Option<PathBuf>,

    /// Second output folder. Created alongside the quarantine, never written to.
    non_text_dir: Option<PathBuf>,

    /// Detector confidence a `.txt` file must exceed to count as UTF-8.
    text_confidence_threshold: f32,

    /// Worker threads. `None` uses the available parallelism.
    jobs: Option<usize>,

    /// Abort before touching anything when the tree holds more files than this.
    max_files: Option<usize>,

    /// Append-mode error log path.
    error_log: PathBuf,

    /// Validator names (e.g. `"DocxValidator"`) to switch off. Files of the
    /// affected type are skipped, not passed.
    disabled_validators: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            quarantine_dir: None,
            non_text_dir: None,
            text_confidence_threshold: DEFAULT_TEXT_CONFIDENCE,
            jobs: None,
            max_files: None,
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
            disabled_validators: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Load config from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<root>/.sieve.toml` when it exists, otherwise use the defaults.
    ///
    /// A file that is present but fails to load also falls back to the
    /// defaults; the reason is returned as a warning. Callers holding an
    /// explicit path use [`ScanConfig::load`], which fails instead.
    pub fn load_or_default(root: &Path) -> (Self, Option<String>) {
        let candidate = root.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            return (Self::default(), None);
        }

        match Self::load(&candidate) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!(
                    "Failed to load config {}: {}; using defaults",
                    candidate.display(),
                    e
                )),
            ),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.text_confidence_threshold) {
            return Err(ConfigError::InvalidThreshold(self.text_confidence_threshold));
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::ZeroJobs);
        }
        Ok(())
    }

    /// Resolve the quarantine directory, falling back to the desktop default.
    pub fn quarantine_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.quarantine_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_output_dir(MISMATCHED_DIR_NAME),
        }
    }

    /// Resolve the unused second output directory.
    ///
    /// When only the quarantine is overridden, this sits next to it.
    pub fn non_text_dir(&self) -> Result<PathBuf, ConfigError> {
        match (&self.non_text_dir, &self.quarantine_dir) {
            (Some(dir), _) => Ok(dir.clone()),
            (None, Some(quarantine)) => Ok(quarantine
                .parent()
                .map(|p| p.join(NON_TEXT_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(NON_TEXT_DIR_NAME))),
            (None, None) => default_output_dir(NON_TEXT_DIR_NAME),
        }
    }

    pub fn text_confidence_threshold(&self) -> f32 {
        self.text_confidence_threshold
    }

    pub fn jobs(&self) -> Option<usize> {
        self.jobs
    }

    pub fn max_files(&self) -> Option<usize> {
        self.max_files
    }

    pub fn error_log(&self) -> &Path {
        &self.error_log
    }

    pub fn disabled_validators(&self) -> &[String] {
        &self.disabled_validators
    }

    pub fn with_quarantine_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.quarantine_dir = Some(dir.into());
        self
    }

    pub fn with_non_text_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.non_text_dir = Some(dir.into());
        self
    }

    pub fn with_text_confidence_threshold(mut self, threshold: f32) -> Self {
        self.text_confidence_threshold = threshold;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_max_files(mut self, limit: usize) -> Self {
        self.max_files = Some(limit);
        self
    }

    pub fn with_disabled_validator(mut self, name: impl Into<String>) -> Self {
        self.disabled_validators.push(name.into());
        self
    }
}

fn default_output_dir(name: &str) -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home.join("Desktop").join(name))
}
