//! Scan pipeline: walk, classify in parallel, collect.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::classifier::{Classification, ValidationVerdict, classify};
use crate::config::ScanConfig;
use crate::diagnostics::{CoreError, CoreResult, Notice};
use crate::registry::ValidatorRegistry;
use crate::relocator::{QuarantineRecord, RelocationOutcome, Relocator};

/// Outcome of processing one file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Classified(Classification),
    /// Processing failed before a verdict could be acted on (e.g. the move
    /// was refused). The file was not relocated.
    Failed(String),
}

/// Progress hooks for a running scan.
///
/// Called from worker threads; implementations must be cheap and thread-safe.
pub trait ScanObserver: Sync {
    fn on_start(&self, _total_files: usize) {}
    fn on_file(&self, _path: &Path, _outcome: &FileOutcome) {}
    fn on_finish(&self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Result of scanning a directory tree.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ScanReport {
    pub root: PathBuf,
    pub quarantine_dir: PathBuf,
    /// Created for every run, never populated.
    pub non_text_dir: PathBuf,
    /// Regular files found under the root.
    pub files_total: usize,
    /// Files on the allow-list that went through a validator.
    pub files_checked: usize,
    /// Files left alone because their type is unsupported or disabled.
    pub files_skipped: usize,
    /// Quarantined files, in completion order.
    pub records: Vec<QuarantineRecord>,
    /// Collisions and processing failures, errors first.
    pub notices: Vec<Notice>,
    pub elapsed_ms: u64,
}

impl ScanReport {
    pub fn has_mismatches(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn collision_count(&self) -> usize {
        self.notices.iter().filter(|n| n.is_collision()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.notices.iter().filter(|n| !n.is_collision()).count()
    }
}

/// Main entry point: scan `root` with the built-in validators.
pub fn scan_directory(root: &Path, config: &ScanConfig) -> CoreResult<ScanReport> {
    let registry = ValidatorRegistry::from_config(config);
    scan_directory_with(root, config, &registry, &NoopObserver)
}

/// Scan `root` with a custom registry and progress observer.
///
/// Fatal problems (bad config, root not a directory, output directories not
/// creatable, file limit exceeded) are returned before any file is touched.
/// Everything that goes wrong for a single file ends up in
/// [`ScanReport::notices`] instead.
pub fn scan_directory_with(
    root: &Path,
    config: &ScanConfig,
    registry: &ValidatorRegistry,
    observer: &dyn ScanObserver,
) -> CoreResult<ScanReport> {
    let scan_start = Instant::now();
    config.validate()?;

    if !root.is_dir() {
        return Err(CoreError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let root = canonical(root);

    let relocator = Relocator::new(config.quarantine_dir()?)?;
    let non_text_dir = config.non_text_dir()?;
    std::fs::create_dir_all(&non_text_dir).map_err(|source| CoreError::CreateDir {
        path: non_text_dir.clone(),
        source,
    })?;

    // Outputs that may live inside the scanned tree are never scanned.
    let pruned = [
        canonical(relocator.quarantine_dir()),
        canonical(&non_text_dir),
        canonical(config.error_log()),
    ];
    let files = collect_files(&root, &pruned);

    if let Some(limit) = config.max_files() {
        if files.len() > limit {
            return Err(CoreError::TooManyFiles {
                count: files.len(),
                limit,
            });
        }
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs().unwrap_or(0))
        .build()
        .map_err(|e| CoreError::WorkerPool(e.to_string()))?;

    tracing::debug!(root = %root.display(), files = files.len(), "Scan started");
    observer.on_start(files.len());

    let outcomes: Vec<(PathBuf, FileOutcome)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let outcome = process_file(path, registry, &relocator, config);
                observer.on_file(path, &outcome);
                (path.clone(), outcome)
            })
            .collect()
    });

    observer.on_finish();

    let mut files_checked = 0;
    let mut files_skipped = 0;
    let mut notices = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            FileOutcome::Classified(classification) => {
                if classification.file_type.is_validatable()
                    && classification.verdict != ValidationVerdict::Skipped
                {
                    files_checked += 1;
                } else {
                    files_skipped += 1;
                }
                if let Some(RelocationOutcome::Collision { destination }) = classification.relocation {
                    notices.push(Notice::collision(path, &destination));
                }
            }
            FileOutcome::Failed(message) => notices.push(Notice::failure(path, message)),
        }
    }

    notices.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.file.cmp(&b.file)));

    let quarantine_dir = relocator.quarantine_dir().to_path_buf();
    let records = relocator.into_records();

    let elapsed_ms = std::cmp::min(scan_start.elapsed().as_millis(), u64::MAX as u128) as u64;
    tracing::debug!(
        quarantined = records.len(),
        notices = notices.len(),
        elapsed_ms,
        "Scan finished"
    );

    Ok(ScanReport {
        root,
        quarantine_dir,
        non_text_dir,
        files_total: files.len(),
        files_checked,
        files_skipped,
        records,
        notices,
        elapsed_ms,
    })
}

/// Classify one file; every failure stays inside this call.
fn process_file(
    path: &Path,
    registry: &ValidatorRegistry,
    relocator: &Relocator,
    config: &ScanConfig,
) -> FileOutcome {
    tracing::debug!(path = %path.display(), "Processing file");

    let result = catch_unwind(AssertUnwindSafe(|| classify(path, registry, relocator, config)));
    let message = match result {
        Ok(Ok(classification)) => return FileOutcome::Classified(classification),
        Ok(Err(e)) => error_chain(&e),
        Err(_) => "processing panicked".to_string(),
    };

    tracing::error!(path = %path.display(), "Error processing {}: {}", path.display(), message);
    FileOutcome::Failed(message)
}

fn error_chain(err: &CoreError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Every regular file under `root`, symlinks not followed, `pruned` paths
/// (directories or files) skipped. Sorted for a stable dispatch order.
pub fn collect_files(root: &Path, pruned: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !pruned.iter().any(|p| p == entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::error!(
                    path = ?e.path().map(|p| p.display().to_string()),
                    "Skipping unreadable entry: {}",
                    e
                );
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
