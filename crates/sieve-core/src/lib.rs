//! # sieve-core
//!
//! File integrity triage engine.
//!
//! Walks a directory tree and checks every file whose extension is on the
//! allow-list:
//! - `.txt` must be confidently UTF-8
//! - `.png`, `.jpg` must be structurally sound images
//! - `.pdf` must parse
//! - `.docx` must be a readable WordprocessingML package
//!
//! Files that fail are moved into a quarantine directory ("Mismatched Files").
//! A name already present in quarantine is never overwritten; the file stays
//! where it is and the scan reports a collision instead.
//!
//! ```no_run
//! use std::path::Path;
//! use sieve_core::{ScanConfig, scan_directory};
//!
//! let config = ScanConfig::default();
//! let report = scan_directory(Path::new("."), &config)?;
//! for record in &report.records {
//!     println!("{} -> {}", record.original.display(), record.destination.display());
//! }
//! # Ok::<(), sieve_core::CoreError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod file_types;
pub mod fs;
pub mod pipeline;
pub mod registry;
pub mod relocator;
pub mod validators;

pub use classifier::{Classification, ValidationVerdict, classify, judge};
pub use config::ScanConfig;
pub use diagnostics::{ConfigError, CoreError, CoreResult, Notice, NoticeKind, NoticeLevel};
pub use file_types::{ALLOWED_EXTENSIONS, FileType, detect_file_type};
pub use pipeline::{
    FileOutcome, NoopObserver, ScanObserver, ScanReport, scan_directory, scan_directory_with,
};
pub use registry::{ValidatorFactory, ValidatorRegistry};
pub use relocator::{QuarantineRecord, RelocationOutcome, Relocator};
pub use validators::Validator;
