//! File type detection for validator dispatch.
//!
//! This module provides:
//!
//! - [`FileType`] -- enum of the extension classes the scanner recognises
//! - [`detect_file_type`] -- path-based detection (no I/O)
//! - [`ALLOWED_EXTENSIONS`] -- the fixed allow-list, lowercase with leading dot

mod detection;
mod types;

pub use detection::{ALLOWED_EXTENSIONS, detect_file_type};
pub use types::FileType;
