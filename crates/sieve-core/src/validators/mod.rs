//! Format validators
//!
//! One validator per supported [`FileType`](crate::FileType). Each answers a
//! single question: is this file corrupted (or, for text, not the encoding it
//! claims)? Validators report *why* through [`ValidationFailure`]; the
//! fail-closed policy that turns every failure into an "invalid" verdict is
//! applied once, in [`is_invalid`].

pub mod docx;
pub mod jpeg;
pub mod pdf;
pub mod png;
pub mod text;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use thiserror::Error;

use crate::config::ScanConfig;

pub use docx::DocxValidator;
pub use jpeg::JpegValidator;
pub use pdf::PdfValidator;
pub use png::PngValidator;
pub use text::TextValidator;

/// Extract the short (unqualified) type name from `std::any::type_name`.
///
/// Given `"sieve_core::validators::png::PngValidator"`, returns
/// `"PngValidator"`. Generic suffixes are stripped first.
fn short_type_name<T: ?Sized + 'static>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Why a file failed validation.
#[derive(Error, Debug)]
pub enum ValidationFailure {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is empty")]
    Empty,

    #[error("detected encoding '{encoding}' with confidence {confidence:.2}")]
    EncodingMismatch { encoding: String, confidence: f32 },

    #[error("png structure: {0}")]
    Png(#[from] png::PngDefect),

    #[error("no JPEG end-of-image marker")]
    MissingEndOfImage,

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("pdf parse failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("docx package: {0}")]
    Docx(String),

    #[error("validator panicked: {0}")]
    Panicked(String),
}

impl ValidationFailure {
    /// Returns `true` when the failure is an ordinary negative verdict
    /// rather than a read or parse error.
    pub fn is_verdict(&self) -> bool {
        matches!(self, Self::EncodingMismatch { .. } | Self::Empty)
    }
}

/// Trait for format validators.
///
/// Implementors inspect the file on disk and return `Ok(())` only when the
/// content positively matches the claimed format. Any doubt must be an `Err`.
pub trait Validator: Send + Sync + 'static {
    /// Check the file at `path`.
    fn validate(&self, path: &Path, config: &ScanConfig) -> Result<(), ValidationFailure>;

    /// Short name used for `disabled_validators` filtering. Defaults to the
    /// unqualified struct name (e.g. `"PngValidator"`).
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Run `validator` against `path` and apply the fail-closed policy.
///
/// Returns `true` when the file is invalid. Read errors, parse errors and
/// panics raised inside decoding libraries all count as invalid and are
/// logged; nothing is propagated.
pub fn is_invalid(validator: &dyn Validator, path: &Path, config: &ScanConfig) -> bool {
    let outcome = catch_unwind(AssertUnwindSafe(|| validator.validate(path, config)))
        .unwrap_or_else(|payload| Err(ValidationFailure::Panicked(panic_message(payload))));

    match outcome {
        Ok(()) => false,
        Err(failure) if failure.is_verdict() => {
            tracing::info!(
                path = %path.display(),
                validator = validator.name(),
                "{}",
                failure
            );
            true
        }
        Err(failure) => {
            tracing::error!(
                path = %path.display(),
                validator = validator.name(),
                "Error checking {}: {}",
                path.display(),
                failure
            );
            true
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
