//! PDF check: the document structure must parse

use std::path::Path;

use super::{ValidationFailure, Validator};
use crate::config::ScanConfig;

/// Flags `.pdf` files that cannot be loaded as a PDF document.
pub struct PdfValidator;

impl Validator for PdfValidator {
    fn validate(&self, path: &Path, _config: &ScanConfig) -> Result<(), ValidationFailure> {
        lopdf::Document::load(path)?;
        Ok(())
    }
}
