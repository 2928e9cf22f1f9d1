//! Text encoding check for `.txt` files

use std::path::Path;

use super::{ValidationFailure, Validator};
use crate::config::ScanConfig;

/// Encoding labels accepted as UTF-8 text. The detector reports pure 7-bit
/// input as `ascii`, which is a strict subset of UTF-8.
const UTF8_LABELS: &[&str] = &["utf-8", "utf8", "utf-8-sig", "ascii"];

/// Flags `.txt` files whose bytes are not confidently UTF-8.
///
/// Runs statistical encoding detection over the whole file. The file passes
/// only when the detected encoding is UTF-8 (or ASCII) with a confidence
/// strictly above [`ScanConfig::text_confidence_threshold`].
pub struct TextValidator;

impl Validator for TextValidator {
    fn validate(&self, path: &Path, config: &ScanConfig) -> Result<(), ValidationFailure> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(ValidationFailure::Empty);
        }

        let (encoding, confidence, _language) = chardet::detect(&bytes);
        if is_utf8_label(&encoding) && confidence > config.text_confidence_threshold() {
            Ok(())
        } else {
            Err(ValidationFailure::EncodingMismatch {
                encoding,
                confidence,
            })
        }
    }
}

fn is_utf8_label(label: &str) -> bool {
    UTF8_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label))
}
