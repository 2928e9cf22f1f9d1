//! Per-file classification: detect type, run the validator, quarantine on a
//! positive result.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::diagnostics::CoreResult;
use crate::file_types::{FileType, detect_file_type};
use crate::registry::ValidatorRegistry;
use crate::relocator::{RelocationOutcome, Relocator};
use crate::validators;

/// Verdict for one file, produced once and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationVerdict {
    Valid,
    Corrupted,
    /// A `.txt` file that is not confidently UTF-8.
    EncodingMismatch,
    /// Not on the allow-list, or its validator is disabled.
    Skipped,
}

impl ValidationVerdict {
    /// Returns `true` for the verdicts that send a file to quarantine.
    pub fn is_flagged(self) -> bool {
        matches!(self, Self::Corrupted | Self::EncodingMismatch)
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "valid",
            Self::Corrupted => "corrupted",
            Self::EncodingMismatch => "encoding mismatch",
            Self::Skipped => "skipped",
        })
    }
}

/// Classification of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub path: PathBuf,
    pub file_type: FileType,
    pub verdict: ValidationVerdict,
    /// Present only when the verdict was flagged and relocation was attempted.
    pub relocation: Option<RelocationOutcome>,
}

/// Detect, validate and judge a file without moving it.
pub fn judge(path: &Path, registry: &ValidatorRegistry, config: &ScanConfig) -> (FileType, ValidationVerdict) {
    let file_type = detect_file_type(path);

    let Some(validator) = registry.validator_for(file_type) else {
        return (file_type, ValidationVerdict::Skipped);
    };

    let verdict = if !validators::is_invalid(validator, path, config) {
        ValidationVerdict::Valid
    } else if file_type.is_text() {
        ValidationVerdict::EncodingMismatch
    } else {
        ValidationVerdict::Corrupted
    };
    (file_type, verdict)
}

/// Classify `path` and hand flagged files to the relocator.
///
/// Validator failures never surface here; they are already folded into the
/// verdict. The only error is a failed move.
pub fn classify(
    path: &Path,
    registry: &ValidatorRegistry,
    relocator: &Relocator,
    config: &ScanConfig,
) -> CoreResult<Classification> {
    let (file_type, verdict) = judge(path, registry, config);

    let relocation = if verdict.is_flagged() {
        Some(relocator.relocate(path, verdict)?)
    } else {
        tracing::debug!(path = %path.display(), %verdict, "No action needed");
        None
    };

    Ok(Classification {
        path: path.to_path_buf(),
        file_type,
        verdict,
        relocation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::fixtures;
    use tempfile::TempDir;

    struct Env {
        _temp: TempDir,
        scan: PathBuf,
        relocator: Relocator,
        registry: ValidatorRegistry,
        config: ScanConfig,
    }

    fn env() -> Env {
        let temp = TempDir::new().unwrap();
        let scan = temp.path().join("scan");
        std::fs::create_dir_all(&scan).unwrap();
        let relocator = Relocator::new(temp.path().join("quarantine")).unwrap();
        Env {
            _temp: temp,
            scan,
            relocator,
            registry: ValidatorRegistry::with_defaults(),
            config: ScanConfig::default(),
        }
    }

    impl Env {
        fn classify(&self, path: &Path) -> Classification {
            classify(path, &self.registry, &self.relocator, &self.config).unwrap()
        }
    }

    #[test]
    fn test_unsupported_is_skipped_and_left_in_place() {
        let env = env();
        let path = env.scan.join("binary.exe");
        std::fs::write(&path, [0u8, 159, 146, 150]).unwrap();

        let result = env.classify(&path);
        assert_eq!(result.file_type, FileType::Unsupported);
        assert_eq!(result.verdict, ValidationVerdict::Skipped);
        assert!(result.relocation.is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_text_file_stays() {
        let env = env();
        let path = env.scan.join("notes.txt");
        std::fs::write(&path, "Shopping list: eggs, milk, bread.\n").unwrap();

        let result = env.classify(&path);
        assert_eq!(result.verdict, ValidationVerdict::Valid);
        assert!(path.exists());
    }

    #[test]
    fn test_binary_txt_is_encoding_mismatch_and_moved() {
        let env = env();
        let path = env.scan.join("secret.TXT");
        fixtures::write_png(&path);

        let result = env.classify(&path);
        assert_eq!(result.file_type, FileType::PlainText);
        assert_eq!(result.verdict, ValidationVerdict::EncodingMismatch);
        assert!(matches!(result.relocation, Some(RelocationOutcome::Moved(_))));
        assert!(!path.exists());
        assert!(env.relocator.quarantine_dir().join("secret.TXT").exists());
    }

    #[test]
    fn test_garbage_png_is_corrupted_and_moved() {
        let env = env();
        let path = env.scan.join("holiday.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n truncated").unwrap();

        let result = env.classify(&path);
        assert_eq!(result.verdict, ValidationVerdict::Corrupted);
        assert!(!path.exists());
    }

    #[test]
    fn test_well_formed_binaries_are_valid() {
        let env = env();
        let png = env.scan.join("a.png");
        let jpg = env.scan.join("b.jpg");
        let pdf = env.scan.join("c.pdf");
        let docx = env.scan.join("d.docx");
        fixtures::write_png(&png);
        fixtures::write_jpeg(&jpg);
        fixtures::write_pdf(&pdf);
        fixtures::write_docx(&docx);

        for path in [&png, &jpg, &pdf, &docx] {
            let result = env.classify(path);
            assert_eq!(result.verdict, ValidationVerdict::Valid, "{}", path.display());
            assert!(path.exists());
        }
        assert!(env.relocator.records().is_empty());
    }

    #[test]
    fn test_disabled_validator_skips() {
        let mut env = env();
        env.registry.disable_validator("PdfValidator");
        let path = env.scan.join("broken.pdf");
        std::fs::write(&path, "nope").unwrap();

        let result = env.classify(&path);
        assert_eq!(result.verdict, ValidationVerdict::Skipped);
        assert!(path.exists());
    }

    #[test]
    fn test_verdict_flags() {
        assert!(ValidationVerdict::Corrupted.is_flagged());
        assert!(ValidationVerdict::EncodingMismatch.is_flagged());
        assert!(!ValidationVerdict::Valid.is_flagged());
        assert!(!ValidationVerdict::Skipped.is_flagged());
        assert_eq!(ValidationVerdict::EncodingMismatch.to_string(), "encoding mismatch");
    }
}
