//! FileType enum for validator dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extension class of a scanned file.
///
/// Each variant except [`FileType::Unsupported`] maps to exactly one
/// validator registered in the [`ValidatorRegistry`](crate::ValidatorRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// `.txt`
    PlainText,
    /// `.png`
    Png,
    /// `.jpg`
    Jpeg,
    /// `.pdf`
    Pdf,
    /// `.docx`
    Docx,
    /// Anything outside the allow-list; never validated
    Unsupported,
}

impl FileType {
    /// Returns `true` if files of this type are checked at all.
    #[must_use]
    pub fn is_validatable(self) -> bool {
        !matches!(self, FileType::Unsupported)
    }

    /// Returns `true` for the text class, whose failures are encoding
    /// mismatches rather than structural corruption.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, FileType::PlainText)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileType::PlainText => "PlainText",
            FileType::Png => "Png",
            FileType::Jpeg => "Jpeg",
            FileType::Pdf => "Pdf",
            FileType::Docx => "Docx",
            FileType::Unsupported => "Unsupported",
        })
    }
}
