//! Extension-based file type detection.
//!
//! Detection is path-based only and never touches the filesystem, so it can
//! run before a file is opened (and for files that cannot be opened at all).

use std::path::Path;

use super::types::FileType;

/// Extensions (lowercase, with leading dot) that are validated.
///
/// Everything else is [`FileType::Unsupported`] and left untouched. Note that
/// `.jpeg` is deliberately absent: only `.jpg` is recognised.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".txt", ".png", ".jpg", ".pdf", ".docx"];

/// Detect the file type from the path suffix, case-insensitively.
///
/// Dotfiles without a further extension (`.txt` on its own) have no
/// extension and are unsupported.
pub fn detect_file_type(path: &Path) -> FileType {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileType::Unsupported;
    };

    match ext.to_ascii_lowercase().as_str() {
        "txt" => FileType::PlainText,
        "png" => FileType::Png,
        "jpg" => FileType::Jpeg,
        "pdf" => FileType::Pdf,
        "docx" => FileType::Docx,
        _ => FileType::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_allowed_extensions() {
        assert_eq!(detect_file_type(Path::new("notes.txt")), FileType::PlainText);
        assert_eq!(detect_file_type(Path::new("a/b/logo.png")), FileType::Png);
        assert_eq!(detect_file_type(Path::new("photo.jpg")), FileType::Jpeg);
        assert_eq!(detect_file_type(Path::new("paper.pdf")), FileType::Pdf);
        assert_eq!(detect_file_type(Path::new("letter.docx")), FileType::Docx);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(detect_file_type(Path::new("README.TXT")), FileType::PlainText);
        assert_eq!(detect_file_type(Path::new("IMG_0001.JPG")), FileType::Jpeg);
        assert_eq!(detect_file_type(Path::new("Scan.Pdf")), FileType::Pdf);
    }

    #[test]
    fn test_detect_uses_last_suffix_only() {
        assert_eq!(detect_file_type(Path::new("archive.txt.gz")), FileType::Unsupported);
        assert_eq!(detect_file_type(Path::new("backup.pdf.txt")), FileType::PlainText);
    }

    #[test]
    fn test_detect_unsupported() {
        assert_eq!(detect_file_type(Path::new("main.rs")), FileType::Unsupported);
        assert_eq!(detect_file_type(Path::new("photo.jpeg")), FileType::Unsupported);
        assert_eq!(detect_file_type(Path::new("Makefile")), FileType::Unsupported);
        assert_eq!(detect_file_type(Path::new(".txt")), FileType::Unsupported);
        assert_eq!(detect_file_type(Path::new("doc.doc")), FileType::Unsupported);
    }

    #[test]
    fn test_allow_list_matches_detection() {
        for ext in ALLOWED_EXTENSIONS {
            let name = format!("file{}", ext);
            assert!(
                detect_file_type(Path::new(&name)).is_validatable(),
                "{} should be validatable",
                name
            );
        }
    }
}
