//! DOCX check: the OPC package must open and hold a well-formed main document part

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use super::{ValidationFailure, Validator};
use crate::config::ScanConfig;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const MAIN_DOCUMENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Flags `.docx` files that are not a zip package, lack a WordprocessingML
/// main part, or whose content types or main part are not well-formed XML.
pub struct DocxValidator;

impl Validator for DocxValidator {
    fn validate(&self, path: &Path, _config: &ScanConfig) -> Result<(), ValidationFailure> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| ValidationFailure::Docx(format!("not a zip package: {}", e)))?;

        let content_types = read_part(&mut archive, CONTENT_TYPES_PART)?;
        let part_name = main_part_name(&content_types)?;

        let document = read_part(&mut archive, part_name.trim_start_matches('/'))?;
        let document = parse_part(&part_name, &document)?;
        if document.root_element().tag_name().name() != "document" {
            return Err(ValidationFailure::Docx(format!(
                "{} has no document root element",
                part_name
            )));
        }
        Ok(())
    }
}

/// Read a package part fully; the zip reader verifies the CRC at the end.
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, ValidationFailure> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ValidationFailure::Docx(format!("{}: {}", name, e)))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| ValidationFailure::Docx(format!("{}: {}", name, e)))?;
    Ok(content)
}

fn parse_part<'a>(name: &str, xml: &'a str) -> Result<roxmltree::Document<'a>, ValidationFailure> {
    roxmltree::Document::parse(xml.trim_start_matches('\u{feff}'))
        .map_err(|e| ValidationFailure::Docx(format!("{}: malformed XML: {}", name, e)))
}

/// `PartName` of the `<Override>` declaring the main document content type.
fn main_part_name(content_types: &str) -> Result<String, ValidationFailure> {
    let types = parse_part(CONTENT_TYPES_PART, content_types)?;
    types
        .root_element()
        .children()
        .filter(|node| node.has_tag_name((CONTENT_TYPES_NS, "Override")))
        .find(|node| node.attribute("ContentType") == Some(MAIN_DOCUMENT_TYPE))
        .and_then(|node| node.attribute("PartName"))
        .map(str::to_string)
        .ok_or_else(|| {
            ValidationFailure::Docx("no WordprocessingML main document part declared".to_string())
        })
}
