//! JPEG check: end-of-image marker plus a decode of the bytes up to it

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};

use super::{ValidationFailure, Validator};
use crate::config::ScanConfig;

const EOI_MARKER: [u8; 2] = [0xFF, 0xD9];

/// Offset one past the first end-of-image marker, if any.
pub fn end_of_image(data: &[u8]) -> Option<usize> {
    data.windows(EOI_MARKER.len())
        .position(|w| w == EOI_MARKER)
        .map(|pos| pos + EOI_MARKER.len())
}

/// Flags `.jpg` files that have no end-of-image marker or whose bytes up to
/// the first marker do not decode.
pub struct JpegValidator;

impl Validator for JpegValidator {
    fn validate(&self, path: &Path, _config: &ScanConfig) -> Result<(), ValidationFailure> {
        let data = std::fs::read(path)?;
        let end = end_of_image(&data).ok_or(ValidationFailure::MissingEndOfImage)?;
        decode(&data[..end])?;
        Ok(())
    }
}

/// Decode without allocation limits, so a large but intact photo is not
/// mistaken for a corrupt one.
fn decode(data: &[u8]) -> Result<(), image::ImageError> {
    let mut reader = ImageReader::with_format(Cursor::new(data), ImageFormat::Jpeg);
    reader.no_limits();
    reader.decode()?;
    Ok(())
}
