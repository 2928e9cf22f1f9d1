//! Structural PNG verification
//!
//! Walks the chunk stream without decoding pixel data: signature, chunk
//! framing, CRC of every chunk, IHDR first, IEND present. Bytes after IEND
//! are ignored.

use std::path::Path;

use thiserror::Error;

use super::{ValidationFailure, Validator};
use crate::config::ScanConfig;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const IHDR: [u8; 4] = *b"IHDR";
const IEND: [u8; 4] = *b"IEND";
const IHDR_LEN: usize = 13;
/// Chunk lengths are limited to 2^31 - 1 by the format.
const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PngDefect {
    #[error("missing PNG signature")]
    BadSignature,
    #[error("truncated chunk at offset {offset}")]
    Truncated { offset: usize },
    #[error("invalid chunk length at offset {offset}")]
    InvalidChunkLength { offset: usize },
    #[error("CRC mismatch in {} chunk at offset {offset}", String::from_utf8_lossy(chunk_type))]
    CrcMismatch { offset: usize, chunk_type: [u8; 4] },
    #[error("first chunk is not IHDR")]
    MissingIhdr,
    #[error("IHDR chunk is malformed")]
    InvalidIhdr,
    #[error("no IEND chunk")]
    MissingIend,
}

/// Verify the chunk structure of an in-memory PNG.
pub fn verify_png(data: &[u8]) -> Result<(), PngDefect> {
    if data.len() < PNG_SIGNATURE.len() || data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(PngDefect::BadSignature);
    }

    let mut offset = PNG_SIGNATURE.len();
    let mut first = true;

    while offset < data.len() {
        // length (4) + type (4) at minimum
        let header = data
            .get(offset..offset + 8)
            .ok_or(PngDefect::Truncated { offset })?;
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        if length > MAX_CHUNK_LEN {
            return Err(PngDefect::InvalidChunkLength { offset });
        }
        let chunk_type = [header[4], header[5], header[6], header[7]];

        let data_start = offset + 8;
        let data_end = data_start + length as usize;
        let crc_bytes = data
            .get(data_end..data_end + 4)
            .ok_or(PngDefect::Truncated { offset })?;
        let stored_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&chunk_type);
        hasher.update(&data[data_start..data_end]);
        if hasher.finalize() != stored_crc {
            return Err(PngDefect::CrcMismatch { offset, chunk_type });
        }

        if first {
            if chunk_type != IHDR {
                return Err(PngDefect::MissingIhdr);
            }
            check_ihdr(&data[data_start..data_end])?;
            first = false;
        }

        if chunk_type == IEND {
            return Ok(());
        }

        offset = data_end + 4;
    }

    if first {
        Err(PngDefect::MissingIhdr)
    } else {
        Err(PngDefect::MissingIend)
    }
}

fn check_ihdr(body: &[u8]) -> Result<(), PngDefect> {
    if body.len() != IHDR_LEN {
        return Err(PngDefect::InvalidIhdr);
    }
    let width = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    let height = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
    if width == 0 || height == 0 || width > MAX_CHUNK_LEN || height > MAX_CHUNK_LEN {
        return Err(PngDefect::InvalidIhdr);
    }
    Ok(())
}

/// Flags `.png` files whose chunk structure does not verify.
pub struct PngValidator;

impl Validator for PngValidator {
    fn validate(&self, path: &Path, _config: &ScanConfig) -> Result<(), ValidationFailure> {
        let data = std::fs::read(path)?;
        verify_png(&data)?;
        Ok(())
    }
}
