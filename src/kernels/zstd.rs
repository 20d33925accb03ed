//! Zstandard compression of bit-packed frames.
//!
//! This is not part of the firmware format. It gives the encode report a
//! general-purpose baseline to compare the run-length and codebook streams
//! against. This module is a safe, panic-free wrapper around the `zstd` crate.

use crate::error::MonovidError;

/// Compresses `input_bytes`, prefixing the result with the uncompressed length (u64 LE).
pub fn encode(input_bytes: &[u8], level: i32) -> Result<Vec<u8>, MonovidError> {
    if input_bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut output_buf = Vec::with_capacity(input_bytes.len() / 2 + 8);
    output_buf.extend_from_slice(&(input_bytes.len() as u64).to_le_bytes());

    let mut encoder = zstd::stream::Encoder::new(&mut output_buf, level)
        .map_err(|e| MonovidError::ZstdError(e.to_string()))?;
    std::io::Write::write_all(&mut encoder, input_bytes)
        .map_err(|e| MonovidError::ZstdError(e.to_string()))?;
    // `finish` is essential to finalize the Zstd frame.
    encoder
        .finish()
        .map_err(|e| MonovidError::ZstdError(e.to_string()))?;

    Ok(output_buf)
}

//==================================================================================
// Unit Tests
//==================================================================================
