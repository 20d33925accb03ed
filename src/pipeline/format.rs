// In: src/pipeline/format.rs

//! Defines the on-disk constants and header contract for monovid artifacts.
//! The header is stored as JSON so that `inspect` output and the binary file
//! describe an encoding with the same field names.

use serde::{Deserialize, Serialize};

use crate::config::EncodingMode;
use crate::error::MonovidError;
use crate::kernels::rle::RunLayout;
use crate::types::TileShape;

/// The magic number at the start of every artifact.
pub const ARTIFACT_MAGIC: &[u8; 4] = b"MVAF";
/// The current version of the artifact container.
pub const ARTIFACT_FORMAT_VERSION: u16 = 1;

/// Number of array records that follow the header, always in this order.
pub const ARRAY_COUNT: usize = 4;

/// Record slots in the container.
pub const RAW_CODEBOOK: usize = 0;
pub const PACKED_CODEBOOK: usize = 1;
pub const ENCODED_STREAM: usize = 2;
pub const FRAME_INDEXES: usize = 3;

pub const ARRAY_NAMES: [&str; ARRAY_COUNT] = [
    "raw_codebook",
    "packed_codebook",
    "encoded_stream",
    "frame_indexes",
];

/// Everything a decoder needs to interpret the four arrays.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub mode: EncodingMode,
    pub frame_width: usize,
    pub frame_height: usize,
    pub tile: TileShape,
    pub frame_count: usize,
    /// Number of codewords; 0 for the pixel modes.
    pub codebook_size: usize,
    pub layout: RunLayout,
    /// Version of the crate that wrote the artifact.
    pub writer_version: String,
}

impl ArtifactHeader {
    /// Checks the header on its own: word layout, tile shape and frame
    /// geometry. Runs before any array is interpreted.
    pub fn validate(&self) -> Result<(), MonovidError> {
        self.layout.validate()?;
        self.tile.validate()?;
        let pixels = self.pixels_per_frame()?;
        if pixels == 0 {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Frame size {}x{} has no pixels",
                self.frame_width, self.frame_height
            )));
        }
        if self.mode == EncodingMode::Dictionary {
            self.tile.check_frame(self.frame_width, self.frame_height)?;
        }
        Ok(())
    }

    /// Codeword indices per frame in dictionary mode, 0 otherwise.
    pub fn tiles_per_frame(&self) -> usize {
        match self.mode {
            EncodingMode::Dictionary => self.tile.tiles_per_frame(self.frame_width, self.frame_height),
            EncodingMode::RawPixels | EncodingMode::Differential => 0,
        }
    }

    pub fn pixels_per_frame(&self) -> Result<usize, MonovidError> {
        self.frame_width
            .checked_mul(self.frame_height)
            .ok_or_else(|| {
                MonovidError::ArtifactFormatError(format!(
                    "Frame size {}x{} overflows",
                    self.frame_width, self.frame_height
                ))
            })
    }

    /// Symbols one frame of the stream decodes to: codeword indices in
    /// dictionary mode, pixels otherwise.
    pub fn symbols_per_frame(&self) -> Result<usize, MonovidError> {
        match self.mode {
            EncodingMode::Dictionary => Ok(self.tiles_per_frame()),
            EncodingMode::RawPixels | EncodingMode::Differential => self.pixels_per_frame(),
        }
    }
}
