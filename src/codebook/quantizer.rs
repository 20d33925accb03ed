//! Nearest-codeword search under Hamming distance.

use crate::error::MonovidError;
use crate::kernels::tiles::extract_tiles;
use crate::types::{Frame, Tile};

use super::Codebook;

/// The index and distance of the codeword closest to `tile`.
///
/// Uses a strict `<` so that among equally distant codewords the lowest index
/// wins. Returns `None` only for an empty codeword set.
#[inline]
pub fn nearest(tile: Tile, codewords: &[Tile]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (index, codeword) in codewords.iter().enumerate() {
        let distance = tile.distance(*codeword);
        match best {
            Some((_, d)) if distance >= d => {}
            _ => {
                best = Some((index, distance));
                if distance == 0 {
                    break;
                }
            }
        }
    }
    best
}

/// One frame expressed as codeword indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantization {
    pub indices: Vec<u16>,
    /// Total mismatched pixels between the frame and its reconstruction.
    pub distortion: u64,
}

/// Maps already-extracted tiles to codeword indices.
pub fn quantize_tiles(tiles: &[Tile], codebook: &Codebook) -> Result<Quantization, MonovidError> {
    let mut indices = Vec::with_capacity(tiles.len());
    let mut distortion = 0u64;
    for tile in tiles {
        let (index, distance) = codebook.nearest(*tile).ok_or_else(|| {
            MonovidError::InternalError("Quantizing against an empty codebook".into())
        })?;
        let index = u16::try_from(index).map_err(|_| {
            MonovidError::InternalError(format!("Codeword index {} exceeds u16", index))
        })?;
        indices.push(index);
        distortion += u64::from(distance);
    }
    Ok(Quantization {
        indices,
        distortion,
    })
}

/// Extracts the tiles of `frame` and quantizes them against `codebook`.
pub fn quantize_frame(frame: &Frame, codebook: &Codebook) -> Result<Quantization, MonovidError> {
    let tiles = extract_tiles(frame, codebook.shape())?;
    quantize_tiles(&tiles, codebook)
}
