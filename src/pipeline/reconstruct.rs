//! Decodes an artifact back into binary frames.
//!
//! This is the host-side twin of the firmware player and is used by the
//! `preview` command and the round-trip tests.

use crate::config::EncodingMode;
use crate::error::MonovidError;
use crate::kernels::tiles::assemble_tiles;
use crate::kernels::xor_delta;
use crate::pipeline::artifact::Artifact;
use crate::types::{Frame, Tile};

/// Rebuilds every frame of `artifact` in order.
pub fn reconstruct_frames(artifact: &Artifact) -> Result<Vec<Frame>, MonovidError> {
    let h = &artifact.header;
    match h.mode {
        EncodingMode::Dictionary => {
            let codebook = artifact.codebook.as_ref().ok_or_else(|| {
                MonovidError::ArtifactFormatError("Dictionary artifact without a codebook".into())
            })?;
            let tiles_per_frame = h.tiles_per_frame();
            let mut frames = Vec::with_capacity(h.frame_count);
            for (i, symbols) in artifact.stream.decode_frames()?.into_iter().enumerate() {
                if symbols.len() != tiles_per_frame {
                    return Err(MonovidError::RleDecodeError(format!(
                        "Frame {} decoded to {} indices, expected {}",
                        i,
                        symbols.len(),
                        tiles_per_frame
                    )));
                }
                let tiles = symbols
                    .iter()
                    .map(|&s| {
                        codebook.get(s as usize).ok_or_else(|| {
                            MonovidError::RleDecodeError(format!(
                                "Codeword index {} out of range in frame {}",
                                s, i
                            ))
                        })
                    })
                    .collect::<Result<Vec<Tile>, _>>()?;
                frames.push(assemble_tiles(&tiles, h.tile, h.frame_width, h.frame_height)?);
            }
            Ok(frames)
        }
        EncodingMode::RawPixels => artifact
            .stream
            .decode_frames()?
            .into_iter()
            .map(|symbols| {
                Frame::from_pixels(
                    h.frame_width,
                    h.frame_height,
                    symbols.into_iter().map(|s| s as u8).collect(),
                )
            })
            .collect(),
        EncodingMode::Differential => {
            xor_delta::decode_frames(&artifact.stream, h.frame_width, h.frame_height)
        }
    }
}
