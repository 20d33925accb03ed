//! This module contains the kernels for MSB-first bit-packing of binary pixels.
//!
//! Pixel `i` of a row goes to bit `7 - (i % 8)` of byte `i / 8`, which is the
//! layout the display's 1-bit indexed image format expects. Trailing bits of a
//! partially filled last byte are zero.

use bitvec::prelude::*;

use crate::types::{Frame, Tile, TileShape};

/// Packs 0/1 pixels into bytes, most significant bit first.
pub fn pack_pixels<I>(pixels: I) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
{
    let mut bits: BitVec<u8, Msb0> = pixels.into_iter().map(|p| p != 0).collect();
    bits.set_uninitialized(false);
    bits.into_vec()
}

/// Packs every codeword into `shape.packed_len()` bytes, one row per codeword.
pub fn pack_codewords(codewords: &[Tile], shape: TileShape) -> Vec<u8> {
    let mut packed = Vec::with_capacity(codewords.len() * shape.packed_len());
    for tile in codewords {
        packed.extend(pack_pixels(tile.to_pixels(shape.len())));
    }
    packed
}

/// Packs a sequence of frames back to back, each frame padded to a whole byte.
pub fn pack_frames(frames: &[Frame]) -> Vec<u8> {
    let mut packed = Vec::with_capacity(
        frames
            .iter()
            .map(|f| (f.pixel_count() + 7) / 8)
            .sum::<usize>(),
    );
    for frame in frames {
        packed.extend(pack_pixels(frame.iter_pixels()));
    }
    packed
}

//==================================================================================
// Unit Tests
//==================================================================================
