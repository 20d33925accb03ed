//! Fixed-size square tiles and their geometry.
//!
//! A tile is stored packed in a single `u64`: pixel `i` of the row-major
//! flattened tile lives at bit `63 - i`. With this layout the Hamming distance
//! between two tiles is one `popcount`, and the big-endian bytes of the word are
//! exactly the MSB-first packed row that the firmware reads.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::MonovidError;

//==================================================================================
// 1. Tile Geometry
//==================================================================================

/// The dimensions of a tile in pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileShape {
    pub rows: usize,
    pub cols: usize,
}

impl TileShape {
    /// 8x8 tiles, one byte per tile row.
    pub const EIGHT: TileShape = TileShape { rows: 8, cols: 8 };
    /// 4x4 tiles, packed into two bytes.
    pub const FOUR: TileShape = TileShape { rows: 4, cols: 4 };

    /// Builds a shape, rejecting anything but the supported square sizes.
    pub fn new(rows: usize, cols: usize) -> Result<Self, MonovidError> {
        let shape = TileShape { rows, cols };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<(), MonovidError> {
        if *self == Self::EIGHT || *self == Self::FOUR {
            Ok(())
        } else {
            Err(MonovidError::InvalidConfig(format!(
                "Unsupported tile shape {}x{}; only 8x8 and 4x4 tiles are supported",
                self.rows, self.cols
            )))
        }
    }

    /// Number of pixels in one tile.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes a tile occupies once packed 8 pixels per byte.
    pub fn packed_len(&self) -> usize {
        (self.len() + 7) / 8
    }

    /// Checks that a `width` x `height` frame partitions evenly into tiles.
    pub fn check_frame(&self, width: usize, height: usize) -> Result<(), MonovidError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MonovidError::DimensionMismatch(format!(
                "Tile shape {}x{} has a zero dimension",
                self.rows, self.cols
            )));
        }
        if height % self.rows != 0 || width % self.cols != 0 {
            return Err(MonovidError::DimensionMismatch(format!(
                "Frame {}x{} (WxH) is not evenly divisible into {}x{} tiles",
                width, height, self.cols, self.rows
            )));
        }
        Ok(())
    }

    /// Number of tiles in a `width` x `height` frame. Assumes `check_frame` passed.
    pub fn tiles_per_frame(&self, width: usize, height: usize) -> usize {
        (width / self.cols) * (height / self.rows)
    }
}

impl Default for TileShape {
    fn default() -> Self {
        Self::EIGHT
    }
}

//==================================================================================
// 2. Packed Tile
//==================================================================================

/// A binary tile of at most 64 pixels, packed MSB-first into a `u64`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct Tile(u64);

impl Tile {
    pub const MAX_PIXELS: usize = 64;

    pub const fn from_raw(raw: u64) -> Self {
        Tile(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Packs a row-major sequence of pixels. Any non-zero value is a set pixel;
    /// pixels past the 64th are ignored.
    pub fn from_pixels<I>(pixels: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut raw = 0u64;
        for (i, px) in pixels.into_iter().take(Self::MAX_PIXELS).enumerate() {
            if px != 0 {
                raw |= 1 << (63 - i);
            }
        }
        Tile(raw)
    }

    /// Value (0 or 1) of pixel `index` in row-major order.
    #[inline]
    pub fn pixel(self, index: usize) -> u8 {
        debug_assert!(index < Self::MAX_PIXELS);
        ((self.0 >> (63 - index)) & 1) as u8
    }

    /// Unpacks the first `len` pixels as 0/1 values.
    pub fn to_pixels(self, len: usize) -> Vec<u8> {
        (0..len.min(Self::MAX_PIXELS)).map(|i| self.pixel(i)).collect()
    }

    /// Number of differing pixels between two tiles.
    #[inline]
    pub fn distance(self, other: Tile) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    pub fn count_set(self) -> u32 {
        self.0.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_roundtrip_keeps_row_major_order() {
        let pixels: Vec<u8> = (0..64).map(|i| ((i * 7) % 3 == 0) as u8).collect();
        let tile = Tile::from_pixels(pixels.iter().copied());
        assert_eq!(tile.to_pixels(64), pixels);
        assert_eq!(tile.pixel(0), 1);
        assert_eq!(tile.raw() >> 63, 1);
    }

    #[test]
    fn test_distance_counts_differing_pixels() {
        let a = Tile::from_pixels([1, 1, 0, 0]);
        let b = Tile::from_pixels([1, 0, 1, 0]);
        assert_eq!(a.distance(b), 2);
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn test_shape_validation() {
        assert!(TileShape::new(8, 8).is_ok());
        assert!(TileShape::new(4, 4).is_ok());
        assert!(matches!(
            TileShape::new(8, 4),
            Err(MonovidError::InvalidConfig(_))
        ));
        assert_eq!(TileShape::FOUR.packed_len(), 2);
        assert_eq!(TileShape::EIGHT.tiles_per_frame(128, 64), 128);
    }

    #[test]
    fn test_check_frame_rejects_uneven_geometry() {
        assert!(TileShape::EIGHT.check_frame(64, 64).is_ok());
        assert!(matches!(
            TileShape::EIGHT.check_frame(68, 64),
            Err(MonovidError::DimensionMismatch(_))
        ));
    }
}
