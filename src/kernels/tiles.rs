//! Tile extraction and reassembly.
//!
//! Tiles are produced in row-major block order: the top-left block first, then
//! left to right, then top to bottom. Inside a tile, pixels are also row-major.
//! `assemble_tiles` is the exact inverse of `extract_tiles`.

use ndarray::Array2;

use crate::error::MonovidError;
use crate::types::{Frame, Tile, TileShape};

/// Partitions `frame` into non-overlapping tiles of `shape`.
pub fn extract_tiles(frame: &Frame, shape: TileShape) -> Result<Vec<Tile>, MonovidError> {
    shape.check_frame(frame.width(), frame.height())?;
    if shape.len() > Tile::MAX_PIXELS {
        return Err(MonovidError::InvalidConfig(format!(
            "A {}x{} tile does not fit in {} bits",
            shape.rows,
            shape.cols,
            Tile::MAX_PIXELS
        )));
    }

    let mut tiles = Vec::with_capacity(shape.tiles_per_frame(frame.width(), frame.height()));
    let view = frame.view();
    for block in view.exact_chunks((shape.rows, shape.cols)) {
        tiles.push(Tile::from_pixels(block.iter().copied()));
    }
    Ok(tiles)
}

/// Rebuilds a `width` x `height` frame from tiles in extraction order.
pub fn assemble_tiles(
    tiles: &[Tile],
    shape: TileShape,
    width: usize,
    height: usize,
) -> Result<Frame, MonovidError> {
    shape.check_frame(width, height)?;
    let expected = shape.tiles_per_frame(width, height);
    if tiles.len() != expected {
        return Err(MonovidError::DimensionMismatch(format!(
            "A {}x{} frame needs {} tiles, got {}",
            width,
            height,
            expected,
            tiles.len()
        )));
    }

    let mut pixels = Array2::<u8>::zeros((height, width));
    for (mut block, tile) in pixels
        .exact_chunks_mut((shape.rows, shape.cols))
        .into_iter()
        .zip(tiles)
    {
        for (i, px) in block.iter_mut().enumerate() {
            *px = tile.pixel(i);
        }
    }
    Ok(Frame::new(pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_frame(rng: &mut StdRng, width: usize, height: usize) -> Frame {
        let pixels = (0..width * height).map(|_| rng.random_range(0..2u8)).collect();
        Frame::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_block_order_is_row_major() {
        // 8x4 frame, 4x4 tiles: left block all ones, right block all zeros.
        let mut pixels = vec![0u8; 32];
        for row in 0..4 {
            for col in 0..4 {
                pixels[row * 8 + col] = 1;
            }
        }
        let frame = Frame::from_pixels(8, 4, pixels).unwrap();
        let tiles = extract_tiles(&frame, TileShape::FOUR).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].count_set(), 16);
        assert_eq!(tiles[1].count_set(), 0);
    }

    #[test]
    fn test_blocks_go_across_before_down() {
        // 8x8 frame, 4x4 tiles: only the top-right block is set.
        let mut pixels = vec![0u8; 64];
        for row in 0..4 {
            for col in 4..8 {
                pixels[row * 8 + col] = 1;
            }
        }
        let frame = Frame::from_pixels(8, 8, pixels).unwrap();
        let tiles = extract_tiles(&frame, TileShape::FOUR).unwrap();
        let counts: Vec<u32> = tiles.iter().map(|t| t.count_set()).collect();
        assert_eq!(counts, vec![0, 16, 0, 0]);

        let rebuilt = assemble_tiles(
            &[Tile::default(), Tile::default(), Tile::from_raw(u64::MAX), Tile::default()],
            TileShape::FOUR,
            8,
            8,
        )
        .unwrap();
        // The third tile lands bottom-left.
        assert_eq!(rebuilt.view()[[4, 0]], 1);
        assert_eq!(rebuilt.view()[[0, 4]], 0);
        assert_eq!(rebuilt.view()[[4, 4]], 0);
    }

    #[test]
    fn test_pixels_inside_a_tile_are_row_major() {
        let mut pixels = vec![0u8; 16];
        pixels[1] = 1; // row 0, col 1
        pixels[4] = 1; // row 1, col 0
        let frame = Frame::from_pixels(4, 4, pixels).unwrap();
        let tiles = extract_tiles(&frame, TileShape::FOUR).unwrap();
        let flat = tiles[0].to_pixels(16);
        assert_eq!(flat[1], 1);
        assert_eq!(flat[4], 1);
        assert_eq!(flat.iter().filter(|&&p| p == 1).count(), 2);
    }

    #[test]
    fn test_extract_assemble_roundtrip() {
        let mut rng = StdRng::seed_from_u64(11);
        for (shape, width, height) in [
            (TileShape::EIGHT, 64, 64),
            (TileShape::EIGHT, 128, 64),
            (TileShape::FOUR, 36, 20),
        ] {
            let frame = random_frame(&mut rng, width, height);
            let tiles = extract_tiles(&frame, shape).unwrap();
            assert_eq!(tiles.len(), shape.tiles_per_frame(width, height));
            let rebuilt = assemble_tiles(&tiles, shape, width, height).unwrap();
            assert_eq!(rebuilt, frame);
        }
    }

    #[test]
    fn test_uneven_frame_is_rejected() {
        let frame = Frame::blank(68, 64);
        let result = extract_tiles(&frame, TileShape::EIGHT);
        assert!(matches!(result, Err(MonovidError::DimensionMismatch(_))));
    }

    #[test]
    fn test_assemble_rejects_wrong_tile_count() {
        let result = assemble_tiles(&[Tile::default(); 3], TileShape::EIGHT, 16, 16);
        assert!(matches!(result, Err(MonovidError::DimensionMismatch(_))));
    }
}
