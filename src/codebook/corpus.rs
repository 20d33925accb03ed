//! The tile corpus: every tile seen while scanning the clip.

use std::collections::BTreeSet;

use crate::error::MonovidError;
use crate::kernels::tiles::extract_tiles;
use crate::types::{Frame, Tile, TileShape};

/// Accumulates tiles across frames.
///
/// Unique tiles are kept in a `BTreeSet`, so the clustering input is always in
/// ascending tile order regardless of which frame a tile first appeared in.
#[derive(Debug, Clone)]
pub struct TileCorpus {
    shape: TileShape,
    unique: BTreeSet<Tile>,
    observed: usize,
    frames: usize,
}

impl TileCorpus {
    pub fn new(shape: TileShape) -> Self {
        TileCorpus {
            shape,
            unique: BTreeSet::new(),
            observed: 0,
            frames: 0,
        }
    }

    pub fn shape(&self) -> TileShape {
        self.shape
    }

    /// Extracts every tile of `frame` and records it.
    pub fn observe(&mut self, frame: &Frame) -> Result<(), MonovidError> {
        let tiles = extract_tiles(frame, self.shape)?;
        self.observed += tiles.len();
        self.unique.extend(tiles);
        self.frames += 1;
        Ok(())
    }

    /// Records tiles that were already extracted.
    pub fn extend<I>(&mut self, tiles: I)
    where
        I: IntoIterator<Item = Tile>,
    {
        for tile in tiles {
            self.observed += 1;
            self.unique.insert(tile);
        }
    }

    pub fn unique_count(&self) -> usize {
        self.unique.len()
    }

    /// Total tiles seen, duplicates included.
    pub fn observed_count(&self) -> usize {
        self.observed
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    /// The unique tiles in ascending order.
    pub fn unique_tiles(&self) -> Vec<Tile> {
        self.unique.iter().copied().collect()
    }

    pub fn into_unique(self) -> Vec<Tile> {
        self.unique.into_iter().collect()
    }
}
