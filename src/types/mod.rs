//! This module defines the core, strongly-typed data representations used
//! throughout the monovid pipeline: binarized frames, packed tiles, the
//! on-disk element types, and the run-length encoded word stream.

pub mod element;
pub mod frame;
pub mod stream;
pub mod tile;

// Re-export the main types for easier access.
pub use element::ElementType;
pub use frame::Frame;
pub use stream::EncodedStream;
pub use tile::{Tile, TileShape};
