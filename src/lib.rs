//! This file is the root of the `monovid` Rust crate.
//!
//! monovid turns a monochrome clip into data small enough for a
//! microcontroller's flash: frames are binarized, cut into tiles, matched
//! against a learned codebook, and the codeword indices are run-length
//! encoded into fixed-width words the firmware can decode in place.
//!
//! Its responsibilities here are limited to declaring the modules and
//! re-exporting the types most callers need.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod codebook;
pub mod config;
pub mod emit;
pub mod error;
pub mod kernels;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Re-exports
//==================================================================================
pub use codebook::{Codebook, CodebookBuilder, TileCorpus};
pub use config::{ClusteringConfig, CorpusPolicy, EncodingMode, MonovidConfig, ThresholdPolicy};
pub use error::MonovidError;
pub use pipeline::{encode_frames, reconstruct_frames, run, Artifact, EncodeReport};
pub use types::{EncodedStream, Frame, Tile, TileShape};
