//! The pure, stateless kernels of the encoder.
//!
//! Each submodule owns one transform and its inverse:
//! - `tiles`: frame <-> row-major tile sequence
//! - `rle`: symbol sequence <-> fixed-width run words
//! - `xor_delta`: frame sequence <-> differential run words
//! - `bitpack`: 0/1 pixels <-> MSB-first bytes
//! - `zstd`: general-purpose baseline compression

pub mod bitpack;
pub mod rle;
pub mod tiles;
pub mod xor_delta;
pub mod zstd;

pub use rle::{RunLayout, SENTINEL};
