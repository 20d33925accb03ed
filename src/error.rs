// In: src/error.rs

//! This module defines the single, unified error type for the entire monovid library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonovidError {
    // =========================================================================
    // === Run-Level Errors (raised before or while the pipeline executes)
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Frame or tile geometry that cannot be partitioned evenly.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Insufficient corpus: {unique} unique tiles, but {requested} codewords were requested")]
    InsufficientCorpus { unique: usize, requested: usize },

    #[error("No frames were collected from the source")]
    EmptyInput,

    #[error("Unsupported frame source: {0}")]
    UnsupportedSource(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === Kernel & Format Errors
    // =========================================================================
    #[error("Symbol {symbol} does not fit in {bits} symbol bits")]
    SymbolOverflow { symbol: u32, bits: u8 },

    #[error("RLE decoding error: {0}")]
    RleDecodeError(String),

    #[error("Artifact format error: {0}")]
    ArtifactFormatError(String),

    #[error("Zstd operation failed: {0}")]
    ZstdError(String),

    #[error("Worker pool could not be created: {0}")]
    ThreadPool(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config or header parsing.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from decoding a source image or animation.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<rayon::ThreadPoolBuildError> for MonovidError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        MonovidError::ThreadPool(err.to_string())
    }
}
