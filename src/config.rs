// In: src/config.rs

//! The single source of truth for all monovid encoding configuration.
//!
//! `MonovidConfig` is created once at the application boundary (from a JSON
//! file, CLI flags, or both) and then passed down read-only. Nothing in the
//! pipeline mutates it, so one run always sees one consistent set of values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MonovidError;
use crate::kernels::rle::{RunLayout, DICTIONARY_COUNT_BITS, PIXEL_COUNT_BITS};
use crate::types::TileShape;

/// Largest codebook addressable by the `u16` frame index array.
pub const MAX_CODEBOOK_SIZE: usize = 1 << 16;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// Which symbols are run-length encoded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// **Default:** tiles are quantized against a learned codebook and the
    /// codeword indices are run-length encoded.
    #[default]
    Dictionary,

    /// Binarized pixels are run-length encoded directly, one bit per symbol.
    RawPixels,

    /// Each frame is XORed with its predecessor before pixel run-length encoding.
    Differential,
}

impl EncodingMode {
    pub fn default_count_bits(&self) -> u8 {
        match self {
            EncodingMode::Dictionary => DICTIONARY_COUNT_BITS,
            EncodingMode::RawPixels | EncodingMode::Differential => PIXEL_COUNT_BITS,
        }
    }
}

/// How grayscale frames are turned into 0/1 bitmaps. A pixel is set when its
/// luma is strictly greater than the threshold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    Fixed { level: u8 },
    /// Per-frame threshold chosen by Otsu's method.
    Otsu,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Otsu
    }
}

/// What to do when the corpus has fewer unique tiles than requested codewords.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CorpusPolicy {
    /// **Default:** fail with `InsufficientCorpus`.
    #[default]
    Abort,
    /// Warn, use every unique tile once and pad by repeating the last one.
    Degenerate,
}

//==================================================================================
// II. Clustering
//==================================================================================

/// Settings for the k-modes codebook builder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Number of codewords K.
    pub codebook_size: usize,
    /// Iteration cap for a single clustering run.
    pub max_iterations: usize,
    /// Independent random initializations; the lowest-cost one wins.
    pub n_init: usize,
    /// Worker threads for the initializations.
    pub threads: usize,
    /// Base seed. Initialization `i` uses `seed + i`.
    pub seed: u64,
    pub corpus_policy: CorpusPolicy,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            codebook_size: 2048,
            max_iterations: 16,
            n_init: 8,
            threads: 8,
            seed: 1,
            corpus_policy: CorpusPolicy::default(),
        }
    }
}

//==================================================================================
// III. The Unified MonovidConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct MonovidConfig {
    pub mode: EncodingMode,

    /// Width of every source frame in pixels.
    pub frame_width: usize,
    /// Height of every source frame in pixels.
    pub frame_height: usize,

    pub tile: TileShape,

    pub clustering: ClusteringConfig,

    /// Stop after this many frames have been kept, even if the source has more.
    pub max_frames: usize,

    /// Keep every n-th decoded frame (1 keeps all of them).
    pub frame_step: usize,

    /// Width of the run-count field. `None` uses the mode's default.
    pub count_bits: Option<u8>,

    pub threshold: ThresholdPolicy,

    /// Swap set and clear pixels after thresholding.
    pub invert: bool,

    /// Zstd level for the baseline comparison in the report. `None` skips it.
    pub baseline_zstd_level: Option<i32>,
}

impl Default for MonovidConfig {
    fn default() -> Self {
        Self {
            mode: EncodingMode::default(),
            frame_width: 128,
            frame_height: 64,
            tile: TileShape::default(),
            clustering: ClusteringConfig::default(),
            max_frames: 5000,
            frame_step: 1,
            count_bits: None,
            threshold: ThresholdPolicy::default(),
            invert: false,
            baseline_zstd_level: Some(19),
        }
    }
}

impl MonovidConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, MonovidError> {
        let text = std::fs::read_to_string(path)?;
        let config: MonovidConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn count_bits(&self) -> u8 {
        self.count_bits
            .unwrap_or_else(|| self.mode.default_count_bits())
    }

    /// The word layout implied by the mode, codebook size and count width.
    pub fn run_layout(&self) -> Result<RunLayout, MonovidError> {
        match self.mode {
            EncodingMode::Dictionary => {
                RunLayout::dictionary(self.clustering.codebook_size, self.count_bits())
            }
            EncodingMode::RawPixels | EncodingMode::Differential => {
                RunLayout::pixel(self.count_bits())
            }
        }
    }

    /// Performs every static check. Called before any frame is processed.
    pub fn validate(&self) -> Result<(), MonovidError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(MonovidError::DimensionMismatch(format!(
                "Frame dimensions must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if self.mode == EncodingMode::Dictionary {
            self.tile.validate()?;
            self.tile.check_frame(self.frame_width, self.frame_height)?;

            let c = &self.clustering;
            if c.codebook_size == 0 || c.codebook_size > MAX_CODEBOOK_SIZE {
                return Err(MonovidError::InvalidConfig(format!(
                    "Codebook size must be in 1..={}, got {}",
                    MAX_CODEBOOK_SIZE, c.codebook_size
                )));
            }
            if c.max_iterations == 0 || c.n_init == 0 || c.threads == 0 {
                return Err(MonovidError::InvalidConfig(
                    "max_iterations, n_init and threads must all be at least 1".into(),
                ));
            }
        }
        if self.max_frames == 0 {
            return Err(MonovidError::InvalidConfig(
                "max_frames must be at least 1".into(),
            ));
        }
        if self.frame_step == 0 {
            return Err(MonovidError::InvalidConfig(
                "frame_step must be at least 1".into(),
            ));
        }
        self.run_layout()?;
        Ok(())
    }
}
