// In: src/pipeline/orchestrator.rs

//! The top-level encoder: binarized frames in, a validated artifact and a
//! report out.
//!
//! Stages run strictly in sequence. In dictionary mode the whole corpus is
//! accumulated before clustering starts, and quantization starts only once the
//! codebook is final. Nothing is written to disk until every stage succeeded.

use std::path::Path;

use serde::Serialize;

use crate::codebook::{quantize_frame, CodebookBuilder, TileCorpus};
use crate::config::{EncodingMode, MonovidConfig};
use crate::error::MonovidError;
use crate::kernels::{bitpack, xor_delta};
use crate::pipeline::artifact::Artifact;
use crate::pipeline::format::ArtifactHeader;
use crate::source::{collect_frames, open_source};
use crate::types::{ElementType, EncodedStream, Frame};

/// Summary of one encoding run.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub mode: EncodingMode,
    pub frames: usize,
    pub frame_width: usize,
    pub frame_height: usize,

    /// Tiles seen across all frames (dictionary mode).
    pub observed_tiles: Option<usize>,
    pub unique_tiles: Option<usize>,
    pub codebook_size: usize,
    pub kmodes_cost: Option<u64>,
    pub best_init: Option<usize>,
    pub degenerate_codebook: bool,
    /// Fraction of pixels that differ between the source and the reconstruction.
    pub mean_quantization_error: f64,

    pub stream_words: usize,
    pub element_type: ElementType,
    pub stream_bytes: usize,
    pub packed_codebook_bytes: usize,
    /// Bytes of the source frames bit-packed one pixel per bit.
    pub packed_frame_bytes: usize,
    /// Zstd-compressed size of the bit-packed frames, if requested.
    pub zstd_baseline_bytes: Option<usize>,
}

impl EncodeReport {
    /// Stream plus packed codebook, i.e. what ends up in firmware flash.
    pub fn payload_bytes(&self) -> usize {
        self.stream_bytes + self.packed_codebook_bytes
    }

    /// Bit-packed frame bytes divided by payload bytes.
    pub fn compression_ratio(&self) -> f64 {
        if self.payload_bytes() == 0 {
            return 0.0;
        }
        self.packed_frame_bytes as f64 / self.payload_bytes() as f64
    }
}

#[derive(Debug, Clone)]
pub struct EncodeOutput {
    pub artifact: Artifact,
    pub report: EncodeReport,
}

/// Encodes already-binarized frames according to `config`.
pub fn encode_frames(frames: &[Frame], config: &MonovidConfig) -> Result<EncodeOutput, MonovidError> {
    config.validate()?;
    if frames.is_empty() {
        return Err(MonovidError::EmptyInput);
    }
    for (i, frame) in frames.iter().enumerate() {
        if frame.width() != config.frame_width || frame.height() != config.frame_height {
            return Err(MonovidError::DimensionMismatch(format!(
                "Frame {} is {}x{}, expected {}x{}",
                i,
                frame.width(),
                frame.height(),
                config.frame_width,
                config.frame_height
            )));
        }
    }

    let layout = config.run_layout()?;
    let pixels_per_frame = config.frame_width * config.frame_height;
    let total_pixels = (frames.len() * pixels_per_frame) as f64;
    log::info!(
        "Encoding {} frames of {}x{} in {:?} mode",
        frames.len(),
        config.frame_width,
        config.frame_height,
        config.mode
    );

    let mut report = EncodeReport {
        mode: config.mode,
        frames: frames.len(),
        frame_width: config.frame_width,
        frame_height: config.frame_height,
        observed_tiles: None,
        unique_tiles: None,
        codebook_size: 0,
        kmodes_cost: None,
        best_init: None,
        degenerate_codebook: false,
        mean_quantization_error: 0.0,
        stream_words: 0,
        element_type: layout.element_type()?,
        stream_bytes: 0,
        packed_codebook_bytes: 0,
        packed_frame_bytes: 0,
        zstd_baseline_bytes: None,
    };

    let artifact = match config.mode {
        EncodingMode::Dictionary => {
            let mut corpus = TileCorpus::new(config.tile);
            for frame in frames {
                corpus.observe(frame)?;
            }
            log::info!(
                "Tile corpus: {} tiles, {} unique",
                corpus.observed_count(),
                corpus.unique_count()
            );
            report.observed_tiles = Some(corpus.observed_count());
            report.unique_tiles = Some(corpus.unique_count());

            let outcome = CodebookBuilder::from_config(config).build(&corpus)?;
            let codebook = outcome.codebook;
            report.codebook_size = codebook.len();
            report.kmodes_cost = outcome.best_init.map(|_| outcome.cost);
            report.best_init = outcome.best_init;
            report.degenerate_codebook = outcome.degenerate;

            let tiles_per_frame = config.tile.tiles_per_frame(config.frame_width, config.frame_height);
            let mut stream = EncodedStream::with_capacity(layout, frames.len() * 8);
            let mut frame_indexes = Vec::with_capacity(frames.len() * tiles_per_frame);
            let mut distortion = 0u64;
            for frame in frames {
                let quantized = quantize_frame(frame, &codebook)?;
                stream.push_frame(&quantized.indices)?;
                frame_indexes.extend_from_slice(&quantized.indices);
                distortion += quantized.distortion;
            }
            report.mean_quantization_error = distortion as f64 / total_pixels;

            Artifact {
                header: header(config, frames.len(), codebook.len(), layout),
                codebook: Some(codebook),
                stream,
                frame_indexes,
            }
        }
        EncodingMode::RawPixels => {
            let mut stream = EncodedStream::with_capacity(layout, frames.len() * 16);
            for frame in frames {
                stream.push_frame(&frame.to_pixels())?;
            }
            Artifact {
                header: header(config, frames.len(), 0, layout),
                codebook: None,
                stream,
                frame_indexes: Vec::new(),
            }
        }
        EncodingMode::Differential => {
            let mut stream = EncodedStream::with_capacity(layout, frames.len() * 16);
            xor_delta::encode_frames(frames, &mut stream)?;
            Artifact {
                header: header(config, frames.len(), 0, layout),
                codebook: None,
                stream,
                frame_indexes: Vec::new(),
            }
        }
    };
    artifact.validate()?;

    report.stream_words = artifact.stream.len();
    report.stream_bytes = artifact.stream.byte_len()?;
    report.packed_codebook_bytes = artifact
        .codebook
        .as_ref()
        .map(|c| c.len() * c.shape().packed_len())
        .unwrap_or(0);

    let packed_frames = bitpack::pack_frames(frames);
    report.packed_frame_bytes = packed_frames.len();
    if let Some(level) = config.baseline_zstd_level {
        report.zstd_baseline_bytes = Some(crate::kernels::zstd::encode(&packed_frames, level)?.len());
    }

    log_metric!(
        "event" = "encode_complete",
        "mode" = &format!("{:?}", report.mode),
        "frames" = &report.frames,
        "stream_bytes" = &report.stream_bytes,
        "codebook_bytes" = &report.packed_codebook_bytes
    );

    Ok(EncodeOutput { artifact, report })
}

/// Reads `input`, encodes it and writes the artifact to `output`.
pub fn run(config: &MonovidConfig, input: &Path, output: &Path) -> Result<EncodeReport, MonovidError> {
    config.validate()?;
    let mut source = open_source(input)?;
    let frames = collect_frames(source.as_mut(), config)?;
    let EncodeOutput { artifact, report } = encode_frames(&frames, config)?;
    artifact.write_atomic(output)?;
    Ok(report)
}

fn header(
    config: &MonovidConfig,
    frame_count: usize,
    codebook_size: usize,
    layout: crate::kernels::RunLayout,
) -> ArtifactHeader {
    ArtifactHeader {
        mode: config.mode,
        frame_width: config.frame_width,
        frame_height: config.frame_height,
        tile: config.tile,
        frame_count,
        codebook_size,
        layout,
        writer_version: crate::VERSION.to_string(),
    }
}
