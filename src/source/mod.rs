// In: src/source/mod.rs

//! Frame sources and frame collection.
//!
//! A source yields grayscale frames in display order until it is exhausted.
//! `collect_frames` applies the frame step and cap, binarizes each kept frame
//! and checks its geometry.

pub mod binarize;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frames, GrayImage};

use crate::config::MonovidConfig;
use crate::error::MonovidError;
use crate::types::Frame;
use crate::utils::frame_sort_key;

pub use binarize::{binarize, otsu_level};

/// How often progress is logged while collecting frames.
const PROGRESS_INTERVAL: usize = 25;

const SEQUENCE_EXTENSIONS: &[&str] = &["png", "bmp", "jpg", "jpeg", "pgm", "pbm"];

//==================================================================================
// 1. Source Trait
//==================================================================================

/// A finite, ordered supply of grayscale frames.
pub trait FrameSource {
    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<GrayImage>, MonovidError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

//==================================================================================
// 2. Implementations
//==================================================================================

/// Frames of an animated GIF.
pub struct GifSource {
    path: PathBuf,
    frames: Frames<'static>,
}

impl GifSource {
    pub fn open(path: &Path) -> Result<Self, MonovidError> {
        let reader = BufReader::new(File::open(path)?);
        let decoder = GifDecoder::new(reader)?;
        Ok(GifSource {
            path: path.to_path_buf(),
            frames: decoder.into_frames(),
        })
    }
}

impl FrameSource for GifSource {
    fn next_frame(&mut self) -> Result<Option<GrayImage>, MonovidError> {
        match self.frames.next() {
            Some(frame) => {
                let rgba = frame?.into_buffer();
                Ok(Some(DynamicImage::ImageRgba8(rgba).to_luma8()))
            }
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("GIF {}", self.path.display())
    }
}

/// A directory of still images, ordered by the number in each file name.
#[derive(Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self, MonovidError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SEQUENCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_image {
                paths.push(path);
            }
        }
        paths.sort_by_key(|p| frame_sort_key(p));
        Ok(ImageSequenceSource {
            dir: dir.to_path_buf(),
            paths: paths.into_iter(),
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<GrayImage>, MonovidError> {
        match self.paths.next() {
            Some(path) => Ok(Some(image::open(&path)?.to_luma8())),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("image sequence {}", self.dir.display())
    }
}

/// Frames already in memory, mainly for tests and library callers.
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: std::collections::VecDeque<GrayImage>,
}

impl MemorySource {
    pub fn new(frames: Vec<GrayImage>) -> Self {
        MemorySource {
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<GrayImage>, MonovidError> {
        Ok(self.frames.pop_front())
    }

    fn describe(&self) -> String {
        format!("{} in-memory frames", self.frames.len())
    }
}

/// Opens a directory as an image sequence and a `.gif` file as an animation.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>, MonovidError> {
    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(path)?));
    }
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gif"))
        .unwrap_or(false);
    if is_gif {
        Ok(Box::new(GifSource::open(path)?))
    } else {
        Err(MonovidError::UnsupportedSource(format!(
            "{} is neither a directory of images nor a .gif file",
            path.display()
        )))
    }
}

//==================================================================================
// 3. Collection
//==================================================================================

/// Pulls frames from `source` until it is exhausted or `max_frames` frames
/// have been kept, keeping every `frame_step`-th decoded frame.
pub fn collect_frames(
    source: &mut dyn FrameSource,
    config: &MonovidConfig,
) -> Result<Vec<Frame>, MonovidError> {
    let step = config.frame_step.max(1);
    let mut frames = Vec::with_capacity(config.max_frames.min(1024));
    let mut decoded = 0usize;

    log::info!("Reading frames from {}", source.describe());
    while frames.len() < config.max_frames {
        let Some(image) = source.next_frame()? else {
            log::info!(
                "Source exhausted after {} decoded frames ({} kept)",
                decoded,
                frames.len()
            );
            break;
        };
        let index = decoded;
        decoded += 1;
        if index % step != 0 {
            continue;
        }

        let (width, height) = (image.width() as usize, image.height() as usize);
        if width != config.frame_width || height != config.frame_height {
            return Err(MonovidError::DimensionMismatch(format!(
                "Frame {} is {}x{}, expected {}x{}",
                index, width, height, config.frame_width, config.frame_height
            )));
        }
        frames.push(binarize(&image, config.threshold, config.invert)?);

        if frames.len() % PROGRESS_INTERVAL == 0 {
            log::info!("Collected {} frames", frames.len());
        }
    }

    if frames.is_empty() {
        return Err(MonovidError::EmptyInput);
    }
    Ok(frames)
}
