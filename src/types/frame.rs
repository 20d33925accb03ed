//! A binarized frame: a 2D bitmap of 0/1 pixels backed by `ndarray`.

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::MonovidError;

/// A binary bitmap of `height` rows by `width` columns. Every pixel is 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Array2<u8>,
}

impl Frame {
    /// Wraps a pixel array, normalizing any non-zero value to 1.
    pub fn new(pixels: Array2<u8>) -> Self {
        Frame {
            pixels: pixels.mapv_into(|p| (p != 0) as u8),
        }
    }

    /// An all-zero frame. This is the implicit predecessor of the first frame
    /// in differential mode.
    pub fn blank(width: usize, height: usize) -> Self {
        Frame {
            pixels: Array2::zeros((height, width)),
        }
    }

    /// Builds a frame from row-major pixels.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, MonovidError> {
        if pixels.len() != width * height {
            return Err(MonovidError::DimensionMismatch(format!(
                "Expected {} pixels for a {}x{} frame, got {}",
                width * height,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self::new(Array2::from_shape_vec((height, width), pixels)?))
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.pixels.view()
    }

    /// Pixels in row-major order.
    pub fn iter_pixels(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.iter().copied()
    }

    pub fn to_pixels(&self) -> Vec<u8> {
        self.iter_pixels().collect()
    }

    fn check_same_size(&self, other: &Frame) -> Result<(), MonovidError> {
        if self.pixels.dim() != other.pixels.dim() {
            return Err(MonovidError::DimensionMismatch(format!(
                "Frame {}x{} cannot be combined with frame {}x{}",
                self.width(),
                self.height(),
                other.width(),
                other.height()
            )));
        }
        Ok(())
    }

    /// Pixel-wise XOR against another frame of the same size.
    pub fn xor(&self, other: &Frame) -> Result<Frame, MonovidError> {
        self.check_same_size(other)?;
        let pixels = Zip::from(&self.pixels)
            .and(&other.pixels)
            .map_collect(|&a, &b| a ^ b);
        Ok(Frame { pixels })
    }

    /// Number of pixels that differ from `other`.
    pub fn mismatches(&self, other: &Frame) -> Result<usize, MonovidError> {
        self.check_same_size(other)?;
        Ok(self
            .pixels
            .iter()
            .zip(other.pixels.iter())
            .filter(|(a, b)| a != b)
            .count())
    }
}
