//! This module contains the kernels for differential (XOR delta) frame encoding.
//!
//! Each frame is XORed against its predecessor and the resulting 1-bit stream is
//! run-length encoded. The first frame is encoded against an all-zero frame.
//! Decoding is order-dependent: frame `t` can only be rebuilt from the
//! reconstruction of frame `t - 1`, which is why decoding goes through the
//! stateful [`DifferentialDecoder`] rather than a free function per frame.

use crate::error::MonovidError;
use crate::kernels::rle::{self, RunLayout};
use crate::types::{EncodedStream, Frame};

/// The 1-bit symbols of `current XOR previous`, row-major.
pub fn delta_symbols(current: &Frame, previous: &Frame) -> Result<Vec<u8>, MonovidError> {
    Ok(current.xor(previous)?.to_pixels())
}

/// Encodes `frames` in order, appending one sentinel-terminated run sequence per
/// frame to `stream`.
pub fn encode_frames(frames: &[Frame], stream: &mut EncodedStream) -> Result<(), MonovidError> {
    let Some(first) = frames.first() else {
        return Ok(());
    };
    let mut previous = Frame::blank(first.width(), first.height());
    for frame in frames {
        let symbols = delta_symbols(frame, &previous)?;
        stream.push_frame(&symbols)?;
        previous = frame.clone();
    }
    Ok(())
}

/// Rebuilds frames from a differential stream, strictly in order.
///
/// The decoder owns the previously reconstructed frame; every call to
/// [`DifferentialDecoder::decode_next`] consumes the next frame's words and
/// advances that state.
#[derive(Debug, Clone)]
pub struct DifferentialDecoder {
    previous: Frame,
    layout: RunLayout,
    decoded: usize,
}

impl DifferentialDecoder {
    pub fn new(width: usize, height: usize, layout: RunLayout) -> Self {
        DifferentialDecoder {
            previous: Frame::blank(width, height),
            layout,
            decoded: 0,
        }
    }

    /// Number of frames reconstructed so far.
    pub fn frames_decoded(&self) -> usize {
        self.decoded
    }

    /// Decodes the next frame from the start of `words`.
    ///
    /// Returns the frame and the number of words consumed (sentinel included).
    pub fn decode_next(&mut self, words: &[u32]) -> Result<(Frame, usize), MonovidError> {
        let mut symbols = Vec::with_capacity(self.previous.pixel_count());
        let consumed = rle::decode_into(words, self.layout, &mut symbols)?;
        if symbols.len() != self.previous.pixel_count() {
            return Err(MonovidError::RleDecodeError(format!(
                "Frame {} decoded to {} pixels, expected {}",
                self.decoded,
                symbols.len(),
                self.previous.pixel_count()
            )));
        }

        let delta = Frame::from_pixels(
            self.previous.width(),
            self.previous.height(),
            symbols.into_iter().map(|s| s as u8).collect(),
        )?;
        let frame = self.previous.xor(&delta)?;
        self.previous = frame.clone();
        self.decoded += 1;
        Ok((frame, consumed))
    }
}

/// Decodes every frame of a differential stream.
pub fn decode_frames(
    stream: &EncodedStream,
    width: usize,
    height: usize,
) -> Result<Vec<Frame>, MonovidError> {
    let mut decoder = DifferentialDecoder::new(width, height, stream.layout());
    let words = stream.words();
    let mut frames = Vec::with_capacity(stream.frame_count());
    let mut offset = 0;
    while offset < words.len() {
        let (frame, consumed) = decoder.decode_next(&words[offset..])?;
        frames.push(frame);
        offset += consumed;
    }
    Ok(frames)
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::rle::PIXEL_COUNT_BITS;

    fn frame(pixels: &[u8]) -> Frame {
        Frame::from_pixels(4, 2, pixels.to_vec()).unwrap()
    }

    fn sample_frames() -> Vec<Frame> {
        vec![
            frame(&[1, 1, 0, 0, 0, 0, 1, 1]),
            frame(&[1, 1, 1, 0, 0, 0, 1, 1]),
            frame(&[0, 0, 0, 0, 1, 1, 1, 1]),
        ]
    }

    #[test]
    fn test_first_frame_is_encoded_against_blank() {
        let frames = sample_frames();
        let blank = Frame::blank(4, 2);
        assert_eq!(
            delta_symbols(&frames[0], &blank).unwrap(),
            frames[0].to_pixels()
        );
    }

    #[test]
    fn test_differential_roundtrip_in_order() {
        let frames = sample_frames();
        let mut stream = EncodedStream::new(RunLayout::pixel(PIXEL_COUNT_BITS).unwrap());
        encode_frames(&frames, &mut stream).unwrap();
        assert_eq!(stream.frame_count(), 3);

        // Frame 1 differs from frame 0 in a single pixel.
        let per_frame = stream.decode_frames().unwrap();
        assert_eq!(per_frame[1], vec![0, 0, 1, 0, 0, 0, 0, 0]);

        let decoded = decode_frames(&stream, 4, 2).unwrap();
        assert_eq!(decoded, frames);
    }

    #[test]
    fn test_decoder_state_advances_one_frame_at_a_time() {
        let frames = sample_frames();
        let mut stream = EncodedStream::new(RunLayout::pixel(PIXEL_COUNT_BITS).unwrap());
        encode_frames(&frames, &mut stream).unwrap();

        let mut decoder = DifferentialDecoder::new(4, 2, stream.layout());
        let words = stream.words();
        let (f0, used0) = decoder.decode_next(words).unwrap();
        let (f1, used1) = decoder.decode_next(&words[used0..]).unwrap();
        let (f2, _) = decoder.decode_next(&words[used0 + used1..]).unwrap();
        assert_eq!(decoder.frames_decoded(), 3);
        assert_eq!(vec![f0, f1, f2], frames);
    }

    #[test]
    fn test_skipping_a_frame_does_not_reconstruct_it() {
        let frames = sample_frames();
        let mut stream = EncodedStream::new(RunLayout::pixel(PIXEL_COUNT_BITS).unwrap());
        encode_frames(&frames, &mut stream).unwrap();

        // Feeding frame 2's words to a fresh decoder applies the delta to a
        // blank frame instead of frame 1, which yields the wrong picture.
        let words = stream.words();
        let mut scout = DifferentialDecoder::new(4, 2, stream.layout());
        let (_, used0) = scout.decode_next(words).unwrap();
        let (_, used1) = scout.decode_next(&words[used0..]).unwrap();

        let mut fresh = DifferentialDecoder::new(4, 2, stream.layout());
        let (wrong, _) = fresh.decode_next(&words[used0 + used1..]).unwrap();
        assert_ne!(wrong, frames[2]);
    }

    #[test]
    fn test_wrong_pixel_count_is_an_error() {
        let layout = RunLayout::pixel(PIXEL_COUNT_BITS).unwrap();
        let words = rle::encode(&[0u8; 5], layout).unwrap();
        let mut decoder = DifferentialDecoder::new(4, 2, layout);
        assert!(matches!(
            decoder.decode_next(&words),
            Err(MonovidError::RleDecodeError(_))
        ));
    }
}
