//! The run-length encoded word stream for a whole clip.

use num_traits::{PrimInt, Unsigned};

use crate::error::MonovidError;
use crate::kernels::rle::{self, RunLayout, SENTINEL};
use crate::types::ElementType;

/// Concatenated sentinel-terminated frame encodings sharing one [`RunLayout`].
///
/// Words are held as `u32` in memory and narrowed to the layout's element
/// type only when serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStream {
    layout: RunLayout,
    words: Vec<u32>,
}

impl EncodedStream {
    pub fn new(layout: RunLayout) -> Self {
        EncodedStream {
            layout,
            words: Vec::new(),
        }
    }

    pub fn with_capacity(layout: RunLayout, words: usize) -> Self {
        EncodedStream {
            layout,
            words: Vec::with_capacity(words),
        }
    }

    /// Wraps already-encoded words, checking each fits the layout's word width.
    pub fn from_words(layout: RunLayout, words: Vec<u32>) -> Result<Self, MonovidError> {
        layout.validate()?;
        let limit = 1u64 << layout.word_bits();
        if let Some(&bad) = words.iter().find(|&&w| w as u64 >= limit) {
            return Err(MonovidError::RleDecodeError(format!(
                "Word {:#x} is wider than the {}-bit layout",
                bad,
                layout.word_bits()
            )));
        }
        Ok(EncodedStream { layout, words })
    }

    /// Encodes one frame's symbols and appends them to the stream.
    pub fn push_frame<S>(&mut self, symbols: &[S]) -> Result<(), MonovidError>
    where
        S: Copy + Into<u32>,
    {
        rle::encode_into(symbols, self.layout, &mut self.words)
    }

    pub fn layout(&self) -> RunLayout {
        self.layout
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of frames, counted by their sentinels.
    pub fn frame_count(&self) -> usize {
        self.words.iter().filter(|&&w| w == SENTINEL).count()
    }

    pub fn element_type(&self) -> Result<ElementType, MonovidError> {
        self.layout.element_type()
    }

    /// Size in bytes once narrowed to the layout's element type.
    pub fn byte_len(&self) -> Result<usize, MonovidError> {
        Ok(self.words.len() * self.element_type()?.size())
    }

    /// Decodes every frame back into its symbol sequence.
    pub fn decode_frames(&self) -> Result<Vec<Vec<u32>>, MonovidError> {
        rle::decode_frames(&self.words, self.layout)
    }

    /// Converts the words into a narrower unsigned integer type.
    pub fn narrow<W>(&self) -> Result<Vec<W>, MonovidError>
    where
        W: PrimInt + Unsigned,
    {
        self.words
            .iter()
            .map(|&w| {
                <W as num_traits::NumCast>::from(w).ok_or_else(|| {
                    MonovidError::InternalError(format!(
                        "Word {:#x} does not fit the target element type",
                        w
                    ))
                })
            })
            .collect()
    }

    /// Serializes the words little-endian at the layout's element width.
    pub fn to_le_bytes(&self) -> Result<Vec<u8>, MonovidError> {
        let bytes = match self.element_type()? {
            ElementType::U8 => self.narrow::<u8>()?,
            ElementType::U16 => self
                .narrow::<u16>()?
                .iter()
                .flat_map(|w| w.to_le_bytes())
                .collect(),
            ElementType::U32 => self.words.iter().flat_map(|w| w.to_le_bytes()).collect(),
        };
        Ok(bytes)
    }

    /// Parses little-endian words written by [`EncodedStream::to_le_bytes`].
    pub fn from_le_bytes(layout: RunLayout, bytes: &[u8]) -> Result<Self, MonovidError> {
        let element = layout.element_type()?;
        if bytes.len() % element.size() != 0 {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Stream payload of {} bytes is not a multiple of {}",
                bytes.len(),
                element.size()
            )));
        }
        let words: Vec<u32> = match element {
            ElementType::U8 => bytes.iter().map(|&b| b as u32).collect(),
            ElementType::U16 => bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
                .collect(),
            ElementType::U32 => bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };
        Self::from_words(layout, words)
    }
}
