//! This module contains the pure, stateless kernels for the fixed-width
//! run-length format read by the firmware.
//!
//! Every run is one word `(symbol << count_bits) | count`. A run longer than
//! the count field can express is split into several words carrying the same
//! symbol. Each encoded sequence ends with the sentinel word `0`; since a real
//! run always has `count >= 1`, no real word is ever `0`.

use serde::{Deserialize, Serialize};

use crate::error::MonovidError;
use crate::types::ElementType;
use crate::utils::bits_required;

/// The word marking the end of a frame's run sequence.
pub const SENTINEL: u32 = 0;

/// Count-field width for codeword-index streams (runs of 1..=31).
pub const DICTIONARY_COUNT_BITS: u8 = 5;
/// Count-field width for 1-bit pixel streams (runs of 1..=127).
pub const PIXEL_COUNT_BITS: u8 = 7;

//==================================================================================
// 1. Word Layout
//==================================================================================

/// How a word splits into its symbol and run-count fields.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunLayout {
    pub symbol_bits: u8,
    pub count_bits: u8,
}

impl RunLayout {
    pub fn new(symbol_bits: u8, count_bits: u8) -> Result<Self, MonovidError> {
        let layout = RunLayout {
            symbol_bits,
            count_bits,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// The 1-bit pixel layout: one word per byte.
    pub fn pixel(count_bits: u8) -> Result<Self, MonovidError> {
        Self::new(1, count_bits)
    }

    /// The codeword-index layout for a codebook of `codebook_size` entries.
    pub fn dictionary(codebook_size: usize, count_bits: u8) -> Result<Self, MonovidError> {
        if codebook_size == 0 {
            return Err(MonovidError::InvalidConfig(
                "Codebook size must be at least 1".into(),
            ));
        }
        Self::new(bits_required((codebook_size - 1) as u64), count_bits)
    }

    pub fn validate(&self) -> Result<(), MonovidError> {
        if self.symbol_bits == 0 || self.count_bits == 0 {
            return Err(MonovidError::InvalidConfig(format!(
                "Run layout needs at least one symbol bit and one count bit (got {}+{})",
                self.symbol_bits, self.count_bits
            )));
        }
        if self.word_bits() > 32 {
            return Err(MonovidError::InvalidConfig(format!(
                "Run layout of {}+{} bits exceeds a 32-bit word",
                self.symbol_bits, self.count_bits
            )));
        }
        Ok(())
    }

    /// Total word width. Saturates, so oversized layouts still fail `validate`.
    pub fn word_bits(&self) -> u8 {
        self.symbol_bits.saturating_add(self.count_bits)
    }

    /// The longest run a single word can carry.
    pub fn max_count(&self) -> u32 {
        low_mask(self.count_bits)
    }

    pub fn max_symbol(&self) -> u32 {
        low_mask(self.symbol_bits)
    }

    /// The narrowest element type the words fit in.
    pub fn element_type(&self) -> Result<ElementType, MonovidError> {
        ElementType::for_bits(self.word_bits())
    }

    #[inline]
    pub fn pack(&self, symbol: u32, count: u32) -> u32 {
        (symbol << self.count_bits) | count
    }

    #[inline]
    pub fn unpack(&self, word: u32) -> (u32, u32) {
        (word >> self.count_bits, word & self.max_count())
    }

    fn check_symbol(&self, symbol: u32) -> Result<u32, MonovidError> {
        if symbol > self.max_symbol() {
            return Err(MonovidError::SymbolOverflow {
                symbol,
                bits: self.symbol_bits,
            });
        }
        Ok(symbol)
    }
}

/// A mask of the low `bits` bits, clamped to 32.
fn low_mask(bits: u8) -> u32 {
    match u32::MAX.checked_shr(32 - u32::from(bits.min(32))) {
        Some(mask) => mask,
        None => 0,
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Run-length encodes `symbols` and **appends** the words, followed by the
/// sentinel, to `output`.
///
/// Appending lets a caller concatenate many frames into one pre-sized buffer.
pub fn encode_into<S>(
    symbols: &[S],
    layout: RunLayout,
    output: &mut Vec<u32>,
) -> Result<(), MonovidError>
where
    S: Copy + Into<u32>,
{
    let max_count = layout.max_count();
    let mut iter = symbols.iter().map(|&s| s.into());

    if let Some(first) = iter.next() {
        let mut current = layout.check_symbol(first)?;
        let mut run: u32 = 1;

        for symbol in iter {
            if symbol == current {
                if run < max_count {
                    run += 1;
                    continue;
                }
                // Count field is full: flush and restart a run of the same symbol.
                output.push(layout.pack(current, run));
                run = 1;
            } else {
                output.push(layout.pack(current, run));
                current = layout.check_symbol(symbol)?;
                run = 1;
            }
        }
        output.push(layout.pack(current, run));
    }

    output.push(SENTINEL);
    Ok(())
}

/// Run-length encodes one symbol sequence into a fresh, sentinel-terminated word vector.
pub fn encode<S>(symbols: &[S], layout: RunLayout) -> Result<Vec<u32>, MonovidError>
where
    S: Copy + Into<u32>,
{
    let mut output = Vec::new();
    encode_into(symbols, layout, &mut output)?;
    Ok(output)
}

/// Decodes the first sentinel-terminated sequence in `words`, appending the
/// expanded symbols to `output`.
///
/// Returns the number of words consumed, sentinel included.
pub fn decode_into(
    words: &[u32],
    layout: RunLayout,
    output: &mut Vec<u32>,
) -> Result<usize, MonovidError> {
    for (pos, &word) in words.iter().enumerate() {
        if word == SENTINEL {
            return Ok(pos + 1);
        }
        let (symbol, count) = layout.unpack(word);
        if count == 0 {
            return Err(MonovidError::RleDecodeError(format!(
                "Word {:#x} at position {} has a zero run length",
                word, pos
            )));
        }
        output.extend(std::iter::repeat(symbol).take(count as usize));
    }
    Err(MonovidError::RleDecodeError(
        "Truncated stream: missing end-of-frame sentinel".to_string(),
    ))
}

/// Decodes a stream holding exactly one sentinel-terminated sequence.
pub fn decode(words: &[u32], layout: RunLayout) -> Result<Vec<u32>, MonovidError> {
    let mut output = Vec::new();
    let consumed = decode_into(words, layout, &mut output)?;
    if consumed != words.len() {
        return Err(MonovidError::RleDecodeError(format!(
            "{} trailing words after the sentinel",
            words.len() - consumed
        )));
    }
    Ok(output)
}

/// Splits a concatenated multi-frame stream at its sentinels and decodes each frame.
pub fn decode_frames(words: &[u32], layout: RunLayout) -> Result<Vec<Vec<u32>>, MonovidError> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < words.len() {
        let mut symbols = Vec::new();
        offset += decode_into(&words[offset..], layout, &mut symbols)?;
        frames.push(symbols);
    }
    Ok(frames)
}

/// Number of symbols each frame of a multi-frame stream decodes to, computed
/// from the run counts without expanding them.
pub fn frame_lengths(words: &[u32], layout: RunLayout) -> Result<Vec<u64>, MonovidError> {
    let mut lengths = Vec::new();
    let mut current = 0u64;
    let mut open = false;
    for (pos, &word) in words.iter().enumerate() {
        if word == SENTINEL {
            lengths.push(current);
            current = 0;
            open = false;
            continue;
        }
        let (_, count) = layout.unpack(word);
        if count == 0 {
            return Err(MonovidError::RleDecodeError(format!(
                "Word {:#x} at position {} has a zero run length",
                word, pos
            )));
        }
        current += u64::from(count);
        open = true;
    }
    if open {
        return Err(MonovidError::RleDecodeError(
            "Truncated stream: missing end-of-frame sentinel".to_string(),
        ));
    }
    Ok(lengths)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
