//! Element types of the arrays stored in an artifact and emitted as C data.

use serde::{Deserialize, Serialize};

use crate::error::MonovidError;

/// The unsigned integer type of one array element on disk.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    U8,
    U16,
    U32,
}

impl ElementType {
    /// The smallest element type able to hold a `bits`-wide value.
    pub fn for_bits(bits: u8) -> Result<Self, MonovidError> {
        match bits {
            0..=8 => Ok(Self::U8),
            9..=16 => Ok(Self::U16),
            17..=32 => Ok(Self::U32),
            _ => Err(MonovidError::InvalidConfig(format!(
                "A {}-bit word does not fit any supported element type",
                bits
            ))),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// The on-disk tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, MonovidError> {
        match tag {
            1 => Ok(Self::U8),
            2 => Ok(Self::U16),
            3 => Ok(Self::U32),
            t => Err(MonovidError::ArtifactFormatError(format!(
                "Unknown element type tag {}",
                t
            ))),
        }
    }

    /// The `<stdint.h>` type name used when emitting C declarations.
    pub fn c_type(&self) -> &'static str {
        match self {
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
        }
    }
}
