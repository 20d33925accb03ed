//! Defines the self-describing on-disk container for an encoded clip.
//! This module is the single source of truth for serialization, deserialization,
//! and metadata peeking of the artifact.
//!
//! Layout (all integers little-endian):
//! ```text
//! magic "MVAF" | version u16 | header_len u32 | header JSON
//! 4 x ( dtype u8 | ndim u8 | dims u32 x ndim | byte_len u64 | payload )
//! ```

use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::codebook::Codebook;
use crate::config::EncodingMode;
use crate::error::MonovidError;
use crate::kernels::rle;
use crate::pipeline::format::{
    ArtifactHeader, ARRAY_COUNT, ARRAY_NAMES, ARTIFACT_FORMAT_VERSION, ARTIFACT_MAGIC,
    ENCODED_STREAM, FRAME_INDEXES, PACKED_CODEBOOK, RAW_CODEBOOK,
};
use crate::types::{ElementType, EncodedStream};

//==================================================================================
// Format Constants
//==================================================================================
/// The minimum possible size of a valid artifact in bytes.
const MIN_ARTIFACT_SIZE: usize = 10; // magic(4) + ver(2) + header_len(4)
/// Upper bound on the JSON header, to reject garbage lengths before allocating. (1MB)
const MAX_HEADER_LEN: usize = 1024 * 1024;
const MAX_DIMS: usize = 4;

//==================================================================================
// Public Structs
//==================================================================================

/// Shape and size of one stored array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInfo {
    pub name: &'static str,
    pub dtype: ElementType,
    pub dims: Vec<u32>,
    pub byte_len: u64,
}

impl ArrayInfo {
    /// Product of the dims, or `None` if it overflows.
    pub fn element_count(&self) -> Option<u64> {
        self.dims
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(u64::from(d)))
    }

    /// Payload size implied by the shape and element type.
    pub fn expected_byte_len(&self) -> Option<u64> {
        self.element_count()?.checked_mul(self.dtype.size() as u64)
    }
}

/// Metadata read by [`Artifact::peek_info`] without copying any payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub format_version: u16,
    pub header: ArtifactHeader,
    pub arrays: Vec<ArrayInfo>,
    /// Bytes up to and including the JSON header.
    pub header_size: usize,
    /// Total bytes of array records, record headers included.
    pub data_size: usize,
}

/// A fully encoded clip in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub header: ArtifactHeader,
    /// Present in dictionary mode only.
    pub codebook: Option<Codebook>,
    pub stream: EncodedStream,
    /// Row-major `frame_count x tiles_per_frame` codeword indices. Empty in the
    /// pixel modes.
    pub frame_indexes: Vec<u16>,
}

//==================================================================================
// Core Implementation
//==================================================================================

impl Artifact {
    /// Checks that the arrays agree with the header and with each other.
    pub fn validate(&self) -> Result<(), MonovidError> {
        let h = &self.header;
        h.validate()?;
        if self.stream.layout() != h.layout {
            return Err(MonovidError::ArtifactFormatError(
                "Stream layout differs from the header layout".into(),
            ));
        }
        let lengths = rle::frame_lengths(self.stream.words(), h.layout)?;
        if lengths.len() != h.frame_count {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Header declares {} frames but the stream holds {}",
                h.frame_count,
                lengths.len()
            )));
        }
        let symbols_per_frame = h.symbols_per_frame()? as u64;
        if let Some((i, &len)) = lengths
            .iter()
            .enumerate()
            .find(|(_, &len)| len != symbols_per_frame)
        {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Frame {} decodes to {} symbols, expected {}",
                i, len, symbols_per_frame
            )));
        }

        match (h.mode, &self.codebook) {
            (EncodingMode::Dictionary, Some(codebook)) => {
                if codebook.len() != h.codebook_size || codebook.shape() != h.tile {
                    return Err(MonovidError::ArtifactFormatError(format!(
                        "Codebook of {} {}x{} codewords does not match the header",
                        codebook.len(),
                        codebook.shape().rows,
                        codebook.shape().cols
                    )));
                }
                let expected = h.frame_count.checked_mul(h.tiles_per_frame());
                if expected != Some(self.frame_indexes.len()) {
                    return Err(MonovidError::ArtifactFormatError(format!(
                        "Expected {} x {} frame indexes, found {}",
                        h.frame_count,
                        h.tiles_per_frame(),
                        self.frame_indexes.len()
                    )));
                }
                if let Some(&bad) = self
                    .frame_indexes
                    .iter()
                    .find(|&&i| usize::from(i) >= h.codebook_size)
                {
                    return Err(MonovidError::ArtifactFormatError(format!(
                        "Frame index {} is out of range for {} codewords",
                        bad, h.codebook_size
                    )));
                }
            }
            (EncodingMode::Dictionary, None) => {
                return Err(MonovidError::ArtifactFormatError(
                    "Dictionary artifact without a codebook".into(),
                ));
            }
            (_, codebook) => {
                if codebook.is_some() || h.codebook_size != 0 || !self.frame_indexes.is_empty() {
                    return Err(MonovidError::ArtifactFormatError(
                        "Pixel-mode artifacts carry no codebook or frame indexes".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// The four arrays in storage order.
    fn arrays(&self) -> Result<[(ElementType, Vec<u32>, Vec<u8>); ARRAY_COUNT], MonovidError> {
        let h = &self.header;
        let tile_len = h.tile.len() as u32;
        let packed_len = h.tile.packed_len() as u32;
        let (k, raw, packed) = match &self.codebook {
            Some(codebook) => (codebook.len() as u32, codebook.raw_rows(), codebook.packed()),
            None => (0, Vec::new(), Vec::new()),
        };
        let index_bytes: Vec<u8> = self
            .frame_indexes
            .iter()
            .flat_map(|i| i.to_le_bytes())
            .collect();
        let index_dims = match h.mode {
            EncodingMode::Dictionary => vec![h.frame_count as u32, h.tiles_per_frame() as u32],
            _ => vec![0, 0],
        };

        Ok([
            (ElementType::U8, vec![k, tile_len], raw),
            (ElementType::U8, vec![k, packed_len], packed),
            (
                self.stream.element_type()?,
                vec![self.stream.len() as u32],
                self.stream.to_le_bytes()?,
            ),
            (ElementType::U16, index_dims, index_bytes),
        ])
    }

    /// Serializes the artifact into its canonical byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MonovidError> {
        self.validate()?;
        let header_json = serde_json::to_vec(&self.header)?;
        if header_json.len() > MAX_HEADER_LEN {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Header of {} bytes exceeds the {} byte limit",
                header_json.len(),
                MAX_HEADER_LEN
            )));
        }
        let arrays = self.arrays()?;

        let payload_len: usize = arrays.iter().map(|(_, dims, p)| 10 + 4 * dims.len() + p.len()).sum();
        let mut buf = Vec::with_capacity(MIN_ARTIFACT_SIZE + header_json.len() + payload_len);
        let map_err = |e: std::io::Error| MonovidError::ArtifactFormatError(e.to_string());

        buf.write_all(ARTIFACT_MAGIC).map_err(map_err)?;
        buf.write_all(&ARTIFACT_FORMAT_VERSION.to_le_bytes())
            .map_err(map_err)?;
        buf.write_all(&(header_json.len() as u32).to_le_bytes())
            .map_err(map_err)?;
        buf.write_all(&header_json).map_err(map_err)?;

        for (dtype, dims, payload) in &arrays {
            buf.write_all(&[dtype.tag(), dims.len() as u8])
                .map_err(map_err)?;
            for dim in dims {
                buf.write_all(&dim.to_le_bytes()).map_err(map_err)?;
            }
            buf.write_all(&(payload.len() as u64).to_le_bytes())
                .map_err(map_err)?;
            buf.write_all(payload).map_err(map_err)?;
        }
        Ok(buf)
    }

    /// Deserializes and validates a full artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MonovidError> {
        let info = Self::peek_info(bytes)?;
        let header = info.header;

        let mut cursor = Cursor::new(bytes);
        cursor.set_position(info.header_size as u64);
        let mut payloads: Vec<Vec<u8>> = Vec::with_capacity(ARRAY_COUNT);
        for array in &info.arrays {
            let record_header_len = 2 + 4 * array.dims.len() as u64 + 8;
            cursor.set_position(cursor.position() + record_header_len);
            let mut payload = vec![0u8; array.byte_len as usize];
            cursor
                .read_exact(&mut payload)
                .map_err(|e| MonovidError::ArtifactFormatError(e.to_string()))?;
            payloads.push(payload);
        }
        if (cursor.position() as usize) != bytes.len() {
            return Err(MonovidError::ArtifactFormatError(format!(
                "{} trailing bytes after the last array",
                bytes.len() - cursor.position() as usize
            )));
        }

        let codebook = match header.mode {
            EncodingMode::Dictionary => {
                let codebook = Codebook::from_raw_rows(header.tile, &payloads[RAW_CODEBOOK])?;
                if codebook.packed() != payloads[PACKED_CODEBOOK] {
                    return Err(MonovidError::ArtifactFormatError(
                        "Packed codebook does not match the raw codebook".into(),
                    ));
                }
                Some(codebook)
            }
            EncodingMode::RawPixels | EncodingMode::Differential => {
                if !payloads[RAW_CODEBOOK].is_empty() || !payloads[PACKED_CODEBOOK].is_empty() {
                    return Err(MonovidError::ArtifactFormatError(
                        "Pixel-mode artifact carries codebook bytes".into(),
                    ));
                }
                None
            }
        };

        let stream = EncodedStream::from_le_bytes(header.layout, &payloads[ENCODED_STREAM])?;
        let frame_indexes = payloads[FRAME_INDEXES]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        let artifact = Artifact {
            header,
            codebook,
            stream,
            frame_indexes,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Reads the header and the array record headers without copying payloads.
    pub fn peek_info(bytes: &[u8]) -> Result<ArtifactInfo, MonovidError> {
        if bytes.len() < MIN_ARTIFACT_SIZE {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Artifact is too small to be valid. Minimum size: {}, got: {}",
                MIN_ARTIFACT_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let map_err = |e: std::io::Error| MonovidError::ArtifactFormatError(e.to_string());

        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic).map_err(map_err)?;
        if magic != *ARTIFACT_MAGIC {
            return Err(MonovidError::ArtifactFormatError(
                "Invalid artifact magic number".into(),
            ));
        }

        let mut u16_buf = [0u8; 2];
        cursor.read_exact(&mut u16_buf).map_err(map_err)?;
        let version = u16::from_le_bytes(u16_buf);
        if version != ARTIFACT_FORMAT_VERSION {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Unsupported artifact version: expected {}, got {}",
                ARTIFACT_FORMAT_VERSION, version
            )));
        }

        let mut u32_buf = [0u8; 4];
        cursor.read_exact(&mut u32_buf).map_err(map_err)?;
        let header_len = u32::from_le_bytes(u32_buf) as usize;
        if header_len > MAX_HEADER_LEN {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Header length {} exceeds the {} byte limit",
                header_len, MAX_HEADER_LEN
            )));
        }
        let header_start = cursor.position() as usize;
        let header_size = header_start + header_len;
        if bytes.len() < header_size {
            return Err(MonovidError::ArtifactFormatError(
                "Header length exceeds buffer size".into(),
            ));
        }
        let header: ArtifactHeader = serde_json::from_slice(&bytes[header_start..header_size])?;
        header.validate()?;
        cursor.set_position(header_size as u64);

        let expected_dtypes = [
            ElementType::U8,
            ElementType::U8,
            header.layout.element_type()?,
            ElementType::U16,
        ];
        let mut arrays = Vec::with_capacity(ARRAY_COUNT);
        for (name, expected_dtype) in ARRAY_NAMES.into_iter().zip(expected_dtypes) {
            let mut tag_and_ndim = [0u8; 2];
            cursor.read_exact(&mut tag_and_ndim).map_err(map_err)?;
            let dtype = ElementType::from_tag(tag_and_ndim[0])?;
            if dtype != expected_dtype {
                return Err(MonovidError::ArtifactFormatError(format!(
                    "Array '{}' is stored as {:?}, expected {:?}",
                    name, dtype, expected_dtype
                )));
            }
            let ndim = tag_and_ndim[1] as usize;
            if ndim > MAX_DIMS {
                return Err(MonovidError::ArtifactFormatError(format!(
                    "Array '{}' declares {} dimensions",
                    name, ndim
                )));
            }
            let mut dims = Vec::with_capacity(ndim);
            for _ in 0..ndim {
                cursor.read_exact(&mut u32_buf).map_err(map_err)?;
                dims.push(u32::from_le_bytes(u32_buf));
            }
            let mut u64_buf = [0u8; 8];
            cursor.read_exact(&mut u64_buf).map_err(map_err)?;
            let byte_len = u64::from_le_bytes(u64_buf);

            let info = ArrayInfo {
                name,
                dtype,
                dims,
                byte_len,
            };
            match info.expected_byte_len() {
                Some(expected) if expected == byte_len => {}
                Some(expected) => {
                    return Err(MonovidError::ArtifactFormatError(format!(
                        "Array '{}' has {} bytes but its shape {:?} needs {}",
                        name, byte_len, info.dims, expected
                    )));
                }
                None => {
                    return Err(MonovidError::ArtifactFormatError(format!(
                        "Array '{}' has an overflowing shape {:?}",
                        name, info.dims
                    )));
                }
            }
            let end = cursor.position().saturating_add(byte_len);
            if end > bytes.len() as u64 {
                return Err(MonovidError::ArtifactFormatError(format!(
                    "Array '{}' runs past the end of the artifact",
                    name
                )));
            }
            cursor.set_position(end);
            arrays.push(info);
        }

        Ok(ArtifactInfo {
            format_version: version,
            header,
            arrays,
            header_size,
            data_size: cursor.position() as usize - header_size,
        })
    }

    /// Writes the artifact all-or-nothing: serialize in memory, write a sibling
    /// temporary file, then rename it over `path`.
    pub fn write_atomic(&self, path: &Path) -> Result<(), MonovidError> {
        let bytes = self.to_bytes()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                MonovidError::InvalidConfig(format!("{} is not a file path", path.display()))
            })?;
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let result = std::fs::write(&tmp_path, &bytes).and_then(|_| std::fs::rename(&tmp_path, path));
        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, MonovidError> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::rle::{RunLayout, PIXEL_COUNT_BITS};
    use crate::types::{Tile, TileShape};
    use tempfile::tempdir;

    fn dictionary_artifact() -> Artifact {
        let shape = TileShape::EIGHT;
        let codebook = Codebook::new(
            shape,
            vec![Tile::from_raw(0), Tile::from_raw(u64::MAX), Tile::from_raw(0xF0)],
        )
        .unwrap();
        let layout = RunLayout::dictionary(3, 5).unwrap();
        let frame_indexes: Vec<u16> = vec![0, 0, 1, 2, 2, 2, 2, 2];
        let mut stream = EncodedStream::new(layout);
        for frame in frame_indexes.chunks(4) {
            stream.push_frame(frame).unwrap();
        }
        Artifact {
            header: ArtifactHeader {
                mode: EncodingMode::Dictionary,
                frame_width: 16,
                frame_height: 16,
                tile: shape,
                frame_count: 2,
                codebook_size: 3,
                layout,
                writer_version: "test".into(),
            },
            codebook: Some(codebook),
            stream,
            frame_indexes,
        }
    }

    fn raw_artifact() -> Artifact {
        let layout = RunLayout::pixel(PIXEL_COUNT_BITS).unwrap();
        let mut stream = EncodedStream::new(layout);
        stream.push_frame(&[0u8, 0, 1, 1]).unwrap();
        Artifact {
            header: ArtifactHeader {
                mode: EncodingMode::RawPixels,
                frame_width: 2,
                frame_height: 2,
                tile: TileShape::EIGHT,
                frame_count: 1,
                codebook_size: 0,
                layout,
                writer_version: "test".into(),
            },
            codebook: None,
            stream,
            frame_indexes: Vec::new(),
        }
    }

    #[test]
    fn test_artifact_roundtrip_is_successful() {
        for original in [dictionary_artifact(), raw_artifact()] {
            let bytes = original.to_bytes().unwrap();
            let reconstructed = Artifact::from_bytes(&bytes).unwrap();
            assert_eq!(original, reconstructed);
        }
    }

    #[test]
    fn test_peek_info_is_correct() {
        let original = dictionary_artifact();
        let bytes = original.to_bytes().unwrap();
        let info = Artifact::peek_info(&bytes).unwrap();

        assert_eq!(info.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(info.header, original.header);
        assert_eq!(info.arrays.len(), 4);
        assert_eq!(info.arrays[RAW_CODEBOOK].dims, vec![3, 64]);
        assert_eq!(info.arrays[PACKED_CODEBOOK].dims, vec![3, 8]);
        assert_eq!(info.arrays[ENCODED_STREAM].dtype, ElementType::U8);
        assert_eq!(info.arrays[FRAME_INDEXES].dims, vec![2, 4]);
        assert_eq!(info.header_size + info.data_size, bytes.len());
    }

    #[test]
    fn test_pixel_mode_arrays_are_empty() {
        let bytes = raw_artifact().to_bytes().unwrap();
        let info = Artifact::peek_info(&bytes).unwrap();
        assert_eq!(info.arrays[RAW_CODEBOOK].dims, vec![0, 64]);
        assert_eq!(info.arrays[PACKED_CODEBOOK].byte_len, 0);
        assert_eq!(info.arrays[FRAME_INDEXES].element_count(), Some(0));
    }

    #[test]
    fn test_corrupted_artifacts_are_rejected() {
        let bytes = dictionary_artifact().to_bytes().unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(Artifact::peek_info(&bad_magic).is_err());

        let mut bad_version = bytes.clone();
        bad_version[4] = 99;
        assert!(Artifact::from_bytes(&bad_version).is_err());

        let truncated = &bytes[..bytes.len() - 1];
        assert!(Artifact::from_bytes(truncated).is_err());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(Artifact::from_bytes(&trailing).is_err());

        // Flip a bit in the packed codebook so it disagrees with the raw rows.
        let info = Artifact::peek_info(&bytes).unwrap();
        let raw = &info.arrays[RAW_CODEBOOK];
        let packed_payload_start =
            info.header_size + (2 + 8 + 8) + raw.byte_len as usize + (2 + 8 + 8);
        let mut flipped = bytes.clone();
        flipped[packed_payload_start] ^= 0x80;
        assert!(matches!(
            Artifact::from_bytes(&flipped),
            Err(MonovidError::ArtifactFormatError(_))
        ));
    }

    /// Byte offset of each array record within `bytes`.
    fn record_offsets(info: &ArtifactInfo) -> Vec<usize> {
        let mut offset = info.header_size;
        let mut offsets = Vec::new();
        for array in &info.arrays {
            offsets.push(offset);
            offset += 2 + 4 * array.dims.len() + 8 + array.byte_len as usize;
        }
        offsets
    }

    /// Re-serializes `bytes` with its JSON header edited by `edit`.
    fn with_header(bytes: &[u8], edit: impl FnOnce(&mut serde_json::Value)) -> Vec<u8> {
        let info = Artifact::peek_info(bytes).unwrap();
        let mut header = serde_json::from_slice::<serde_json::Value>(
            &bytes[MIN_ARTIFACT_SIZE..info.header_size],
        )
        .unwrap();
        edit(&mut header);
        let json = serde_json::to_vec(&header).unwrap();

        let mut out = bytes[..6].to_vec();
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&json);
        out.extend_from_slice(&bytes[info.header_size..]);
        out
    }

    #[test]
    fn test_overflowing_dims_are_rejected() {
        let bytes = dictionary_artifact().to_bytes().unwrap();
        let info = Artifact::peek_info(&bytes).unwrap();

        let mut corrupt = bytes[..info.header_size].to_vec();
        corrupt.extend_from_slice(&[ElementType::U8.tag(), 4]);
        for _ in 0..4 {
            corrupt.extend_from_slice(&u32::MAX.to_le_bytes());
        }
        corrupt.extend_from_slice(&0u64.to_le_bytes());
        corrupt.extend_from_slice(&bytes[info.header_size..]);

        assert!(matches!(
            Artifact::peek_info(&corrupt),
            Err(MonovidError::ArtifactFormatError(_))
        ));
        assert!(Artifact::from_bytes(&corrupt).is_err());
    }

    #[test]
    fn test_oversized_layout_in_header_is_rejected() {
        let bytes = dictionary_artifact().to_bytes().unwrap();
        let corrupt = with_header(&bytes, |h| {
            h["layout"] = serde_json::json!({ "symbol_bits": 200, "count_bits": 100 });
        });
        assert!(Artifact::peek_info(&corrupt).is_err());
        assert!(Artifact::from_bytes(&corrupt).is_err());
    }

    #[test]
    fn test_bad_header_geometry_is_rejected() {
        let bytes = raw_artifact().to_bytes().unwrap();

        let huge = with_header(&bytes, |h| {
            h["frame_width"] = serde_json::json!(usize::MAX / 2);
            h["frame_height"] = serde_json::json!(4);
        });
        assert!(Artifact::peek_info(&huge).is_err());
        assert!(Artifact::from_bytes(&huge).is_err());

        // Consistent-looking header whose frames decode to the wrong length.
        let wider = with_header(&bytes, |h| h["frame_width"] = serde_json::json!(4));
        assert!(matches!(
            Artifact::from_bytes(&wider),
            Err(MonovidError::ArtifactFormatError(_))
        ));

        let empty = with_header(&bytes, |h| h["frame_height"] = serde_json::json!(0));
        assert!(Artifact::from_bytes(&empty).is_err());

        let dict = dictionary_artifact().to_bytes().unwrap();
        let odd_tile = with_header(&dict, |h| {
            h["tile"] = serde_json::json!({ "rows": 3, "cols": 3 });
        });
        assert!(Artifact::from_bytes(&odd_tile).is_err());
    }

    #[test]
    fn test_mismatched_dtype_tags_are_rejected() {
        let bytes = dictionary_artifact().to_bytes().unwrap();
        let info = Artifact::peek_info(&bytes).unwrap();
        let offsets = record_offsets(&info);

        let mut stream_tag = bytes.clone();
        stream_tag[offsets[ENCODED_STREAM]] = ElementType::U16.tag();
        assert!(matches!(
            Artifact::peek_info(&stream_tag),
            Err(MonovidError::ArtifactFormatError(_))
        ));

        let mut index_tag = bytes.clone();
        index_tag[offsets[FRAME_INDEXES]] = ElementType::U8.tag();
        assert!(matches!(
            Artifact::from_bytes(&index_tag),
            Err(MonovidError::ArtifactFormatError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let mut artifact = dictionary_artifact();
        artifact.frame_indexes[0] = 3;
        assert!(artifact.to_bytes().is_err());
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mvaf");

        let artifact = dictionary_artifact();
        artifact.write_atomic(&path).unwrap();
        assert_eq!(Artifact::read(&path).unwrap(), artifact);
        assert!(!dir.path().join(".clip.mvaf.tmp").exists());
    }
}
