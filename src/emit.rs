//! Renders an artifact as C static data for the firmware build.
//!
//! The output declares `frames_enc` (the run-length word stream) and, in
//! dictionary mode, `frame_dict` (the packed codebook). Every array length is
//! written through a `#define`, so the declared sizes and the initializers
//! always come from the same numbers.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::MonovidError;
use crate::pipeline::artifact::Artifact;

const VALUES_PER_LINE: usize = 12;

fn fmt_err(_: std::fmt::Error) -> MonovidError {
    MonovidError::InternalError("Formatting C source failed".into())
}

/// Renders the complete C translation unit for `artifact`.
pub fn render_c_source(artifact: &Artifact) -> Result<String, MonovidError> {
    artifact.validate()?;
    let h = &artifact.header;
    let element = artifact.stream.element_type()?;
    let words = artifact.stream.words();

    let mut out = String::with_capacity(words.len() * 6 + 512);
    writeln!(out, "// Generated by monovid {}. Do not edit.", h.writer_version).map_err(fmt_err)?;
    writeln!(out, "#include <stdint.h>").map_err(fmt_err)?;
    writeln!(out).map_err(fmt_err)?;
    writeln!(out, "#define FRAME_WIDTH {}", h.frame_width).map_err(fmt_err)?;
    writeln!(out, "#define FRAME_HEIGHT {}", h.frame_height).map_err(fmt_err)?;
    writeln!(out, "#define FRAME_COUNT {}", h.frame_count).map_err(fmt_err)?;
    writeln!(out, "#define SYMBOL_BITS {}", h.layout.symbol_bits).map_err(fmt_err)?;
    writeln!(out, "#define COUNT_BITS {}", h.layout.count_bits).map_err(fmt_err)?;
    writeln!(out, "#define LEN_FRAMES {}", words.len()).map_err(fmt_err)?;

    let codebook = artifact.codebook.as_ref();
    if let Some(codebook) = codebook {
        writeln!(out, "#define TILE_ROWS {}", codebook.shape().rows).map_err(fmt_err)?;
        writeln!(out, "#define TILE_COLS {}", codebook.shape().cols).map_err(fmt_err)?;
        writeln!(out, "#define LEN_DICT {}", codebook.len()).map_err(fmt_err)?;
        writeln!(out, "#define DICT_ROW_BYTES {}", codebook.shape().packed_len()).map_err(fmt_err)?;
    }
    writeln!(out).map_err(fmt_err)?;

    writeln!(out, "const {} frames_enc[LEN_FRAMES] = {{", element.c_type()).map_err(fmt_err)?;
    for line in words.chunks(VALUES_PER_LINE) {
        let values: Vec<String> = line.iter().map(|w| w.to_string()).collect();
        writeln!(out, "    {},", values.join(", ")).map_err(fmt_err)?;
    }
    writeln!(out, "}};").map_err(fmt_err)?;

    if let Some(codebook) = codebook {
        let packed = codebook.packed();
        writeln!(out).map_err(fmt_err)?;
        writeln!(out, "const uint8_t frame_dict[LEN_DICT][DICT_ROW_BYTES] = {{").map_err(fmt_err)?;
        for row in packed.chunks(codebook.shape().packed_len()) {
            let values: Vec<String> = row.iter().map(|b| format!("0x{:02x}", b)).collect();
            writeln!(out, "    {{{}}},", values.join(", ")).map_err(fmt_err)?;
        }
        writeln!(out, "}};").map_err(fmt_err)?;
    }
    Ok(out)
}

/// Renders `artifact` and writes it to `path`.
pub fn write_c_source(artifact: &Artifact, path: &Path) -> Result<(), MonovidError> {
    let source = render_c_source(artifact)?;
    std::fs::write(path, source)?;
    log::info!("Wrote C source to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::Codebook;
    use crate::config::EncodingMode;
    use crate::kernels::rle::{RunLayout, PIXEL_COUNT_BITS};
    use crate::pipeline::format::ArtifactHeader;
    use crate::types::{EncodedStream, Tile, TileShape};

    fn define(source: &str, name: &str) -> usize {
        let prefix = format!("#define {} ", name);
        source
            .lines()
            .find_map(|l| l.strip_prefix(prefix.as_str()))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_else(|| panic!("missing #define {}", name))
    }

    /// The initializer text between `name[...] = {` and the closing `};`.
    fn initializer<'a>(source: &'a str, name: &str) -> &'a str {
        let start = source.find(name).unwrap();
        let body = &source[start..];
        let open = body.find("= {").unwrap() + 3;
        let close = body.find("};").unwrap();
        &body[open..close]
    }

    fn dictionary_artifact() -> Artifact {
        let shape = TileShape::EIGHT;
        let codebook = Codebook::new(
            shape,
            vec![Tile::from_raw(0), Tile::from_raw(0x8000_0000_0000_0001), Tile::from_raw(u64::MAX)],
        )
        .unwrap();
        let layout = RunLayout::dictionary(3, 5).unwrap();
        let indexes: Vec<u16> = (0..40).map(|i| (i / 15) as u16).collect();
        let mut stream = EncodedStream::new(layout);
        for frame in indexes.chunks(8) {
            stream.push_frame(frame).unwrap();
        }
        Artifact {
            header: ArtifactHeader {
                mode: EncodingMode::Dictionary,
                frame_width: 32,
                frame_height: 16,
                tile: shape,
                frame_count: 5,
                codebook_size: 3,
                layout,
                writer_version: "test".into(),
            },
            codebook: Some(codebook),
            stream,
            frame_indexes: indexes,
        }
    }

    #[test]
    fn test_declared_lengths_match_arrays() {
        let artifact = dictionary_artifact();
        let source = render_c_source(&artifact).unwrap();

        let len_frames = define(&source, "LEN_FRAMES");
        assert_eq!(len_frames, artifact.stream.len());
        let words: Vec<u32> = initializer(&source, "frames_enc")
            .split(',')
            .filter_map(|v| v.trim().parse().ok())
            .collect();
        assert_eq!(words, artifact.stream.words());

        assert_eq!(define(&source, "LEN_DICT"), 3);
        assert_eq!(define(&source, "DICT_ROW_BYTES"), 8);
        let rows = initializer(&source, "frame_dict").matches('{').count();
        assert_eq!(rows, 3);
        assert!(source.contains("{0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01},"));
        assert!(source.contains("const uint8_t frames_enc[LEN_FRAMES]"));
    }

    #[test]
    fn test_pixel_mode_has_no_dictionary() {
        let layout = RunLayout::pixel(PIXEL_COUNT_BITS).unwrap();
        let mut stream = EncodedStream::new(layout);
        stream.push_frame(&[1u8; 300]).unwrap();
        let artifact = Artifact {
            header: ArtifactHeader {
                mode: EncodingMode::Differential,
                frame_width: 20,
                frame_height: 15,
                tile: TileShape::EIGHT,
                frame_count: 1,
                codebook_size: 0,
                layout,
                writer_version: "test".into(),
            },
            codebook: None,
            stream,
            frame_indexes: Vec::new(),
        };
        let source = render_c_source(&artifact).unwrap();
        assert_eq!(define(&source, "LEN_FRAMES"), 4);
        assert!(!source.contains("frame_dict"));
        assert!(!source.contains("LEN_DICT"));
    }
}
