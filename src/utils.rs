//! Small shared helpers used throughout the monovid core.

use std::path::Path;

/// Number of bits needed to represent `max_value`. Never less than 1.
pub fn bits_required(max_value: u64) -> u8 {
    if max_value == 0 {
        1
    } else {
        (64 - max_value.leading_zeros()) as u8
    }
}

/// Sort key that orders `frame2.png` before `frame10.png`.
///
/// The key is the first run of digits in the file stem (if any) followed by the
/// full file name, so unnumbered files fall back to plain name order.
pub fn frame_sort_key(path: &Path) -> (Option<u64>, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let digits: String = stem
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    (digits.parse().ok(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bits_required() {
        assert_eq!(bits_required(0), 1);
        assert_eq!(bits_required(1), 1);
        assert_eq!(bits_required(2047), 11);
        assert_eq!(bits_required(2048), 12);
        assert_eq!(bits_required(u64::MAX), 64);
    }

    #[test]
    fn test_frame_sort_key_is_numeric() {
        let mut paths: Vec<PathBuf> = ["frame10.png", "frame2.png", "frame1.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        paths.sort_by_key(|p| frame_sort_key(p));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("frame1.png"),
                PathBuf::from("frame2.png"),
                PathBuf::from("frame10.png")
            ]
        );
    }
}
