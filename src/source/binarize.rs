//! Grayscale to 0/1 conversion.

use image::GrayImage;

use crate::config::ThresholdPolicy;
use crate::error::MonovidError;
use crate::types::Frame;

/// Otsu's threshold: the level that maximizes the between-class variance of
/// the luma histogram. Pixels `<= level` form the dark class.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for px in image.as_raw() {
        histogram[*px as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &n)| level as f64 * n as f64)
        .sum();

    let mut dark_count = 0u64;
    let mut dark_sum = 0f64;
    let mut best_level = 0u8;
    let mut best_variance = -1f64;
    for (level, &n) in histogram.iter().enumerate() {
        dark_count += n;
        if dark_count == 0 {
            continue;
        }
        let light_count = total - dark_count;
        if light_count == 0 {
            break;
        }
        dark_sum += level as f64 * n as f64;

        let dark_mean = dark_sum / dark_count as f64;
        let light_mean = (weighted_total - dark_sum) / light_count as f64;
        let variance =
            dark_count as f64 * light_count as f64 * (dark_mean - light_mean).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }
    best_level
}

/// Thresholds a grayscale image into a binary frame. A pixel is set when its
/// luma is strictly above the threshold, then flipped if `invert` is set.
pub fn binarize(
    image: &GrayImage,
    policy: ThresholdPolicy,
    invert: bool,
) -> Result<Frame, MonovidError> {
    let level = match policy {
        ThresholdPolicy::Fixed { level } => level,
        ThresholdPolicy::Otsu => otsu_level(image),
    };
    let pixels = image
        .as_raw()
        .iter()
        .map(|&luma| ((luma > level) != invert) as u8)
        .collect();
    Frame::from_pixels(image.width() as usize, image.height() as usize, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bimodal() -> GrayImage {
        GrayImage::from_fn(8, 4, |x, y| {
            if (x + y) % 3 == 0 {
                image::Luma([200u8 + (x as u8 % 3)])
            } else {
                image::Luma([10u8 + (y as u8 % 2)])
            }
        })
    }

    #[test]
    fn test_otsu_separates_bimodal_input() {
        let image = bimodal();
        let level = otsu_level(&image);
        assert!((11..200).contains(&level), "level {} not between modes", level);

        let frame = binarize(&image, ThresholdPolicy::Otsu, false).unwrap();
        for (i, px) in frame.iter_pixels().enumerate() {
            let (x, y) = ((i % 8) as u32, (i / 8) as u32);
            assert_eq!(px, ((x + y) % 3 == 0) as u8);
        }
    }

    #[test]
    fn test_fixed_threshold_is_strict_and_invertible() {
        let image = GrayImage::from_raw(4, 1, vec![0, 127, 128, 255]).unwrap();
        let frame = binarize(&image, ThresholdPolicy::Fixed { level: 127 }, false).unwrap();
        assert_eq!(frame.to_pixels(), vec![0, 0, 1, 1]);

        let inverted = binarize(&image, ThresholdPolicy::Fixed { level: 127 }, true).unwrap();
        assert_eq!(inverted.to_pixels(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_uniform_image_has_no_foreground() {
        let image = GrayImage::from_pixel(8, 8, image::Luma([0]));
        let frame = binarize(&image, ThresholdPolicy::Otsu, false).unwrap();
        assert!(frame.iter_pixels().all(|p| p == 0));
        assert_eq!((frame.width(), frame.height()), (8, 8));
    }
}
