//! Global thresholding over grayscale images.
//!
//! Foreground pixels are 255 and background pixels are 0, so binary
//! images feed straight into contour tracing and morphology.

use image::GrayImage;

/// Polarity of a global threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    /// Pixels brighter than the threshold become 255
    Binary,
    /// Pixels brighter than the threshold become 0, the rest 255
    Inverted,
}

/// Apply a fixed threshold
pub fn threshold_binarize(gray: &GrayImage, threshold: u8, mode: ThresholdMode) -> GrayImage {
    let (width, height) = gray.dimensions();
    let (above, below) = match mode {
        ThresholdMode::Binary => (255u8, 0u8),
        ThresholdMode::Inverted => (0u8, 255u8),
    };
    let data = gray
        .as_raw()
        .iter()
        .map(|&p| if p > threshold { above } else { below })
        .collect();
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Threshold chosen by Otsu's method.
///
/// Pixels strictly above the returned level form the bright class.
pub fn otsu_level(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray.as_raw() {
        histogram[pixel as usize] += 1;
    }

    let total = gray.as_raw().len() as u64;
    if total == 0 {
        return 0;
    }
    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as u64 * c)
        .sum();

    let mut background_count = 0u64;
    let mut background_sum = 0u64;
    let mut max_variance = 0.0f64;
    let mut level = 0u8;

    for (intensity, &count) in histogram.iter().enumerate() {
        background_count += count;
        background_sum += intensity as u64 * count;
        if background_count == 0 {
            continue;
        }
        let foreground_count = total - background_count;
        if foreground_count == 0 {
            break;
        }

        let mean_bg = background_sum as f64 / background_count as f64;
        let mean_fg = (total_sum - background_sum) as f64 / foreground_count as f64;
        let variance =
            background_count as f64 * foreground_count as f64 * (mean_bg - mean_fg).powi(2);

        if variance > max_variance {
            max_variance = variance;
            level = intensity as u8;
        }
    }

    if max_variance == 0.0 {
        // Single intensity: nothing lies above it
        return gray.as_raw().iter().copied().max().unwrap_or(0);
    }
    level
}

/// Threshold at Otsu's level
pub fn otsu_binarize(gray: &GrayImage, mode: ThresholdMode) -> GrayImage {
    threshold_binarize(gray, otsu_level(gray), mode)
}

/// Pixelwise maximum of two equally sized binary images
pub fn bitwise_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let (width, height) = a.dimensions();
    if b.dimensions() != a.dimensions() {
        return a.clone();
    }
    let data = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| x | y)
        .collect();
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_vec(width: u32, height: u32, data: Vec<u8>) -> GrayImage {
        GrayImage::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_threshold_binarize() {
        let gray = from_vec(2, 2, vec![100, 150, 200, 50]);

        let binary = threshold_binarize(&gray, 128, ThresholdMode::Binary);
        assert_eq!(binary.as_raw(), &vec![0, 255, 255, 0]);

        let inverted = threshold_binarize(&gray, 128, ThresholdMode::Inverted);
        assert_eq!(inverted.as_raw(), &vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let gray = from_vec(2, 1, vec![200, 201]);
        let inverted = threshold_binarize(&gray, 200, ThresholdMode::Inverted);
        assert_eq!(inverted.as_raw(), &vec![255, 0]);
    }

    #[test]
    fn test_otsu_separates_two_classes() {
        let mut data = vec![50u8; 50];
        data.extend(vec![200u8; 50]);
        let gray = from_vec(10, 10, data);

        let level = otsu_level(&gray);
        assert!((50..200).contains(&level));

        let binary = otsu_binarize(&gray, ThresholdMode::Binary);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(0, 7)[0], 255);
    }

    #[test]
    fn test_otsu_uniform_image_has_no_foreground() {
        let gray = GrayImage::from_pixel(8, 8, image::Luma([90]));
        assert_eq!(otsu_level(&gray), 90);
        let binary = otsu_binarize(&gray, ThresholdMode::Binary);
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_bitwise_or() {
        let a = from_vec(3, 1, vec![0, 255, 0]);
        let b = from_vec(3, 1, vec![0, 0, 255]);
        assert_eq!(bitwise_or(&a, &b).as_raw(), &vec![0, 255, 255]);
    }
}
