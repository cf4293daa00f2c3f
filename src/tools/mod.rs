//! Helpers shared by the binaries: loading, key input and diagnostics.

use crate::error::OmrError;
use crate::models::AnswerKey;
use image::{GenericImageView, GrayImage, RgbImage};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("OMR_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image as RGB, downscaled when `OMR_MAX_DIM` is set and exceeded.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage, OmrError> {
    let img = image::open(path)?;
    let rgb = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_rgb8(),
        _ => img.to_rgb8(),
    };
    Ok(rgb)
}

/// Parse a comma or whitespace separated list of 1-based choices.
pub fn parse_key_list(list: &str) -> Result<AnswerKey, OmrError> {
    let answers = list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| match t.parse::<u8>() {
            Ok(v) if v >= 1 => Ok(v),
            _ => Err(OmrError::invalid("key", format!("{t:?} is not a choice number"))),
        })
        .collect::<Result<Vec<u8>, OmrError>>()?;
    if answers.is_empty() {
        return Err(OmrError::EmptyAnswerKey);
    }
    Ok(AnswerKey::new(answers))
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary image.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of foreground pixels.
    pub foreground_pixels: usize,
    /// Total pixels in the image.
    pub total_pixels: usize,
    /// Ratio of foreground pixels to total pixels.
    pub foreground_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &GrayImage) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray.as_raw() {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let count = gray.as_raw().len();
    let avg = if count == 0 {
        0
    } else {
        (sum / count as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Count foreground (non-zero) pixels of a binary image.
pub fn binary_stats(binary: &GrayImage) -> BinaryStats {
    let total = binary.as_raw().len();
    let foreground = binary.as_raw().iter().filter(|&&v| v != 0).count();
    let ratio = if total == 0 {
        0.0
    } else {
        foreground as f64 / total as f64
    };
    BinaryStats {
        foreground_pixels: foreground,
        total_pixels: total,
        foreground_ratio: ratio,
    }
}

/// Image files under `root`, recursively, sorted.
pub fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff") {
                    images.push(path);
                }
            }
        }
    }

    images.sort();
    images
}
