/// Grayscale conversion
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
use image::{GrayImage, RgbImage};
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Below this many pixels the rayon split costs more than it saves
const PARALLEL_MIN_PIXELS: usize = 64 * 1024;

/// Luminance of one RGB triple
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8).min(255) as u8
}

/// Convert an RGB image to grayscale, processing rows in parallel
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let data = rgb_to_grayscale(rgb.as_raw(), width as usize, height as usize);
    // Length is width * height by construction
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Convert packed RGB bytes to grayscale bytes
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    if width == 0 {
        return gray;
    }

    if pixel_count >= PARALLEL_MIN_PIXELS {
        gray.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| convert_row(rgb, width, y, row));
    } else {
        gray.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| convert_row(rgb, width, y, row));
    }

    gray
}

fn convert_row(rgb: &[u8], width: usize, y: usize, row: &mut [u8]) {
    let row_start = y * width * 3;
    for (x, out) in row.iter_mut().enumerate() {
        let idx = row_start + x * 3;
        *out = luma(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
    }
}
