//! Document boundary search and perspective correction.
//!
//! The rectifier looks for the largest convincing quadrilateral in the
//! photo and warps it to an axis-aligned rectangle. When nothing
//! qualifies the photo is passed through untouched and the outcome says
//! why, so later stages still run on the unaligned image.

use image::{Rgb, RgbImage};
use image::imageops::{self, FilterType};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use log::{debug, warn};

use crate::config::RectifierConfig;
use crate::detector::contour::{RetrievalMode, find_outlines};
use crate::models::{CornerQuad, Point};
use crate::utils::binarization::{ThresholdMode, bitwise_or, otsu_binarize};
use crate::utils::geometry::perspective_warp;
use crate::utils::grayscale::rgb_to_gray;
use crate::utils::morphology::{self, Kernel};

/// Reason reported when no boundary qualifies
pub const NO_BOUNDARY: &str = "no document boundary detected";
/// Reason reported when the boundary cannot be warped
pub const DEGENERATE_BOUNDARY: &str = "document boundary is degenerate";

/// Widest photo, relative to its height, the boundary search will resize
const MAX_SEARCH_ASPECT: f32 = 20.0;

/// Fill for warped pixels that fall outside the photo
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// How the rectifier treated the input
#[derive(Debug, Clone, PartialEq)]
pub enum RectifyOutcome {
    /// The sheet was found and flattened
    Rectified {
        /// Detected corners in input coordinates
        quad: CornerQuad,
    },
    /// The input was returned unchanged
    Unaligned {
        /// What to fix before rescanning
        reason: &'static str,
    },
}

/// Output image plus how it was produced
#[derive(Debug, Clone)]
pub struct Rectification {
    /// Flattened sheet, or the original photo when unaligned
    pub image: RgbImage,
    /// Whether the warp happened
    pub outcome: RectifyOutcome,
}

impl Rectification {
    /// True when the image was warped
    pub fn is_rectified(&self) -> bool {
        matches!(self.outcome, RectifyOutcome::Rectified { .. })
    }
}

/// Finds a sheet boundary and produces a top-down view of it
#[derive(Debug, Clone, Default)]
pub struct FrameRectifier {
    config: RectifierConfig,
}

impl FrameRectifier {
    /// Create a rectifier
    pub fn new(config: RectifierConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &RectifierConfig {
        &self.config
    }

    /// Order four corners canonically
    pub fn order_corners(points: [Point; 4]) -> CornerQuad {
        CornerQuad::from_points(points)
    }

    /// Flatten the sheet, falling back to a copy of the input
    pub fn rectify(&self, image: &RgbImage) -> Rectification {
        let Some(quad) = self.find_corners(image) else {
            warn!("{NO_BOUNDARY}; using the unaligned image");
            return Rectification {
                image: image.clone(),
                outcome: RectifyOutcome::Unaligned {
                    reason: NO_BOUNDARY,
                },
            };
        };

        match self.rectify_with_quad(image, &quad) {
            Some(warped) => {
                debug!(
                    "rectified {}x{} -> {}x{}",
                    image.width(),
                    image.height(),
                    warped.width(),
                    warped.height()
                );
                Rectification {
                    image: warped,
                    outcome: RectifyOutcome::Rectified { quad },
                }
            }
            None => {
                warn!("{DEGENERATE_BOUNDARY}; using the unaligned image");
                Rectification {
                    image: image.clone(),
                    outcome: RectifyOutcome::Unaligned {
                        reason: DEGENERATE_BOUNDARY,
                    },
                }
            }
        }
    }

    /// Warp `quad` onto a rectangle sized by its longer opposite edges
    pub fn rectify_with_quad(&self, image: &RgbImage, quad: &CornerQuad) -> Option<RgbImage> {
        let (width, height) = quad.target_size();
        if width < 2 || height < 2 {
            return None;
        }
        perspective_warp(image, &quad.to_array(), width, height, PAPER)
    }

    /// Locate the sheet corners in input coordinates
    pub fn find_corners(&self, image: &RgbImage) -> Option<CornerQuad> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || self.config.resize_height == 0 {
            return None;
        }

        if width as f32 > height as f32 * MAX_SEARCH_ASPECT {
            debug!("frame search skipped: {width}x{height} is too elongated");
            return None;
        }

        let ratio = height as f32 / self.config.resize_height as f32;
        let resized_w = ((width as f32 / ratio).round() as u32).max(1);
        let resized = imageops::resize(image, resized_w, self.config.resize_height, FilterType::Triangle);

        let gray = rgb_to_gray(&resized);
        let blurred = if self.config.blur_sigma > 0.0 {
            gaussian_blur_f32(&gray, self.config.blur_sigma)
        } else {
            gray.clone()
        };
        let edges = canny(&blurred, self.config.canny_low, self.config.canny_high);
        let thresh = otsu_binarize(&gray, ThresholdMode::Binary);
        let combined = bitwise_or(&edges, &thresh);
        let kernel = Kernel::Rect(self.config.close_radius.saturating_mul(2).saturating_add(1));
        let closed = morphology::close(&combined, kernel, 1);

        let outlines = find_outlines(&closed, RetrievalMode::All);
        let mut areas: Vec<(usize, f32)> = outlines.iter().map(|o| o.area()).enumerate().collect();
        areas.sort_by(|a, b| b.1.total_cmp(&a.1));

        let min_area = self.config.min_area_ratio * resized_w as f32 * self.config.resize_height as f32;
        debug!(
            "frame search: {} outlines, min area {:.0}",
            outlines.len(),
            min_area
        );

        for &(idx, area) in areas.iter().take(self.config.top_contours) {
            let approx = outlines[idx].approximate(self.config.poly_epsilon_factor);
            if approx.len() == 4 && area > min_area {
                let quad = CornerQuad::from_points([approx[0], approx[1], approx[2], approx[3]]);
                return Some(quad.scaled(ratio));
            }
        }

        None
    }
}
