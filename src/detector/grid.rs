//! Splitting one photograph into individual card images.

use image::imageops;
use image::RgbImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use log::{debug, info, warn};

use crate::config::GridConfig;
use crate::detector::contour::{RetrievalMode, find_outlines};
use crate::models::BoxRegion;
use crate::utils::grayscale::rgb_to_gray;
use crate::utils::morphology::{self, Kernel};

/// One card cut out of a photograph
#[derive(Debug, Clone)]
pub struct CardRegion {
    /// Padded crop rectangle in photo coordinates
    pub bbox: BoxRegion,
    /// Cropped pixels
    pub image: RgbImage,
}

/// Detects card regions and orders them in reading order
#[derive(Debug, Clone, Default)]
pub struct GridSegmenter {
    config: GridConfig,
}

impl GridSegmenter {
    /// Create a segmenter
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Card-shaped regions with overlaps removed, in no particular order
    pub fn detect_card_regions(&self, image: &RgbImage) -> Vec<BoxRegion> {
        let cfg = &self.config;
        let (width, height) = image.dimensions();
        let image_area = width as f32 * height as f32;
        if image_area == 0.0 {
            return Vec::new();
        }

        let gray = rgb_to_gray(image);
        let blurred = if cfg.blur_sigma > 0.0 {
            gaussian_blur_f32(&gray, cfg.blur_sigma)
        } else {
            gray
        };
        let edges = canny(&blurred, cfg.canny_low, cfg.canny_high);
        let kernel = Kernel::Rect(cfg.morph_radius.saturating_mul(2).saturating_add(1));
        let closed = morphology::close(&edges, kernel, cfg.close_iterations);
        let dilated = morphology::dilate(&closed, kernel, cfg.dilate_iterations);

        let outlines = find_outlines(&dilated, RetrievalMode::External);
        let total = outlines.len();
        let mut boxes = Vec::new();
        for outline in &outlines {
            let area = outline.area();
            if area < cfg.min_contour_area {
                continue;
            }
            let ratio = area / image_area;
            if ratio < cfg.min_card_area_ratio || ratio > cfg.max_card_area_ratio {
                continue;
            }
            let Some(mut bbox) = outline.bbox() else {
                continue;
            };
            let aspect = bbox.aspect_ratio();
            if aspect < cfg.min_aspect_ratio || aspect > cfg.max_aspect_ratio {
                continue;
            }

            let approx = outline.approximate(cfg.poly_epsilon_factor);
            if approx.len() == 4 {
                if let Some(tight) = BoxRegion::enclosing(&approx) {
                    bbox = tight;
                }
            }
            boxes.push(bbox);
        }

        let kept = remove_overlapping(boxes, cfg.max_overlap);
        debug!("grid: {total} outer outlines, {} card regions", kept.len());
        kept
    }

    /// Crop each box with padding, clamped to the image
    pub fn extract_cards(&self, image: &RgbImage, boxes: &[BoxRegion]) -> Vec<CardRegion> {
        boxes
            .iter()
            .map(|b| {
                let padded = b.padded(self.config.card_padding, image.width(), image.height());
                let crop =
                    imageops::crop_imm(image, padded.x, padded.y, padded.width, padded.height)
                        .to_image();
                CardRegion {
                    bbox: padded,
                    image: crop,
                }
            })
            .collect()
    }

    /// Detect, order and crop every card; empty when none is found
    pub fn segment(&self, image: &RgbImage) -> Vec<CardRegion> {
        let boxes = self.detect_card_regions(image);
        if boxes.is_empty() {
            warn!("no card regions detected");
            return Vec::new();
        }
        let ordered = sort_grid_order(boxes, self.config.row_tolerance);
        let cards = self.extract_cards(image, &ordered);
        info!("detected {} cards in grid", cards.len());
        cards
    }
}

/// Greedy overlap suppression, largest first.
///
/// A box is dropped when it shares more than `max_overlap` of the smaller
/// box's area with one already kept.
pub fn remove_overlapping(mut boxes: Vec<BoxRegion>, max_overlap: f32) -> Vec<BoxRegion> {
    boxes.sort_by(|a, b| b.area().cmp(&a.area()));
    let mut kept: Vec<BoxRegion> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        let overlapping = kept.iter().any(|k| {
            let smaller = candidate.area().min(k.area()) as f64;
            candidate.intersection_area(k) as f64 > max_overlap as f64 * smaller
        });
        if !overlapping {
            kept.push(candidate);
        }
    }
    kept
}

/// Row-major reading order.
///
/// Boxes whose top edge is within `mean height * row_tolerance` of the
/// current row's first box share that row.
pub fn sort_grid_order(mut boxes: Vec<BoxRegion>, row_tolerance: f32) -> Vec<BoxRegion> {
    if boxes.is_empty() {
        return boxes;
    }
    let mean_height = boxes.iter().map(|b| b.height as f64).sum::<f64>() / boxes.len() as f64;
    let threshold = mean_height * row_tolerance as f64;

    boxes.sort_by_key(|b| b.y);
    let mut rows: Vec<Vec<BoxRegion>> = Vec::new();
    let mut current: Vec<BoxRegion> = Vec::new();
    let mut anchor_y = boxes[0].y as f64;
    for b in boxes {
        if !current.is_empty() && (b.y as f64 - anchor_y).abs() >= threshold {
            rows.push(std::mem::take(&mut current));
            anchor_y = b.y as f64;
        }
        current.push(b);
    }
    rows.push(current);

    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by_key(|b| b.x);
            row
        })
        .collect()
}
