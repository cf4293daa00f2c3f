use std::sync::OnceLock;

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use super::{BoxRegion, Point};
use crate::utils::grayscale::rgb_to_gray;

/// Four sheet corners in canonical order: top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerQuad {
    /// Top-left corner (minimal x + y)
    pub top_left: Point,
    /// Top-right corner (minimal y - x)
    pub top_right: Point,
    /// Bottom-right corner (maximal x + y)
    pub bottom_right: Point,
    /// Bottom-left corner (maximal y - x)
    pub bottom_left: Point,
}

impl CornerQuad {
    /// Order four points canonically, independent of input order
    pub fn from_points(points: [Point; 4]) -> Self {
        let by = |key: fn(&Point) -> f32, max: bool| {
            let mut best = points[0];
            for p in &points[1..] {
                let better = if max { key(p) > key(&best) } else { key(p) < key(&best) };
                if better {
                    best = *p;
                }
            }
            best
        };
        Self {
            top_left: by(|p| p.x + p.y, false),
            top_right: by(|p| p.y - p.x, false),
            bottom_right: by(|p| p.x + p.y, true),
            bottom_left: by(|p| p.y - p.x, true),
        }
    }

    /// Corners as an array in canonical order
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Multiply every corner by `factor` (used to undo a detection resize)
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            top_left: self.top_left.scale(factor),
            top_right: self.top_right.scale(factor),
            bottom_right: self.bottom_right.scale(factor),
            bottom_left: self.bottom_left.scale(factor),
        }
    }

    /// Destination rectangle size: the longer of each pair of opposite edges
    pub fn target_size(&self) -> (u32, u32) {
        let width_bottom = self.bottom_right.distance(&self.bottom_left);
        let width_top = self.top_right.distance(&self.top_left);
        let height_right = self.top_right.distance(&self.bottom_right);
        let height_left = self.top_left.distance(&self.bottom_left);
        (
            (width_bottom as u32).max(width_top as u32),
            (height_right as u32).max(height_left as u32),
        )
    }
}

/// A shape hypothesized to be a fillable answer bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleCandidate {
    /// Bounding box of the outline
    pub bbox: BoxRegion,
    /// Traced border pixels
    pub outline: Vec<Point>,
    /// Center of the bounding box
    pub centroid: Point,
}

impl BubbleCandidate {
    /// Build a candidate from its traced outline
    pub fn from_outline(bbox: BoxRegion, outline: Vec<Point>) -> Self {
        Self {
            centroid: bbox.center(),
            bbox,
            outline,
        }
    }

    /// Candidate with no outline, centered in `bbox`
    pub fn from_bbox(bbox: BoxRegion) -> Self {
        Self::from_outline(bbox, Vec::new())
    }

    /// Top-left corner of the bounding box. Deduplication and clustering
    /// measure distances between anchors.
    pub fn anchor(&self) -> Point {
        Point::new(self.bbox.x as f32, self.bbox.y as f32)
    }
}

/// Bubbles sharing an x band, ordered top-to-bottom
pub type Column = Vec<BubbleCandidate>;

/// Bubbles sharing a y band, ordered left-to-right
pub type Row = Vec<BubbleCandidate>;

/// Darkness of one bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkingScore {
    /// Region the score was measured over
    pub bbox: BoxRegion,
    /// `(255 - mean intensity) / 255`, in `[0, 1]`
    pub score: f32,
    /// `score` exceeded the marking threshold
    pub marked: bool,
}

/// A question and its choice bubbles in presentation order
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// 1-based question number
    pub id: u32,
    /// Choice bubbles; choice index is position + 1
    pub choices: Vec<BubbleCandidate>,
}

/// Marks read for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMarks {
    /// 1-based question number
    pub question: u32,
    /// 1-based indices of the marked choices
    pub selected: Vec<u8>,
    /// Darkness of every choice in presentation order
    pub scores: Vec<f32>,
}

/// One card's pixels plus a lazily computed grayscale copy.
///
/// Created per card and dropped with it, so the grayscale conversion is
/// shared between detection and scoring without any process-wide cache.
#[derive(Debug)]
pub struct CardImage {
    rgb: RgbImage,
    gray: OnceLock<GrayImage>,
}

impl CardImage {
    /// Wrap a card image
    pub fn new(rgb: RgbImage) -> Self {
        Self {
            rgb,
            gray: OnceLock::new(),
        }
    }

    /// Color pixels
    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// Grayscale pixels, converted on first access
    pub fn gray(&self) -> &GrayImage {
        self.gray.get_or_init(|| rgb_to_gray(&self.rgb))
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    /// Release the color pixels
    pub fn into_rgb(self) -> RgbImage {
        self.rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_order_is_canonical() {
        let tl = Point::new(10.0, 12.0);
        let tr = Point::new(200.0, 8.0);
        let br = Point::new(210.0, 150.0);
        let bl = Point::new(5.0, 140.0);

        for perm in [[br, tl, bl, tr], [tr, bl, tl, br], [bl, br, tr, tl]] {
            let quad = CornerQuad::from_points(perm);
            assert_eq!(quad.to_array(), [tl, tr, br, bl]);
        }
    }

    #[test]
    fn test_target_size_uses_longer_edges() {
        let quad = CornerQuad::from_points([
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(120.0, 60.0),
            Point::new(0.0, 50.0),
        ]);
        let (w, h) = quad.target_size();
        assert_eq!(w, 120);
        assert_eq!(h, 63);
    }

    #[test]
    fn test_card_image_caches_gray() {
        let card = CardImage::new(RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255])));
        let first = card.gray() as *const GrayImage;
        let second = card.gray() as *const GrayImage;
        assert_eq!(first, second);
        assert_eq!(card.gray().dimensions(), (4, 3));
    }
}
