//! Diagnostic overlays. Both functions draw on a copy.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::{BoxRegion, MarkingScore};

/// Outline color for marked bubbles
pub const MARKED: Rgb<u8> = Rgb([0, 200, 0]);
/// Outline color for unmarked bubbles
pub const UNMARKED: Rgb<u8> = Rgb([220, 0, 0]);
/// Outline color for card regions
pub const REGION: Rgb<u8> = Rgb([0, 90, 255]);

/// Strokes grow inward from the box edge
fn outline(image: &mut RgbImage, b: &BoxRegion, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        if b.width <= 2 * t || b.height <= 2 * t {
            break;
        }
        let rect = Rect::at((b.x + t) as i32, (b.y + t) as i32)
            .of_size(b.width - 2 * t, b.height - 2 * t);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Green boxes around marked bubbles, red around the rest
pub fn annotate_marks(image: &RgbImage, scores: &[MarkingScore]) -> RgbImage {
    let mut out = image.clone();
    for s in scores {
        let color = if s.marked { MARKED } else { UNMARKED };
        outline(&mut out, &s.bbox, color, 1);
    }
    out
}

/// Outline each card region
pub fn annotate_regions(image: &RgbImage, regions: &[BoxRegion]) -> RgbImage {
    let mut out = image.clone();
    for r in regions {
        outline(&mut out, r, REGION, 3);
    }
    out
}
