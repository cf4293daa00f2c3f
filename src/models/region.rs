use serde::{Deserialize, Serialize};

use super::Point;

/// Axis-aligned pixel rectangle `(x, y, width, height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoxRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl BoxRegion {
    /// Create a new region
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tight bounding box of a point set, inclusive of the extreme pixels.
    ///
    /// Negative coordinates are clamped to zero.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let x = min_x.max(0.0).floor() as u32;
        let y = min_y.max(0.0).floor() as u32;
        let right = max_x.max(0.0).floor() as u32;
        let bottom = max_y.max(0.0).floor() as u32;
        Some(Self::new(x, y, right - x + 1, bottom - y + 1))
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Area in pixels
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height; zero for a degenerate box
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Geometric center
    pub fn center(&self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 * 0.5,
            self.y as f32 + self.height as f32 * 0.5,
        )
    }

    /// Area shared with `other`, zero when disjoint
    pub fn intersection_area(&self, other: &BoxRegion) -> u64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());
        if ix1 < ix2 && iy1 < iy2 {
            (ix2 - ix1) as u64 * (iy2 - iy1) as u64
        } else {
            0
        }
    }

    /// Grow by `pad` on every side, clamped to a `bound_w` x `bound_h` image
    pub fn padded(&self, pad: u32, bound_w: u32, bound_h: u32) -> Self {
        let x1 = self.x.saturating_sub(pad);
        let y1 = self.y.saturating_sub(pad);
        let x2 = self.right().saturating_add(pad).min(bound_w);
        let y2 = self.bottom().saturating_add(pad).min(bound_h);
        Self::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    /// Clamp to a `bound_w` x `bound_h` image
    pub fn clamped(&self, bound_w: u32, bound_h: u32) -> Self {
        self.padded(0, bound_w, bound_h)
    }
}
