use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::arc_length;
use imageproc::point::Point as PixelPoint;

use crate::models::{BoxRegion, Point};
use crate::utils::geometry::{approximate_polygon, polygon_area};

/// Which traced borders to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Outer borders and hole borders at every nesting level
    All,
    /// Only outermost borders
    External,
}

/// A closed border traced around a foreground region
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Border pixels in tracing order
    pub points: Vec<PixelPoint<i32>>,
    /// Border separates a hole from its enclosing region
    pub is_hole: bool,
}

impl Outline {
    /// Tight bounding box of the border pixels
    pub fn bbox(&self) -> Option<BoxRegion> {
        BoxRegion::enclosing(&self.to_points())
    }

    /// Border pixels as sheet coordinates
    pub fn to_points(&self) -> Vec<Point> {
        self.points.iter().copied().map(Point::from).collect()
    }

    /// Enclosed area (shoelace over the border pixels)
    pub fn area(&self) -> f32 {
        polygon_area(&self.points)
    }

    /// Closed perimeter length
    pub fn perimeter(&self) -> f32 {
        arc_length(&self.points, true) as f32
    }

    /// Simplified polygon with tolerance `factor * perimeter`
    pub fn approximate(&self, factor: f32) -> Vec<Point> {
        approximate_polygon(&self.points, (factor * self.perimeter()) as f64)
    }
}

/// Trace region borders in a binary image (non-zero pixels are foreground)
pub fn find_outlines(binary: &GrayImage, mode: RetrievalMode) -> Vec<Outline> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| match mode {
            RetrievalMode::All => true,
            RetrievalMode::External => c.border_type == BorderType::Outer && c.parent.is_none(),
        })
        .filter(|c| !c.points.is_empty())
        .map(|c| Outline {
            is_hole: c.border_type == BorderType::Hole,
            points: c.points,
        })
        .collect()
}
