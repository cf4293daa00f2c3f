/// Geometry utilities for perspective correction and polygon measurements
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as PixelPoint;

use crate::models::Point;

/// Warp the quadrilateral `corners` (top-left, top-right, bottom-right,
/// bottom-left) of `src` onto a `width` x `height` rectangle.
///
/// Sampling is bilinear; output pixels whose source lies outside `src`
/// take `fill`. `None` when the corners admit no projection.
pub fn perspective_warp(
    src: &RgbImage,
    corners: &[Point; 4],
    width: u32,
    height: u32,
    fill: Rgb<u8>,
) -> Option<RgbImage> {
    if width == 0 || height == 0 {
        return None;
    }
    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);
    let from = corners.map(|p| (p.x, p.y));
    let to = [(0.0, 0.0), (max_x, 0.0), (max_x, max_y), (0.0, max_y)];
    let projection = Projection::from_control_points(from, to)?;

    let mut out = RgbImage::from_pixel(width, height, fill);
    warp_into(src, &projection, Interpolation::Bilinear, fill, &mut out);
    Some(out)
}

/// Polygon area by the shoelace formula; zero below three vertices
pub fn polygon_area(points: &[PixelPoint<i32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let n = points.len();
    let mut area = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as i64 * points[j].y as i64;
        area -= points[j].x as i64 * points[i].y as i64;
    }
    (area.abs() as f64 / 2.0) as f32
}

/// Simplify a closed traced border with Douglas-Peucker.
///
/// Trailing vertices within `epsilon` of the first one are the traced
/// border closing on itself and are dropped.
pub fn approximate_polygon(points: &[PixelPoint<i32>], epsilon: f64) -> Vec<Point> {
    if points.len() <= 3 || epsilon <= 0.0 {
        return points.iter().copied().map(Point::from).collect();
    }

    let mut approx: Vec<Point> = approximate_polygon_dp(points, epsilon, true)
        .into_iter()
        .map(Point::from)
        .collect();
    while approx.len() > 1 {
        let (first, last) = (approx[0], approx[approx.len() - 1]);
        if (first.distance(&last) as f64) > epsilon {
            break;
        }
        approx.pop();
    }
    approx
}
