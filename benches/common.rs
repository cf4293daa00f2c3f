use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

/// A card of `blocks` x `rows` five-choice questions, every third one filled
pub fn draw_sheet(img: &mut RgbImage, x: i32, y: i32, blocks: i32, rows: i32) {
    let w = 140 + (blocks - 1) * 340 + 224;
    let h = 140 + (rows - 1) * 80;
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(w as u32, h as u32), Rgb([245, 245, 245]));
    for b in 0..blocks {
        for r in 0..rows {
            for c in 0..5 {
                let center = (x + 60 + b * 340 + c * 56, y + 60 + r * 80);
                draw_filled_circle_mut(img, center, 24, Rgb([20, 20, 20]));
                if (b + r + c) % 3 != 0 {
                    draw_filled_circle_mut(img, center, 20, Rgb([245, 245, 245]));
                }
            }
        }
    }
}

/// One 4-block, 10-row sheet on a dark table
pub fn sheet_photo() -> RgbImage {
    let mut img = RgbImage::from_pixel(1600, 1000, Rgb([50, 50, 50]));
    draw_sheet(&mut img, 60, 60, 4, 10);
    img
}

/// 2x2 grid of one-block sheets
pub fn grid_photo() -> RgbImage {
    let mut img = RgbImage::from_pixel(1000, 800, Rgb([50, 50, 50]));
    for (x, y) in [(60, 60), (560, 70), (70, 460), (550, 450)] {
        draw_sheet(&mut img, x, y, 1, 3);
    }
    img
}
