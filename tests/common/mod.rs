//! Synthetic answer cards drawn with imageproc.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

pub const TABLE: Rgb<u8> = Rgb([50, 50, 50]);
pub const PAPER: Rgb<u8> = Rgb([245, 245, 245]);
pub const INK: Rgb<u8> = Rgb([20, 20, 20]);

pub const CHOICES: u32 = 5;
pub const CHOICE_SPACING: i32 = 56;
pub const ROW_SPACING: i32 = 80;
pub const BLOCK_SPACING: i32 = 340;
pub const MARGIN: i32 = 60;

/// Card size for `blocks` question blocks of `rows` questions
pub fn card_size(blocks: u32, rows: u32) -> (u32, u32) {
    let w = 2 * MARGIN + (blocks as i32 - 1) * BLOCK_SPACING + (CHOICES as i32 - 1) * CHOICE_SPACING;
    let h = 2 * MARGIN + (rows as i32 - 1) * ROW_SPACING;
    (w as u32 + 20, h as u32 + 20)
}

/// Draw a card at `(x, y)`. `answers[b * rows + r]` is the filled choice
/// (1-based) of row `r` in block `b`; 0 leaves the row blank.
pub fn draw_card(img: &mut RgbImage, x: i32, y: i32, blocks: u32, rows: u32, answers: &[u8]) {
    let (w, h) = card_size(blocks, rows);
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), PAPER);
    for b in 0..blocks {
        for r in 0..rows {
            let marked = answers.get((b * rows + r) as usize).copied().unwrap_or(0);
            for c in 0..CHOICES {
                let cx = x + MARGIN + b as i32 * BLOCK_SPACING + c as i32 * CHOICE_SPACING;
                let cy = y + MARGIN + r as i32 * ROW_SPACING;
                draw_filled_circle_mut(img, (cx, cy), 24, INK);
                if marked as u32 != c + 1 {
                    draw_filled_circle_mut(img, (cx, cy), 20, PAPER);
                }
            }
        }
    }
}

/// One card on a dark table with a 70px border
pub fn single_card_photo(blocks: u32, rows: u32, answers: &[u8]) -> RgbImage {
    let (w, h) = card_size(blocks, rows);
    let mut img = RgbImage::from_pixel(w + 140, h + 140, TABLE);
    draw_card(&mut img, 70, 70, blocks, rows, answers);
    img
}

/// Top-left corners of a 2x2 grid of one-block, three-row cards
pub const GRID_ORIGINS: [(i32, i32); 4] = [(60, 60), (560, 70), (70, 460), (550, 450)];

/// 2x2 grid of cards on a 1000x800 table
pub fn grid_photo(answers: &[[u8; 3]; 4]) -> RgbImage {
    let mut img = RgbImage::from_pixel(1000, 800, TABLE);
    for ((x, y), card) in GRID_ORIGINS.iter().zip(answers) {
        draw_card(&mut img, *x, *y, 1, 3, card);
    }
    img
}
