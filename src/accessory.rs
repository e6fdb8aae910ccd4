//! Sign board with the session counter, and snow on the upper foliage

use crate::foliage::FoliageMark;
use crate::palette::{Rgb, SignColors};
use crate::pot::{draw_pattern, POT_CENTER_X, POT_TOP_WIDTH, POT_TOP_Y};
use crate::raster::{Surface, CANVAS_WIDTH};
use crate::rng::SeededRandom;

pub const SIGN_WIDTH: i32 = 12;
pub const SIGN_HEIGHT: i32 = 8;
const SIGN_OFFSET_X: i32 = -25;
const SIGN_OFFSET_Y: i32 = -5;
const SIGN_EDGE: i32 = 2;
const POST_WIDTH: i32 = 2;
const POST_HEIGHT: i32 = 8;

pub const DIGIT_WIDTH: i32 = 3;
pub const DIGIT_HEIGHT: i32 = 5;

const DIGITS: [&[&[u8]]; 10] = [
    &[&[1, 1, 1], &[1, 0, 1], &[1, 0, 1], &[1, 0, 1], &[1, 1, 1]],
    &[&[0, 1, 0], &[1, 1, 0], &[0, 1, 0], &[0, 1, 0], &[1, 1, 1]],
    &[&[1, 1, 1], &[0, 0, 1], &[1, 1, 1], &[1, 0, 0], &[1, 1, 1]],
    &[&[1, 1, 1], &[0, 0, 1], &[1, 1, 1], &[0, 0, 1], &[1, 1, 1]],
    &[&[1, 0, 1], &[1, 0, 1], &[1, 1, 1], &[0, 0, 1], &[0, 0, 1]],
    &[&[1, 1, 1], &[1, 0, 0], &[1, 1, 1], &[0, 0, 1], &[1, 1, 1]],
    &[&[1, 1, 1], &[1, 0, 0], &[1, 1, 1], &[1, 0, 1], &[1, 1, 1]],
    &[&[1, 1, 1], &[0, 0, 1], &[0, 0, 1], &[0, 0, 1], &[0, 0, 1]],
    &[&[1, 1, 1], &[1, 0, 1], &[1, 1, 1], &[1, 0, 1], &[1, 1, 1]],
    &[&[1, 1, 1], &[1, 0, 1], &[1, 1, 1], &[0, 0, 1], &[1, 1, 1]],
];

/// Board rows 2..6 are open in the middle, framed two pixels wide
const BOARD: &[&[u8]] = &[
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    &[1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    &[1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    &[1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Top-left corner of the sign, left of the pot rim and kept on canvas
pub fn sign_position() -> (i32, i32) {
    let x = POT_CENTER_X - POT_TOP_WIDTH / 2 + SIGN_OFFSET_X;
    let x = x.clamp(SIGN_EDGE, CANVAS_WIDTH as i32 - SIGN_WIDTH - SIGN_EDGE);
    (x, POT_TOP_Y + SIGN_OFFSET_Y)
}

pub fn draw_number(surface: &mut Surface, value: u32, x: i32, y: i32, color: Rgb) {
    for (i, ch) in value.to_string().chars().enumerate() {
        if let Some(d) = ch.to_digit(10) {
            draw_pattern(surface, DIGITS[d as usize], x + i as i32 * (DIGIT_WIDTH + 1), y, color);
        }
    }
}

/// Width of `value` in pixels, one column of spacing between digits
pub fn number_width(value: u32) -> i32 {
    let digits = value.to_string().len() as i32;
    digits * (DIGIT_WIDTH + 1) - 1
}

pub fn draw_sign_board(surface: &mut Surface, session: u32, colors: &SignColors) {
    let (x, y) = sign_position();
    draw_pattern(surface, BOARD, x, y, colors.board);
    surface.fill_rect(x + SIGN_WIDTH / 2 - 1, y + SIGN_HEIGHT, POST_WIDTH, POST_HEIGHT, colors.post);

    let text_x = x + (SIGN_WIDTH - number_width(session)) / 2;
    let text_y = y + (SIGN_HEIGHT - DIGIT_HEIGHT) / 2;
    draw_number(surface, session, text_x, text_y, colors.text);
}

/// Snow caps on foliage in the upper half of the plant. Uses its own stream
/// so toggling snow never changes the plant's shape.
pub fn draw_snow<F>(surface: &mut Surface, marks: &[FoliageMark], seed: u64, density: f64, color: Rgb, sway: F)
where
    F: Fn(&FoliageMark) -> i32,
{
    let mut rng = SeededRandom::new(seed);
    for m in marks {
        let roll = rng.next_f64();
        if m.height_ratio < 0.5 || roll >= density {
            continue;
        }
        let x = (m.x + sway(m)) as f64;
        if m.size == 2 {
            surface.fill_rect_alpha(x, m.y as f64, 2.0, 1.0, color, 1.0);
        } else {
            surface.plot_pixel(x, (m.y - 1) as f64, color);
        }
    }
}
