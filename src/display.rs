//! Half-block display of RGBA images
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background. Transparent
//! pixels leave the cell to the terminal's own background.

use crate::terminal::{rgb, Terminal};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::fmt::Write as _;

/// Alpha threshold below which a pixel is considered transparent
const ALPHA_THRESHOLD: u8 = 10;

/// Where a scaled image lands on the terminal, in cell units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub art_w: u16,
    pub art_h_cells: u16,
    pub x_offset: u16,
    pub y_offset: u16,
}

impl Placement {
    pub fn is_empty(&self) -> bool {
        self.art_w == 0 || self.art_h_cells == 0
    }

    /// Pixel height the image must be scaled to
    pub fn pixel_height(&self) -> u32 {
        self.art_h_cells as u32 * 2
    }
}

/// Largest aspect-preserving fit of an `img_w`×`img_h` image into a
/// `term_w`×`term_h` cell area, centered
pub fn fit_placement(term_w: u16, term_h: u16, img_w: u32, img_h: u32) -> Placement {
    if term_w == 0 || term_h == 0 || img_w == 0 || img_h == 0 {
        return Placement {
            art_w: 0,
            art_h_cells: 0,
            x_offset: 0,
            y_offset: 0,
        };
    }

    let avail_h = term_h as f64 * 2.0;
    let scale = (term_w as f64 / img_w as f64).min(avail_h / img_h as f64);
    let art_w = ((img_w as f64 * scale).floor() as u16).min(term_w);
    let art_h_cells = (((img_h as f64 * scale).floor() as u16) / 2).min(term_h);

    Placement {
        art_w,
        art_h_cells,
        x_offset: (term_w - art_w) / 2,
        y_offset: (term_h - art_h_cells) / 2,
    }
}

/// Resize with nearest-neighbor sampling so pixel edges stay hard
pub fn scale_nearest(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Nearest)
}

fn pixel_pair(image: &RgbaImage, x: u32, cy: u32) -> (Option<Rgba<u8>>, Option<Rgba<u8>>) {
    let visible = |y: u32| {
        if y < image.height() {
            let p = *image.get_pixel(x, y);
            (p.0[3] >= ALPHA_THRESHOLD).then_some(p)
        } else {
            None
        }
    };
    (visible(cy * 2), visible(cy * 2 + 1))
}

/// Draw `image` into the terminal buffer with its top-left cell at the
/// given offset
pub fn render_halfblock(term: &mut Terminal, image: &RgbaImage, x_offset: u16, y_offset: u16) {
    let cells_h = image.height().div_ceil(2);
    for cy in 0..cells_h {
        for cx in 0..image.width() {
            let tx = x_offset as i32 + cx as i32;
            let ty = y_offset as i32 + cy as i32;
            match pixel_pair(image, cx, cy) {
                (None, None) => term.set(tx, ty, ' ', None, false),
                (None, Some(b)) => term.set(tx, ty, '▄', Some(rgb(b.0[0], b.0[1], b.0[2])), false),
                (Some(t), None) => term.set(tx, ty, '▀', Some(rgb(t.0[0], t.0[1], t.0[2])), false),
                (Some(t), Some(b)) => term.set_with_bg(
                    tx,
                    ty,
                    '▀',
                    Some(rgb(t.0[0], t.0[1], t.0[2])),
                    Some(rgb(b.0[0], b.0[1], b.0[2])),
                    false,
                ),
            }
        }
    }
}

/// The same half-block picture as ANSI true-color text, one line per
/// cell row, for printing straight to stdout
pub fn halfblock_ansi(image: &RgbaImage) -> String {
    let mut out = String::new();
    let cells_h = image.height().div_ceil(2);
    for cy in 0..cells_h {
        for cx in 0..image.width() {
            match pixel_pair(image, cx, cy) {
                (None, None) => out.push(' '),
                (None, Some(b)) => {
                    let _ = write!(out, "\x1b[38;2;{};{};{}m▄\x1b[0m", b.0[0], b.0[1], b.0[2]);
                }
                (Some(t), None) => {
                    let _ = write!(out, "\x1b[38;2;{};{};{}m▀\x1b[0m", t.0[0], t.0[1], t.0[2]);
                }
                (Some(t), Some(b)) => {
                    let _ = write!(
                        out,
                        "\x1b[38;2;{};{};{};48;2;{};{};{}m▀\x1b[0m",
                        t.0[0], t.0[1], t.0[2], b.0[0], b.0[1], b.0[2]
                    );
                }
            }
        }
        out.push('\n');
    }
    out
}
