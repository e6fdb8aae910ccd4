//! Pixel surface and rasterization primitives
//!
//! The surface is a fixed-size RGBA image. All plot calls floor their
//! coordinates and silently drop writes outside the image. While a scale
//! transform is active, every rectangle is mapped through it before being
//! filled, which is how the growth pulse scales the organic layer.

use crate::palette::Rgb;
use image::{Rgba, RgbaImage};

/// Internal resolution of the plant surface
pub const CANVAS_WIDTH: u32 = 128;
pub const CANVAS_HEIGHT: u32 = 192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Uniform scale about a fixed center point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTransform {
    pub cx: f64,
    pub cy: f64,
    pub scale: f64,
}

impl ScaleTransform {
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.cx + (x - self.cx) * self.scale,
            self.cy + (y - self.cy) * self.scale,
        )
    }
}

pub struct Surface {
    image: RgbaImage,
    transform: Option<ScaleTransform>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            transform: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Reset every pixel to fully transparent
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// Replace the whole surface with a pre-rendered layer of the same size.
    /// Only valid as the first draw after `clear`.
    pub fn blit_base(&mut self, layer: &RgbaImage) {
        if layer.dimensions() == self.image.dimensions() {
            self.image.copy_from_slice(layer.as_raw());
        } else {
            log::warn!(
                "base layer size {:?} does not match surface {:?}",
                layer.dimensions(),
                self.image.dimensions()
            );
        }
    }

    pub fn set_transform(&mut self, transform: Option<ScaleTransform>) {
        self.transform = transform;
    }

    pub fn transform(&self) -> Option<ScaleTransform> {
        self.transform
    }

    /// Read back a pixel, `None` outside the surface
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if self.in_bounds(x, y) {
            Some(*self.image.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height()
    }

    fn write(&mut self, x: i32, y: i32, color: Rgb, alpha: f64) {
        if !self.in_bounds(x, y) {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        if alpha >= 1.0 {
            *dst = Rgba([color.r, color.g, color.b, 255]);
            return;
        }
        if alpha <= 0.0 {
            return;
        }
        // Source-over with straight alpha
        let da = dst.0[3] as f64 / 255.0;
        let out_a = alpha + da * (1.0 - alpha);
        let mix = |s: u8, d: u8| {
            ((s as f64 * alpha + d as f64 * da * (1.0 - alpha)) / out_a).round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(color.r, dst.0[0]),
            mix(color.g, dst.0[1]),
            mix(color.b, dst.0[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]);
    }

    /// Fill a rectangle in user space, honoring the active transform
    pub fn fill_rect_alpha(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, alpha: f64) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = match self.transform {
            None => (x, y, x + w, y + h),
            Some(t) => {
                let (ax, ay) = t.map(x, y);
                let (bx, by) = t.map(x + w, y + h);
                (ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
            }
        };
        // Round edges to the pixel grid, never collapsing a rect to nothing
        let ix0 = x0.round() as i32;
        let iy0 = y0.round() as i32;
        let ix1 = (x1.round() as i32).max(ix0 + 1);
        let iy1 = (y1.round() as i32).max(iy0 + 1);
        for py in iy0..iy1 {
            for px in ix0..ix1 {
                self.write(px, py, color, alpha);
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        self.fill_rect_alpha(x as f64, y as f64, w as f64, h as f64, color, 1.0);
    }

    pub fn plot_pixel(&mut self, x: f64, y: f64, color: Rgb) {
        self.fill_rect_alpha(x.floor(), y.floor(), 1.0, 1.0, color, 1.0);
    }

    /// 2x2 block with its top-left corner at (x, y)
    pub fn plot_block(&mut self, x: f64, y: f64, color: Rgb) {
        self.fill_rect_alpha(x.floor(), y.floor(), 2.0, 2.0, color, 1.0);
    }

    pub fn plot_pixel_alpha(&mut self, x: f64, y: f64, color: Rgb, alpha: f64) {
        self.fill_rect_alpha(x.floor(), y.floor(), 1.0, 1.0, color, alpha);
    }

    /// Inverted-trapezoid style fill: row width interpolates linearly from
    /// `top_width` to `bottom_width`, each row centered on `cx`
    pub fn fill_trapezoid(&mut self, cx: f64, top_y: i32, top_width: f64, bottom_width: f64, height: i32, color: Rgb) {
        for row in 0..height {
            let width = trapezoid_row_width(top_width, bottom_width, height, row);
            let start_x = (cx - width as f64 / 2.0).floor() as i32;
            self.fill_rect(start_x, top_y + row, width, 1, color);
        }
    }
}

/// Width of `row` within a trapezoid of `height` rows
pub fn trapezoid_row_width(top_width: f64, bottom_width: f64, height: i32, row: i32) -> i32 {
    let progress = if height > 1 { row as f64 / (height - 1) as f64 } else { 0.0 };
    (top_width + (bottom_width - top_width) * progress).floor() as i32
}

/// Bresenham line between two points, both endpoints included
pub fn rasterize_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<PixelPoint> {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;
    let mut pixels = Vec::with_capacity((dx.max(dy) + 1) as usize);

    loop {
        pixels.push(PixelPoint::new(x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    pixels
}

/// Position-only dither patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherMode {
    Checkerboard,
    Ordered,
}

const BAYER_2X2: [[u8; 2]; 2] = [[0, 2], [3, 1]];

/// Whether (x, y) takes the alternate tone under a fixed pattern
pub fn should_dither(x: i32, y: i32, threshold: f64, mode: DitherMode) -> bool {
    match mode {
        DitherMode::Checkerboard => (x + y).rem_euclid(2) == 0,
        DitherMode::Ordered => {
            let v = BAYER_2X2[y.rem_euclid(2) as usize][x.rem_euclid(2) as usize];
            (v as f64 / 4.0) < threshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    #[test]
    fn line_includes_both_endpoints() {
        let line = rasterize_line(2, 3, 9, 6);
        assert_eq!(line.first(), Some(&PixelPoint::new(2, 3)));
        assert_eq!(line.last(), Some(&PixelPoint::new(9, 6)));
        assert_eq!(line.len(), 8);
    }

    #[test]
    fn line_length_is_chebyshev_steps() {
        assert_eq!(rasterize_line(0, 0, 0, 0).len(), 1);
        assert_eq!(rasterize_line(5, 5, 0, 0).len(), 6);
        assert_eq!(rasterize_line(0, 10, 3, 0).len(), 11);
    }

    #[test]
    fn line_steps_are_connected() {
        let line = rasterize_line(10, 40, -4, 31);
        for pair in line.windows(2) {
            assert!((pair[0].x - pair[1].x).abs() <= 1);
            assert!((pair[0].y - pair[1].y).abs() <= 1);
        }
    }

    #[test]
    fn plot_floors_coordinates() {
        let mut s = Surface::new(4, 4);
        s.plot_pixel(1.9, 2.2, RED);
        assert_eq!(s.get(1, 2), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(s.get(2, 2), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut s = Surface::new(4, 4);
        s.plot_block(3.0, 3.0, RED);
        s.plot_pixel(-1.0, 0.0, RED);
        assert_eq!(s.get(3, 3), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(s.get(4, 4), None);
    }

    #[test]
    fn trapezoid_rows_interpolate_and_center() {
        let mut s = Surface::new(20, 5);
        s.fill_trapezoid(10.0, 0, 10.0, 6.0, 5, RED);
        let row_width = |y: i32| (0..20).filter(|&x| s.get(x, y).unwrap().0[3] == 255).count();
        assert_eq!(row_width(0), 10);
        assert_eq!(row_width(2), 8);
        assert_eq!(row_width(4), 6);
        assert_eq!(s.get(5, 0).unwrap().0[3], 255);
        assert_eq!(s.get(4, 0).unwrap().0[3], 0);
    }

    #[test]
    fn dither_modes() {
        assert!(should_dither(0, 0, 0.5, DitherMode::Checkerboard));
        assert!(!should_dither(1, 0, 0.5, DitherMode::Checkerboard));
        // Bayer cell values 0,2,3,1 divided by 4 against 0.3
        assert!(should_dither(0, 0, 0.3, DitherMode::Ordered));
        assert!(!should_dither(1, 0, 0.3, DitherMode::Ordered));
        assert!(!should_dither(0, 1, 0.3, DitherMode::Ordered));
        assert!(should_dither(1, 1, 0.3, DitherMode::Ordered));
        assert!(should_dither(-1, -1, 0.3, DitherMode::Ordered));
    }

    #[test]
    fn transform_scales_about_center() {
        let mut s = Surface::new(40, 40);
        s.set_transform(Some(ScaleTransform { cx: 20.0, cy: 20.0, scale: 2.0 }));
        s.plot_pixel(10.0, 10.0, RED);
        assert_eq!(s.get(0, 0).unwrap().0[3], 255);
        assert_eq!(s.get(1, 1).unwrap().0[3], 255);
        assert_eq!(s.get(10, 10).unwrap().0[3], 0);
    }

    #[test]
    fn alpha_over_transparent_keeps_color() {
        let mut s = Surface::new(2, 2);
        s.plot_pixel_alpha(0.0, 0.0, Rgb::BLACK, 0.2);
        assert_eq!(s.get(0, 0), Some(Rgba([0, 0, 0, 51])));
    }
}
