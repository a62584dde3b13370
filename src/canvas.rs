use image::{imageops, Rgba, RgbaImage};

use crate::ink::Point;
use crate::snapshot::Region;

const INK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);
// Pixels stamped on each side of the centre line.
const INK_RADIUS: i64 = 1;

/// Append-only drawing capability, used while the user is inking.
pub trait StrokeRenderer {
    fn draw_segment(&mut self, from: Point, to: Point);
}

/// Read-only pixel access, used when taking snapshots.
pub trait PixelSource {
    fn dimensions(&self) -> (u32, u32);

    /// Copies `region` into a new image of exactly the region's size.
    fn copy_region(&self, region: &Region) -> RgbaImage;
}

/// The raster drawing surface. Starts out transparent.
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, BLANK),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = BLANK;
        }
    }

    pub fn is_inked(&self, x: u32, y: u32) -> bool {
        self.pixels
            .get_pixel_checked(x, y)
            .map(|p| *p == INK_COLOR)
            .unwrap_or(false)
    }

    /// Cuts a segment down to the part whose stamps can touch the surface
    /// (Liang–Barsky). `None` when nothing of it lands on the pixels.
    fn clip(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if ![from.x, from.y, dx, dy].iter().all(|v| v.is_finite()) {
            return None;
        }
        let reach = INK_RADIUS as f64;
        let (min_x, max_x) = (-reach, f64::from(self.width()) - 1.0 + reach);
        let (min_y, max_y) = (-reach, f64::from(self.height()) - 1.0 + reach);

        let mut enter = 0.0_f64;
        let mut leave = 1.0_f64;
        for (p, q) in [
            (-dx, from.x - min_x),
            (dx, max_x - from.x),
            (-dy, from.y - min_y),
            (dy, max_y - from.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                enter = enter.max(t);
            } else {
                leave = leave.min(t);
            }
            if enter > leave {
                return None;
            }
        }
        Some((
            Point::new(from.x + dx * enter, from.y + dy * enter),
            Point::new(from.x + dx * leave, from.y + dy * leave),
        ))
    }

    fn stamp(&mut self, cx: i64, cy: i64) {
        for y in (cy - INK_RADIUS)..=(cy + INK_RADIUS) {
            for x in (cx - INK_RADIUS)..=(cx + INK_RADIUS) {
                if x < 0 || y < 0 {
                    continue;
                }
                if let Some(pixel) = self.pixels.get_pixel_mut_checked(x as u32, y as u32) {
                    *pixel = INK_COLOR;
                }
            }
        }
    }
}

impl StrokeRenderer for Canvas {
    fn draw_segment(&mut self, from: Point, to: Point) {
        let Some((from, to)) = self.clip(from, to) else {
            return;
        };
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (from.x + dx * t).round() as i64;
            let y = (from.y + dy * t).round() as i64;
            self.stamp(x, y);
        }
    }
}

impl PixelSource for Canvas {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn copy_region(&self, region: &Region) -> RgbaImage {
        imageops::crop_imm(&self.pixels, region.x, region.y, region.width, region.height).to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_ink_every_pixel_between_their_ends() {
        let mut canvas = Canvas::new(40, 20);
        canvas.draw_segment(Point::new(5.0, 10.0), Point::new(30.0, 10.0));

        for x in 5..=30 {
            assert!(canvas.is_inked(x, 10), "gap at x={}", x);
        }
        assert!(!canvas.is_inked(35, 10));
        assert!(!canvas.is_inked(5, 15));
    }

    #[test]
    fn drawing_off_the_edge_is_clipped() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_segment(Point::new(-5.0, 5.0), Point::new(20.0, 5.0));
        assert!(canvas.is_inked(0, 5));
        assert!(canvas.is_inked(9, 5));
    }

    #[test]
    fn far_away_endpoints_only_step_across_the_surface() {
        let mut canvas = Canvas::new(300, 150);
        canvas.draw_segment(Point::new(0.0, 0.0), Point::new(1e12, 0.0));
        assert!(canvas.is_inked(0, 0));
        assert!(canvas.is_inked(299, 0));
        assert!(!canvas.is_inked(0, 5));

        canvas.draw_segment(Point::new(-1e15, 75.0), Point::new(1e15, 75.0));
        assert!((0..300).all(|x| canvas.is_inked(x, 75)));
    }

    #[test]
    fn segments_missing_the_surface_leave_it_blank() {
        let mut canvas = Canvas::new(50, 50);
        canvas.draw_segment(Point::new(60.0, 60.0), Point::new(900.0, 900.0));
        canvas.draw_segment(Point::new(-10.0, 20.0), Point::new(-10.0, 1e9));
        canvas.draw_segment(Point::new(f64::NAN, 1.0), Point::new(10.0, 10.0));
        canvas.draw_segment(Point::new(0.0, 0.0), Point::new(f64::INFINITY, 0.0));
        assert!(canvas.pixels.pixels().all(|p| *p == BLANK));
    }

    #[test]
    fn copy_region_returns_exactly_the_requested_pixels() {
        let mut canvas = Canvas::new(50, 50);
        canvas.draw_segment(Point::new(20.0, 20.0), Point::new(20.0, 20.0));

        let region = Region { x: 18, y: 18, width: 5, height: 4 };
        let copy = canvas.copy_region(&region);
        assert_eq!(copy.dimensions(), (5, 4));
        assert_eq!(*copy.get_pixel(2, 2), INK_COLOR);
        assert_eq!(*copy.get_pixel(0, 0), BLANK);
    }

    #[test]
    fn clear_wipes_all_ink() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_segment(Point::new(1.0, 1.0), Point::new(8.0, 8.0));
        canvas.clear();
        assert!(canvas.pixels.pixels().all(|p| *p == BLANK));
    }
}
