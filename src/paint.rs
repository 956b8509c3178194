use std::f64::consts::TAU;

use glam::DVec2;
use tui_globe::{Painter, ScreenPoint, ScreenPolygon};

use crate::braille::BrailleCanvas;

/// Rasterizes projected polygons as outlines onto a braille canvas.
pub struct CanvasPainter<'a> {
    canvas: &'a mut BrailleCanvas,
    /// Horizontal shift applied to every point, used to draw repeated
    /// copies of a flat map.
    offset_x: f64,
}

impl<'a> CanvasPainter<'a> {
    pub fn new(canvas: &'a mut BrailleCanvas) -> Self {
        Self { canvas, offset_x: 0.0 }
    }

    pub fn with_offset(canvas: &'a mut BrailleCanvas, offset_x: f64) -> Self {
        Self { canvas, offset_x }
    }

    fn stroke(&mut self, points: &[ScreenPoint]) {
        if let [single] = points {
            let p = self.pixel(*single);
            self.canvas.set(p.0, p.1);
            return;
        }
        for pair in points.windows(2) {
            let (x0, y0) = self.pixel(pair[0]);
            let (x1, y1) = self.pixel(pair[1]);
            draw_line(self.canvas, x0, y0, x1, y1);
        }
    }

    #[inline]
    fn pixel(&self, p: ScreenPoint) -> (i32, i32) {
        (clamp_px(p.x + self.offset_x), clamp_px(p.y))
    }
}

impl Painter for CanvasPainter<'_> {
    fn draw_polygon(&mut self, polygon: &ScreenPolygon) {
        self.stroke(polygon.points());
        // Rings come closed already; guard against ones that don't.
        if let (Some(first), Some(last)) = (polygon.first(), polygon.last()) {
            if first != last {
                self.stroke(&[last, first]);
            }
        }
    }

    fn draw_polyline(&mut self, polygon: &ScreenPolygon) {
        self.stroke(polygon.points());
    }
}

/// Far-off points are pinned so the line walk stays bounded.
#[inline]
fn clamp_px(v: f64) -> i32 {
    v.round().clamp(-16_384.0, 16_384.0) as i32
}

/// Bresenham line between two pixels.
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outline of the globe disk, one point per degree.
pub fn silhouette(center: DVec2, radius: f64) -> ScreenPolygon {
    let points = (0..=360)
        .map(|deg| {
            let angle = deg as f64 / 360.0 * TAU;
            center + DVec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    ScreenPolygon::with_points(points, true)
}
