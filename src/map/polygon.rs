use glam::DVec2;

/// Pixel position on screen; x grows right, y grows down.
pub type ScreenPoint = DVec2;

/// Ordered screen-space outline ready for painting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScreenPolygon {
    points: Vec<ScreenPoint>,
    closed: bool,
}

impl ScreenPolygon {
    pub fn new(closed: bool) -> Self {
        Self { points: Vec::new(), closed }
    }

    pub fn with_points(points: Vec<ScreenPoint>, closed: bool) -> Self {
        Self { points, closed }
    }

    #[inline]
    pub fn push(&mut self, p: ScreenPoint) {
        self.points.push(p);
    }

    /// Append unless `p` repeats the last point.
    #[inline]
    pub fn push_distinct(&mut self, p: ScreenPoint) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }

    #[inline]
    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than two points cannot be drawn.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    pub fn first(&self) -> Option<ScreenPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<ScreenPoint> {
        self.points.last().copied()
    }

    /// Repeat the first point at the end if the outline is not already
    /// closed on itself.
    pub fn close(&mut self) {
        if let (Some(first), Some(last)) = (self.first(), self.last()) {
            if first != last {
                self.points.push(first);
            }
        }
    }
}

/// Consumer of finished screen polygons, e.g. a rasterizer.
pub trait Painter {
    /// Draw a closed outline (area).
    fn draw_polygon(&mut self, polygon: &ScreenPolygon);
    /// Draw an open line.
    fn draw_polyline(&mut self, polygon: &ScreenPolygon);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_distinct_skips_repeats() {
        let mut poly = ScreenPolygon::new(false);
        poly.push_distinct(DVec2::new(1.0, 2.0));
        poly.push_distinct(DVec2::new(1.0, 2.0));
        poly.push_distinct(DVec2::new(3.0, 2.0));
        assert_eq!(poly.len(), 2);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut poly = ScreenPolygon::with_points(
            vec![DVec2::new(0.0, 0.0), DVec2::new(5.0, 0.0), DVec2::new(5.0, 5.0)],
            true,
        );
        poly.close();
        poly.close();
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.first(), poly.last());
        assert!(!poly.is_degenerate());
        assert!(ScreenPolygon::new(true).is_degenerate());
    }
}
