use rayon::prelude::*;
use tracing::debug;

use crate::config::ProjectionSettings;
use crate::geo::{GeoBoundingBox, GeoPoint};
use crate::map::globe;
use crate::map::horizon::HorizonClipper;
use crate::map::polygon::{Painter, ScreenPolygon};
use crate::map::projection::{Projected, Projection};
use crate::map::tessellate::Tessellator;
use crate::map::viewport::Viewport;

/// A geographic line or ring as handed in by a data layer.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoShape {
    points: Vec<GeoPoint>,
    closed: bool,
    tessellate: bool,
    bounds: Option<GeoBoundingBox>,
}

impl GeoShape {
    pub fn line(points: Vec<GeoPoint>, tessellate: bool) -> Self {
        Self::new(points, false, tessellate)
    }

    pub fn ring(points: Vec<GeoPoint>, tessellate: bool) -> Self {
        Self::new(points, true, tessellate)
    }

    fn new(points: Vec<GeoPoint>, closed: bool, tessellate: bool) -> Self {
        let bounds = GeoBoundingBox::from_points(&points);
        Self { points, closed, tessellate, bounds }
    }

    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn tessellate(&self) -> bool {
        self.tessellate
    }

    pub fn set_tessellate(&mut self, tessellate: bool) {
        self.tessellate = tessellate;
    }

    #[inline]
    pub fn bounds(&self) -> Option<&GeoBoundingBox> {
        self.bounds.as_ref()
    }
}

/// Turns batches of geographic shapes into screen polygons, one frame at
/// a time.
#[derive(Clone, Debug, Default)]
pub struct VectorMap {
    projection: Projection,
    settings: ProjectionSettings,
    polygons: Vec<ScreenPolygon>,
    culled: usize,
}

impl VectorMap {
    pub fn new(projection: Projection, settings: ProjectionSettings) -> Self {
        Self {
            projection,
            settings,
            polygons: Vec::new(),
            culled: 0,
        }
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[inline]
    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ProjectionSettings {
        &mut self.settings
    }

    /// Polygons produced by the last [`VectorMap::create_from_shapes`].
    #[inline]
    pub fn polygons(&self) -> &[ScreenPolygon] {
        &self.polygons
    }

    /// Shapes skipped by bounding-box culling in the last frame.
    #[inline]
    pub fn culled(&self) -> usize {
        self.culled
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
        self.culled = 0;
    }

    /// Replace the current polygons with those of `shapes` seen through
    /// `vp`. Output order follows input order.
    pub fn create_from_shapes(&mut self, shapes: &[GeoShape], vp: &Viewport) {
        self.clear();

        let trace_shape = |shape: &GeoShape| -> Option<Vec<ScreenPolygon>> {
            if self.is_hidden(shape, vp) {
                return None;
            }
            Some(trace(
                self.projection,
                &self.settings,
                shape.points(),
                shape.closed(),
                shape.tessellate(),
                vp,
            ))
        };

        let traced: Vec<Option<Vec<ScreenPolygon>>> = if shapes.len() >= self.settings.parallel_threshold {
            shapes.par_iter().map(trace_shape).collect()
        } else {
            shapes.iter().map(trace_shape).collect()
        };

        let mut polygons = Vec::new();
        let mut culled = 0;
        for result in traced {
            match result {
                Some(mut shape_polygons) => polygons.append(&mut shape_polygons),
                None => culled += 1,
            }
        }

        debug!(
            shapes = shapes.len(),
            culled,
            polygons = polygons.len(),
            projection = self.projection.name(),
            "projected vector map"
        );
        self.polygons = polygons;
        self.culled = culled;
    }

    /// Hand every polygon to `painter`: areas as polygons, lines as
    /// polylines.
    pub fn paint(&self, painter: &mut impl Painter) {
        for polygon in &self.polygons {
            if polygon.closed() {
                painter.draw_polygon(polygon);
            } else {
                painter.draw_polyline(polygon);
            }
        }
    }

    /// Empty shapes, and on the globe shapes whose bounding box corners
    /// and center all face away.
    fn is_hidden(&self, shape: &GeoShape, vp: &Viewport) -> bool {
        let Some(bounds) = shape.bounds() else {
            return true;
        };
        if !self.settings.cull_hidden_shapes || !self.projection.has_horizon() {
            return false;
        }
        !bounds.boundary().iter().any(|corner| globe::faces_viewer(corner, vp))
    }
}

/// Project one line or ring: each point, tessellated in between where
/// needed, fed through a fresh horizon clipper.
pub(crate) fn trace(
    projection: Projection,
    settings: &ProjectionSettings,
    points: &[GeoPoint],
    closed: bool,
    tessellate: bool,
    vp: &Viewport,
) -> Vec<ScreenPolygon> {
    let tessellator = Tessellator::new(settings);
    let mut feed = Feed::new(projection, vp, closed);
    let mut previous: Option<(&GeoPoint, Projected)> = None;

    for geo in points {
        let projected = feed.align(projection.project(geo, vp));
        if tessellate {
            if let Some((previous_geo, previous_projected)) = previous {
                feed.segment(&tessellator, previous_geo, &previous_projected, geo, &projected);
            }
        }
        feed.push(&projected);
        previous = Some((geo, projected));
    }

    // The closing edge of a ring bends like any other.
    if closed && tessellate && points.len() > 2 {
        if let (Some((last_geo, last_projected)), Some(first_geo)) = (previous, points.first()) {
            let first_projected = feed.align(projection.project(first_geo, vp));
            feed.segment(&tessellator, last_geo, &last_projected, first_geo, &first_projected);
        }
    }

    feed.clipper.finish()
}

/// Hands projected points to the clipper. On a flat map, lines break
/// where they wrap around the date line and rings stay on the map copy of
/// their previous point.
struct Feed<'a> {
    projection: Projection,
    vp: &'a Viewport,
    closed: bool,
    clipper: HorizonClipper,
    last_x: Option<f64>,
}

impl<'a> Feed<'a> {
    fn new(projection: Projection, vp: &'a Viewport, closed: bool) -> Self {
        Self {
            projection,
            vp,
            closed,
            clipper: HorizonClipper::new(vp, closed),
            last_x: None,
        }
    }

    fn segment(
        &mut self,
        tessellator: &Tessellator,
        from_geo: &GeoPoint,
        from: &Projected,
        to_geo: &GeoPoint,
        to: &Projected,
    ) {
        if let Some(count) = tessellator.subdivisions(from, to, self.vp) {
            for mid in tessellator.tessellate_segment(from_geo, to_geo, count, self.projection, self.vp) {
                self.push(&mid);
            }
        }
    }

    /// Shift a flat-map ring point by whole map copies (`4 * radius`) until
    /// it lies within half a copy of the previous point.
    fn align(&self, mut projected: Projected) -> Projected {
        if self.projection.has_horizon() || !self.closed {
            return projected;
        }
        let map_width = 4.0 * self.vp.radius() as f64;
        let Some(last) = self.last_x else {
            return projected;
        };
        if map_width <= 0.0 {
            return projected;
        }
        let shift = ((last - projected.point.x) / map_width).round() * map_width;
        if shift != 0.0 {
            projected.point.x += shift;
            projected.visible = self.vp.contains(projected.point);
        }
        projected
    }

    fn push(&mut self, projected: &Projected) {
        let projected = self.align(*projected);
        let x = projected.point.x;
        if !self.projection.has_horizon() && !self.closed {
            // Half a map copy is 2 * radius wide.
            let wrapped = self
                .last_x
                .is_some_and(|last| (x - last).abs() > 2.0 * self.vp.radius() as f64);
            if wrapped {
                self.clipper.break_line();
            }
        }
        self.clipper.push(projected.point, projected.faces_viewer());
        self.last_x = Some(x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::orientation::Orientation;
    use glam::DVec2;

    fn deg(points: &[(f64, f64)]) -> Vec<GeoPoint> {
        points.iter().map(|&(lon, lat)| GeoPoint::from_degrees(lon, lat)).collect()
    }

    #[derive(Default)]
    struct Recorder {
        polygons: usize,
        polylines: usize,
    }

    impl Painter for Recorder {
        fn draw_polygon(&mut self, _: &ScreenPolygon) {
            self.polygons += 1;
        }

        fn draw_polyline(&mut self, _: &ScreenPolygon) {
            self.polylines += 1;
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(400, 400, 200, Orientation::IDENTITY)
    }

    #[test]
    fn test_visible_ring_projects_to_one_closed_polygon() {
        let ring = deg(&[(-20.0, -20.0), (20.0, -20.0), (20.0, 20.0), (-20.0, 20.0)]);
        let polygons = Projection::Spherical.project_ring(&ring, &viewport(), false);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 5);
        assert_eq!(polygons[0].first(), polygons[0].last());
    }

    #[test]
    fn test_ring_crossing_horizon_stays_closed() {
        // Straddles the eastern limb at 90°E.
        let ring = deg(&[(60.0, -30.0), (120.0, -30.0), (120.0, 30.0), (60.0, 30.0)]);
        for tessellate in [false, true] {
            let polygons = Projection::Spherical.project_ring(&ring, &viewport(), tessellate);
            assert_eq!(polygons.len(), 1, "tessellate {tessellate}");
            let poly = &polygons[0];
            assert!(poly.closed());
            assert!(poly.len() >= 2);
            assert_eq!(poly.first(), poly.last());
            // Nothing drawn beyond the limb.
            for point in poly.points() {
                assert!((*point - DVec2::new(200.0, 200.0)).length() <= 200.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_line_over_the_far_side_splits() {
        // Equator from 60°E round the back to 60°W.
        let line = deg(&[(60.0, 0.0), (120.0, 0.0), (180.0, 0.0), (-120.0, 0.0), (-60.0, 0.0)]);
        let polygons = Projection::Spherical.project_polyline(&line, &viewport(), false);
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| !p.closed() && p.len() == 2));
    }

    #[test]
    fn test_tessellation_adds_points_on_long_segments() {
        let line = deg(&[(-60.0, 10.0), (60.0, 10.0)]);
        let vp = viewport();
        let plain = Projection::Spherical.project_polyline(&line, &vp, false);
        let curved = Projection::Spherical.project_polyline(&line, &vp, true);
        assert_eq!(plain[0].len(), 2);
        // About 341 px on screen: four extra points at 70 px precision.
        assert_eq!(curved[0].len(), 6);
        assert_eq!(curved[0].first(), plain[0].first());
        assert_eq!(curved[0].last(), plain[0].last());
    }

    #[test]
    fn test_mercator_line_breaks_at_date_line() {
        let vp = Viewport::new(800, 400, 100, Orientation::IDENTITY);
        let line = deg(&[(150.0, 0.0), (170.0, 0.0), (-170.0, 0.0), (-150.0, 0.0)]);
        let polygons = Projection::Mercator.project_polyline(&line, &vp, false);
        assert_eq!(polygons.len(), 2);
        let ring = Projection::Mercator.project_ring(&line, &vp, false);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_mercator_ring_across_date_line_stays_narrow() {
        let vp = Viewport::new(800, 400, 100, Orientation::IDENTITY);
        let ring = deg(&[(170.0, 10.0), (-170.0, 10.0), (-170.0, -10.0), (170.0, -10.0)]);
        for tessellate in [false, true] {
            let polygons = Projection::Mercator.project_ring(&ring, &vp, tessellate);
            assert_eq!(polygons.len(), 1, "tessellate {tessellate}");
            let xs = polygons[0].points().iter().map(|p| p.x);
            let (min, max) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
            // 20° of longitude at 2r/π px per radian is about 22.2 px.
            assert!(max - min < 50.0, "tessellate {tessellate}: span {}", max - min);
            assert_eq!(polygons[0].first(), polygons[0].last());
        }
    }

    #[test]
    fn test_vector_map_culls_far_side_and_paints() {
        let shapes = vec![
            GeoShape::ring(deg(&[(-10.0, -10.0), (10.0, -10.0), (10.0, 10.0)]), true),
            GeoShape::ring(deg(&[(170.0, -10.0), (175.0, 0.0), (170.0, 10.0)]), true),
            GeoShape::line(deg(&[(-30.0, 40.0), (30.0, 40.0)]), true),
            GeoShape::line(Vec::new(), true),
        ];
        let mut map = VectorMap::new(Projection::Spherical, ProjectionSettings::default());
        map.create_from_shapes(&shapes, &viewport());
        assert_eq!(map.culled(), 2);
        assert_eq!(map.polygons().len(), 2);

        let mut recorder = Recorder::default();
        map.paint(&mut recorder);
        assert_eq!(recorder.polygons, 1);
        assert_eq!(recorder.polylines, 1);
    }

    #[test]
    fn test_culling_can_be_turned_off() {
        // Looking at 60°S. The box corners and center all face away, but the
        // middle vertex at the equator is in view.
        let vp = Viewport::new(400, 400, 200, Orientation::from_geo(&GeoPoint::from_degrees(0.0, -60.0)));
        let shapes = vec![GeoShape::line(deg(&[(-100.0, 80.0), (0.0, 0.0), (100.0, 80.0)]), false)];

        let mut map = VectorMap::new(Projection::Spherical, ProjectionSettings::default());
        map.create_from_shapes(&shapes, &vp);
        assert_eq!(map.culled(), 1);
        assert!(map.polygons().is_empty());

        map.settings_mut().cull_hidden_shapes = false;
        map.create_from_shapes(&shapes, &vp);
        assert_eq!(map.culled(), 0);
        assert_eq!(map.polygons().len(), 1);
        assert!(!map.polygons()[0].closed());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let shapes: Vec<GeoShape> = (0..40)
            .map(|i| {
                let lon = -180.0 + i as f64 * 9.0;
                GeoShape::ring(deg(&[(lon, -20.0), (lon + 8.0, -20.0), (lon + 8.0, 25.0), (lon, 25.0)]), true)
            })
            .collect();
        let vp = Viewport::new(500, 500, 220, Orientation::from_geo(&GeoPoint::from_degrees(30.0, 20.0)));

        let sequential = ProjectionSettings { parallel_threshold: usize::MAX, ..Default::default() };
        let parallel = ProjectionSettings { parallel_threshold: 1, ..Default::default() };
        let mut a = VectorMap::new(Projection::Spherical, sequential);
        let mut b = VectorMap::new(Projection::Spherical, parallel);
        a.create_from_shapes(&shapes, &vp);
        b.create_from_shapes(&shapes, &vp);
        assert!(!a.polygons().is_empty());
        assert_eq!(a.polygons(), b.polygons());
        assert_eq!(a.culled(), b.culled());
    }

    #[test]
    fn test_zero_radius_viewport_does_not_panic() {
        let vp = Viewport::new(400, 400, 0, Orientation::IDENTITY);
        let ring = deg(&[(-20.0, -20.0), (20.0, -20.0), (20.0, 20.0)]);
        let polygons = Projection::Spherical.project_ring(&ring, &vp, true);
        assert!(polygons.iter().all(|p| p.len() >= 2));
    }
}
