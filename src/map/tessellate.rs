use glam::DVec2;
use tracing::trace;

use crate::config::ProjectionSettings;
use crate::geo::{normalize_lon, GeoPoint};
use crate::map::projection::{Projected, Projection};
use crate::map::viewport::Viewport;

/// Number of intermediate points for a segment `distance` pixels long.
#[inline]
pub fn suggest_subdivisions(distance: f64, precision: f64) -> usize {
    if precision <= 0.0 || !distance.is_finite() {
        return 0;
    }
    (distance / precision).floor().max(0.0) as usize
}

/// Decides where long segments need extra points so that they follow
/// the sphere on screen, and produces those points.
#[derive(Clone, Copy, Debug)]
pub struct Tessellator {
    precision_px: f64,
    horizon_distance_px: f64,
    respect_latitude_circle: bool,
}

impl Tessellator {
    pub fn new(settings: &ProjectionSettings) -> Self {
        Self {
            precision_px: settings.precision_px,
            horizon_distance_px: settings.horizon_distance_px,
            respect_latitude_circle: settings.respect_latitude_circle,
        }
    }

    /// On-screen length estimate of a segment. The Manhattan length
    /// overestimates by at most √2; segments touching the far side get a
    /// fixed large value since their chord says little about the arc.
    pub fn segment_distance(&self, prev: &Projected, cur: &Projected) -> f64 {
        if prev.globe_hides_point || cur.globe_hides_point {
            return self.horizon_distance_px;
        }
        let d = cur.point - prev.point;
        d.x.abs() + d.y.abs()
    }

    /// Intermediate point count for the segment, or `None` if it is short
    /// enough or cannot reach the screen.
    pub fn subdivisions(&self, prev: &Projected, cur: &Projected, vp: &Viewport) -> Option<usize> {
        let distance = self.segment_distance(prev, cur);
        if distance <= self.precision_px {
            return None;
        }
        if !might_cross_viewport(prev, cur, distance, vp) {
            return None;
        }
        let count = suggest_subdivisions(distance, self.precision_px);
        trace!(distance, count, "subdividing segment");
        Some(count)
    }

    /// Point at fraction `t` of the way from `a` to `b`.
    pub fn interpolate(&self, a: &GeoPoint, b: &GeoPoint, t: f64) -> GeoPoint {
        let altitude = a.altitude() + (b.altitude() - a.altitude()) * t;

        if self.respect_latitude_circle && a.lat() == b.lat() {
            let span = normalize_lon(b.lon() - a.lon());
            return GeoPoint::with_altitude(a.lon() + span * t, a.lat(), altitude);
        }

        let va = a.to_unit_vector();
        let vb = b.to_unit_vector();
        let angle = va.dot(vb).clamp(-1.0, 1.0).acos();
        let sin_angle = angle.sin();

        let v = if sin_angle.abs() < 1e-10 {
            // Nearly identical or antipodal: no unique great circle.
            let mixed = va.lerp(vb, t);
            if mixed.length_squared() < 1e-20 {
                va
            } else {
                mixed
            }
        } else {
            va * (((1.0 - t) * angle).sin() / sin_angle) + vb * ((t * angle).sin() / sin_angle)
        };

        let geo = GeoPoint::from_vector(v);
        GeoPoint::with_altitude(geo.lon(), geo.lat(), altitude)
    }

    /// `count` evenly spaced points strictly between `a` and `b`, each
    /// projected on its own.
    pub fn tessellate_segment(
        &self,
        a: &GeoPoint,
        b: &GeoPoint,
        count: usize,
        projection: Projection,
        vp: &Viewport,
    ) -> Vec<Projected> {
        let steps = (count + 1) as f64;
        (1..=count)
            .map(|i| projection.project(&self.interpolate(a, b, i as f64 / steps), vp))
            .collect()
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new(&ProjectionSettings::default())
    }
}

/// False only if both endpoints lie off screen, beyond the same edge, by
/// more than half the segment length.
fn might_cross_viewport(prev: &Projected, cur: &Projected, distance: f64, vp: &Viewport) -> bool {
    if prev.visible || cur.visible {
        return true;
    }
    let margin = distance / 2.0;
    let far = DVec2::new(vp.width() as f64 + margin, vp.height() as f64 + margin);
    let (a, b) = (prev.point, cur.point);

    let both_left = a.x < -margin && b.x < -margin;
    let both_above = a.y < -margin && b.y < -margin;
    let both_right = a.x > far.x && b.x > far.x;
    let both_below = a.y > far.y && b.y > far.y;
    !(both_left || both_above || both_right || both_below)
}
