use glam::{DVec2, DVec3};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::geo::{normalize_lon, GeoBoundingBox, GeoPoint, EARTH_RADIUS};
use crate::map::polygon::ScreenPoint;
use crate::map::projection::Projected;
use crate::map::viewport::{ScreenRect, Viewport};

/// Points at or below this altitude (meters) count as surface points.
pub const HIGH_ALTITUDE_THRESHOLD: f64 = 10_000.0;

/// Pitch closer to zero than this counts as a view of the equator.
const EQUATORIAL_PITCH_EPSILON: f64 = 1e-9;

/// Samples taken along each edge of the screen rectangle.
const EDGE_SAMPLES: u32 = 32;

/// Orthographic projection of a geographic point onto the screen.
#[inline]
pub(crate) fn project(geo: &GeoPoint, vp: &Viewport) -> Projected {
    project_direction(geo.to_unit_vector(), geo.altitude(), vp)
}

/// Project a world-space unit direction lifted to `altitude` meters.
pub(crate) fn project_direction(world: DVec3, altitude: f64, vp: &Viewport) -> Projected {
    let rotated = *vp.view_matrix() * world;
    let radius = vp.radius() as f64;
    let pixel_altitude = radius * (EARTH_RADIUS + altitude) / EARTH_RADIUS;

    // Screen y grows downwards.
    let offset = DVec2::new(rotated.x, -rotated.y) * pixel_altitude;
    let point = vp.center() + offset;

    let globe_hides_point = if altitude <= HIGH_ALTITUDE_THRESHOLD {
        !(rotated.z > 0.0)
    } else {
        // Orbiting markers behind the globe still show when they peek
        // around the limb.
        rotated.z < 0.0 && offset.length_squared() < radius * radius
    };

    Projected {
        point,
        visible: !globe_hides_point && vp.contains(point),
        globe_hides_point,
    }
}

/// Whether a surface point lies on the hemisphere facing the viewer.
#[inline]
pub(crate) fn faces_viewer(geo: &GeoPoint, vp: &Viewport) -> bool {
    (*vp.view_matrix() * geo.to_unit_vector()).z > 0.0
}

/// Geographic point under a screen position, or `None` if the position
/// is off the globe.
pub(crate) fn unproject(x: f64, y: f64, vp: &Viewport) -> Option<GeoPoint> {
    let radius = vp.radius() as f64;
    let d = DVec2::new(x, y) - vp.center();
    if d.length_squared() >= radius * radius {
        return None;
    }

    let qx = d.x / radius;
    let qy = -d.y / radius;
    // Rounding at the silhouette can push this slightly negative.
    let qz = (1.0 - qy * qy - qx * qx).max(0.0).sqrt();

    let world = vp.orientation().rotate(DVec3::new(qx, qy, qz));
    Some(GeoPoint::from_vector(world))
}

/// True if the globe's disk covers the whole screen.
pub(crate) fn covers_viewport(vp: &Viewport) -> bool {
    let radius = vp.radius() as u128;
    let width = vp.width() as u128;
    let height = vp.height() as u128;

    // Catches huge radii before the exact test.
    if radius > width + height {
        return true;
    }

    // Comparing against the half-diagonal, hence the 4.
    4 * radius * radius >= vp.squared_diagonal_reach()
}

/// Geographic range visible inside `rect`.
pub(crate) fn visible_box(rect: &ScreenRect, vp: &Viewport) -> GeoBoundingBox {
    let mut bbox = scan_visible_box(rect, vp);

    let orientation = vp.orientation();
    let pitch = orientation.pitch();

    // With the whole disk on screen the range follows from the pitch alone.
    if disk_inside(rect, vp) {
        if pitch > EQUATORIAL_PITCH_EPSILON {
            // South pole faces the viewer.
            bbox.west = -PI;
            bbox.east = PI;
            bbox.north = (FRAC_PI_2 - pitch.abs()).abs();
            bbox.south = -FRAC_PI_2;
        } else if pitch < -EQUATORIAL_PITCH_EPSILON {
            bbox.west = -PI;
            bbox.east = PI;
            bbox.north = FRAC_PI_2;
            bbox.south = -(FRAC_PI_2 - pitch.abs()).abs();
        } else {
            // Both poles sit on the silhouette: exactly one half of the
            // meridians is visible.
            let yaw = orientation.yaw();
            bbox.west = normalize_lon(yaw - FRAC_PI_2);
            bbox.east = normalize_lon(yaw + FRAC_PI_2);
            bbox.north = FRAC_PI_2;
            bbox.south = -FRAC_PI_2;
        }
    }

    // All meridians meet at a visible pole.
    for (pole, lat) in [(DVec3::Y, FRAC_PI_2), (DVec3::NEG_Y, -FRAC_PI_2)] {
        let projected = project_direction(pole, 0.0, vp);
        if !projected.globe_hides_point && rect.contains(projected.point) {
            bbox.west = -PI;
            bbox.east = PI;
            if lat > 0.0 {
                bbox.north = lat;
            } else {
                bbox.south = lat;
            }
        }
    }

    bbox
}

fn disk_inside(rect: &ScreenRect, vp: &Viewport) -> bool {
    let radius = vp.radius() as f64;
    let center = vp.center();
    center.x - radius >= rect.x as f64
        && center.x + radius < rect.x as f64 + rect.width as f64
        && center.y - radius >= rect.y as f64
        && center.y + radius < rect.y as f64 + rect.height as f64
}

/// Sample the rectangle's edges, its center and the part of the
/// silhouette that falls inside it.
fn scan_visible_box(rect: &ScreenRect, vp: &Viewport) -> GeoBoundingBox {
    let mut samples = Vec::with_capacity(4 * (EDGE_SAMPLES as usize + 1) + 361);
    let mut sample = |p: ScreenPoint| {
        if let Some(geo) = unproject(p.x, p.y, vp) {
            samples.push(geo);
        }
    };

    let x0 = rect.x as f64;
    let y0 = rect.y as f64;
    let x1 = x0 + (rect.width.max(1) - 1) as f64;
    let y1 = y0 + (rect.height.max(1) - 1) as f64;

    for i in 0..=EDGE_SAMPLES {
        let t = i as f64 / EDGE_SAMPLES as f64;
        let x = x0 + (x1 - x0) * t;
        let y = y0 + (y1 - y0) * t;
        sample(DVec2::new(x, y0));
        sample(DVec2::new(x, y1));
        sample(DVec2::new(x0, y));
        sample(DVec2::new(x1, y));
    }
    sample(rect.center());

    let limb = vp.radius() as f64 * (1.0 - 1e-9);
    let center = vp.center();
    for deg in 0..360 {
        let angle = (deg as f64).to_radians();
        let p = center + DVec2::new(angle.cos(), angle.sin()) * limb;
        if rect.contains(p) {
            sample(p);
        }
    }

    GeoBoundingBox::from_points(&samples).unwrap_or_else(GeoBoundingBox::full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::orientation::Orientation;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn identity_viewport() -> Viewport {
        Viewport::new(400, 400, 200, Orientation::IDENTITY)
    }

    #[test]
    fn test_project_center_and_antipode() {
        let vp = identity_viewport();
        let center = project(&GeoPoint::new(0.0, 0.0), &vp);
        assert!(center.visible);
        assert_close(center.point.x, 200.0, 1e-9);
        assert_close(center.point.y, 200.0, 1e-9);

        let back = project(&GeoPoint::from_degrees(180.0, 0.0), &vp);
        assert!(!back.visible);
        assert!(back.globe_hides_point);
    }

    #[test]
    fn test_north_is_up_on_screen() {
        let vp = identity_viewport();
        let p = project(&GeoPoint::from_degrees(0.0, 30.0), &vp);
        assert!(p.point.y < 200.0);
        let p = project(&GeoPoint::from_degrees(30.0, 0.0), &vp);
        assert!(p.point.x > 200.0);
    }

    #[test]
    fn test_visibility_matches_hemisphere_for_surface_points() {
        let vp = Viewport::new(
            2000,
            2000,
            500,
            Orientation::from_geo(&GeoPoint::from_degrees(20.0, 35.0)),
        );
        for lon in (-180..180).step_by(15) {
            for lat in (-75..=75).step_by(15) {
                let geo = GeoPoint::from_degrees(lon as f64, lat as f64);
                let rotated = *vp.view_matrix() * geo.to_unit_vector();
                let projected = project(&geo, &vp);
                assert_eq!(projected.visible, rotated.z > 0.0, "lon {lon} lat {lat}");
                assert_eq!(faces_viewer(&geo, &vp), rotated.z > 0.0);
            }
        }
    }

    #[test]
    fn test_off_screen_point_is_not_visible() {
        // Zoomed in: the limb lies far outside the screen.
        let vp = Viewport::new(100, 100, 5000, Orientation::IDENTITY);
        let p = project(&GeoPoint::from_degrees(20.0, 0.0), &vp);
        assert!(!p.globe_hides_point);
        assert!(!p.visible);
    }

    #[test]
    fn test_high_altitude_marker_peeks_around_limb() {
        let vp = identity_viewport();
        // Just behind the limb, high enough to stick out of the disk.
        let satellite = GeoPoint::with_altitude(95f64.to_radians(), 0.0, 2.0 * EARTH_RADIUS);
        let p = project(&satellite, &vp);
        assert!(!p.globe_hides_point);

        // Directly behind the globe it stays hidden.
        let hidden = GeoPoint::with_altitude(PI, 0.0, 100_000.0);
        assert!(project(&hidden, &vp).globe_hides_point);

        // A low point just behind the limb is hidden.
        let low = GeoPoint::with_altitude(95f64.to_radians(), 0.0, 5_000.0);
        assert!(project(&low, &vp).globe_hides_point);
    }

    #[test]
    fn test_round_trip_exact() {
        let vp = Viewport::new(
            1600,
            1200,
            500,
            Orientation::from_yaw_pitch_roll(0.4, -0.3, 0.2),
        );
        for lon in (-180..180).step_by(10) {
            for lat in (-80..=80).step_by(10) {
                let geo = GeoPoint::from_degrees(lon as f64, lat as f64);
                let projected = project(&geo, &vp);
                if !projected.visible {
                    continue;
                }
                let back = unproject(projected.point.x, projected.point.y, &vp).unwrap();
                let v = geo.to_unit_vector();
                let w = back.to_unit_vector();
                assert!((v - w).length() < 1e-9, "lon {lon} lat {lat}");
            }
        }
    }

    #[test]
    fn test_round_trip_through_pixels() {
        let vp = Viewport::new(4000, 4000, 1800, Orientation::from_geo(&GeoPoint::from_degrees(-60.0, 10.0)));
        for (lon, lat) in [(-60.0, 10.0), (-30.0, 40.0), (-90.0, -20.0), (-45.0, 0.0)] {
            let geo = GeoPoint::from_degrees(lon, lat);
            let p = project(&geo, &vp);
            assert!(p.visible);
            let back = unproject(p.point.x.round(), p.point.y.round(), &vp).unwrap();
            assert_close(back.lon(), geo.lon(), 2e-3);
            assert_close(back.lat(), geo.lat(), 2e-3);
        }
    }

    #[test]
    fn test_unproject_outside_disk() {
        let vp = identity_viewport();
        assert!(unproject(0.0, 0.0, &vp).is_none());
        assert!(unproject(400.0, 200.0, &vp).is_none());
        assert!(unproject(200.0, 200.0, &vp).is_some());

        let empty = Viewport::new(400, 400, 0, Orientation::IDENTITY);
        assert!(unproject(200.0, 200.0, &empty).is_none());
    }

    #[test]
    fn test_covers_viewport() {
        let o = Orientation::IDENTITY;
        assert!(covers_viewport(&Viewport::new(800, 600, 1000, o)));
        assert!(!covers_viewport(&Viewport::new(800, 600, 10, o)));
        assert!(!covers_viewport(&Viewport::new(800, 600, 0, o)));
        // Half diagonal is exactly 500.
        assert!(covers_viewport(&Viewport::new(800, 600, 500, o)));
        assert!(!covers_viewport(&Viewport::new(800, 600, 499, o)));
        assert!(covers_viewport(&Viewport::new(u32::MAX, u32::MAX, u32::MAX, o)));
    }

    #[test]
    fn test_coverage_threshold_is_monotonic() {
        let o = Orientation::IDENTITY;
        for (w, h) in [(640u32, 480u32), (1023, 17), (1, 1), (1920, 1080)] {
            let threshold = (((w as f64).powi(2) + (h as f64).powi(2)).sqrt() / 2.0).ceil() as u32;
            for radius in threshold..threshold + 50 {
                assert!(covers_viewport(&Viewport::new(w, h, radius, o)), "{w}x{h} r={radius}");
            }
        }
    }

    #[test]
    fn test_visible_box_equatorial_full_disk() {
        let yaw = 30f64.to_radians();
        let vp = Viewport::new(400, 400, 150, Orientation::from_geo(&GeoPoint::new(yaw, 0.0)));
        let bbox = visible_box(&vp.screen_rect(), &vp);
        assert_close(bbox.west, yaw - FRAC_PI_2, 1e-9);
        assert_close(bbox.east, yaw + FRAC_PI_2, 1e-9);
        assert_close(bbox.north, FRAC_PI_2, 1e-9);
        assert_close(bbox.south, -FRAC_PI_2, 1e-9);
    }

    #[test]
    fn test_visible_box_tilted_full_disk() {
        // Looking at 40°S: the south pole is visible, north ends at 50°N.
        let vp = Viewport::new(400, 400, 150, Orientation::from_geo(&GeoPoint::from_degrees(10.0, -40.0)));
        let bbox = visible_box(&vp.screen_rect(), &vp);
        assert!(bbox.covers_all_longitudes());
        assert_close(bbox.north, 50f64.to_radians(), 1e-9);
        assert_close(bbox.south, -FRAC_PI_2, 1e-9);

        let vp = Viewport::new(400, 400, 150, Orientation::from_geo(&GeoPoint::from_degrees(10.0, 40.0)));
        let bbox = visible_box(&vp.screen_rect(), &vp);
        assert_close(bbox.north, FRAC_PI_2, 1e-9);
        assert_close(bbox.south, -50f64.to_radians(), 1e-9);
    }

    #[test]
    fn test_visible_box_zoomed_in() {
        let center = GeoPoint::from_degrees(12.0, 45.0);
        let vp = Viewport::new(200, 100, 20_000, Orientation::from_geo(&center));
        let bbox = visible_box(&vp.screen_rect(), &vp);
        assert!(bbox.contains(&center));
        assert!(!bbox.covers_all_longitudes());
        assert!(bbox.width() < 2f64.to_radians());
        assert!(bbox.height() < 1f64.to_radians());
    }

    #[test]
    fn test_visible_box_pole_in_view() {
        let vp = Viewport::new(300, 300, 2000, Orientation::from_geo(&GeoPoint::from_degrees(0.0, 89.0)));
        let bbox = visible_box(&vp.screen_rect(), &vp);
        assert!(bbox.covers_all_longitudes());
        assert_close(bbox.north, FRAC_PI_2, 1e-12);
    }
}
