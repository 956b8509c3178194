use glam::DVec2;
use std::f64::consts::{PI, TAU};

use crate::geo::{normalize_lon, GeoBoundingBox, GeoPoint};
use crate::map::polygon::ScreenPoint;
use crate::map::projection::Projected;
use crate::map::viewport::{ScreenRect, Viewport};

/// Latitude where the square Mercator map ends, atan(sinh(π)) ≈ 85.0511°.
pub const MAX_LAT: f64 = 1.484_422_229_745_332_4;

/// Pixels per radian of longitude. One map copy is `4 * radius` wide.
#[inline(always)]
fn rad_to_pixel(vp: &Viewport) -> f64 {
    2.0 * vp.radius() as f64 / PI
}

/// Web Mercator northing for a latitude in radians.
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    (lat.tan() + 1.0 / lat.cos()).ln()
}

#[inline(always)]
fn inverse_mercator_y(y: f64) -> f64 {
    y.sinh().atan()
}

/// Center of the flat map, taken from the globe orientation.
fn center_lonlat(vp: &Viewport) -> (f64, f64) {
    let orientation = vp.orientation();
    (orientation.yaw(), (-orientation.pitch()).clamp(-MAX_LAT, MAX_LAT))
}

/// Project onto the map copy nearest to the screen center.
pub(crate) fn project(geo: &GeoPoint, vp: &Viewport) -> Projected {
    let scale = rad_to_pixel(vp);
    let (center_lon, center_lat) = center_lonlat(vp);
    let lat = geo.lat().clamp(-MAX_LAT, MAX_LAT);

    let offset = DVec2::new(
        normalize_lon(geo.lon() - center_lon),
        -(mercator_y(lat) - mercator_y(center_lat)),
    ) * scale;
    let point = vp.center() + offset;

    Projected {
        point,
        visible: vp.contains(point),
        globe_hides_point: false,
    }
}

/// Every horizontal copy of the point that lands on screen.
pub(crate) fn project_with_repeats(geo: &GeoPoint, vp: &Viewport) -> Vec<ScreenPoint> {
    let base = project(geo, vp).point;
    let map_width = TAU * rad_to_pixel(vp);
    let height = vp.height() as f64;
    if base.y < 0.0 || base.y >= height {
        return Vec::new();
    }
    if map_width <= 0.0 {
        return if vp.contains(base) { vec![base] } else { Vec::new() };
    }

    let width = vp.width() as f64;
    let mut x = base.x - (base.x / map_width).floor() * map_width;
    let mut points = Vec::new();
    while x < width {
        points.push(DVec2::new(x, base.y));
        x += map_width;
    }
    points
}

pub(crate) fn unproject(x: f64, y: f64, vp: &Viewport) -> Option<GeoPoint> {
    if vp.radius() == 0 {
        return None;
    }
    let scale = rad_to_pixel(vp);
    let (center_lon, center_lat) = center_lonlat(vp);
    let center = vp.center();

    let lon = center_lon + (x - center.x) / scale;
    let lat = inverse_mercator_y(mercator_y(center_lat) - (y - center.y) / scale);
    if lat.abs() > MAX_LAT {
        return None;
    }
    Some(GeoPoint::new(lon, lat))
}

/// Screen y of a latitude line.
fn screen_y(lat: f64, vp: &Viewport) -> f64 {
    let (_, center_lat) = center_lonlat(vp);
    vp.center().y - rad_to_pixel(vp) * (mercator_y(lat) - mercator_y(center_lat))
}

/// The map repeats horizontally, so only its top and bottom edges matter.
pub(crate) fn covers_viewport(vp: &Viewport) -> bool {
    screen_y(MAX_LAT, vp) <= 0.0 && screen_y(-MAX_LAT, vp) >= vp.height() as f64
}

pub(crate) fn visible_box(rect: &ScreenRect, vp: &Viewport) -> GeoBoundingBox {
    let scale = rad_to_pixel(vp);
    if scale <= 0.0 {
        return GeoBoundingBox::full();
    }
    let (center_lon, center_lat) = center_lonlat(vp);
    let center = vp.center();

    let lat_at = |y: f64| {
        inverse_mercator_y(mercator_y(center_lat) - (y - center.y) / scale).clamp(-MAX_LAT, MAX_LAT)
    };
    let north = lat_at(rect.y as f64);
    let south = lat_at(rect.y as f64 + rect.height as f64);

    let (west, east) = if rect.width as f64 >= TAU * scale {
        (-PI, PI)
    } else {
        let lon_at = |x: f64| normalize_lon(center_lon + (x - center.x) / scale);
        (lon_at(rect.x as f64), lon_at(rect.x as f64 + rect.width as f64))
    };

    GeoBoundingBox::new(north, south, east, west)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::orientation::Orientation;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn test_max_lat_constant() {
        assert_close(MAX_LAT, PI.sinh().atan(), 1e-15);
        assert_close(mercator_y(MAX_LAT), PI, 1e-9);
    }

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(100, 100, 25, Orientation::IDENTITY);
        let p = project(&GeoPoint::new(0.0, 0.0), &vp);
        assert_close(p.point.x, 50.0, 1e-9);
        assert_close(p.point.y, 50.0, 1e-9);
        assert!(p.visible);
        assert!(!p.globe_hides_point);
    }

    #[test]
    fn test_map_is_four_radii_wide() {
        let vp = Viewport::new(1000, 1000, 100, Orientation::IDENTITY);
        let east = project(&GeoPoint::from_degrees(90.0, 0.0), &vp);
        assert_close(east.point.x - 500.0, 100.0, 1e-9);
        let top = screen_y(MAX_LAT, &vp);
        assert_close(500.0 - top, 200.0, 1e-6);
    }

    #[test]
    fn test_repeats_span_the_screen() {
        // Map copies are 40 px wide on a 200 px screen.
        let vp = Viewport::new(200, 100, 10, Orientation::IDENTITY);
        let copies = project_with_repeats(&GeoPoint::new(0.0, 0.0), &vp);
        assert_eq!(copies.len(), 5);
        for pair in copies.windows(2) {
            assert_close(pair[1].x - pair[0].x, 40.0, 1e-9);
        }
        assert!(copies.iter().all(|p| vp.contains(*p)));
    }

    #[test]
    fn test_round_trip() {
        let vp = Viewport::new(800, 600, 150, Orientation::from_geo(&GeoPoint::from_degrees(20.0, 30.0)));
        for (lon, lat) in [(20.0, 30.0), (-10.0, 50.0), (60.0, -5.0)] {
            let geo = GeoPoint::from_degrees(lon, lat);
            let p = project(&geo, &vp);
            let back = unproject(p.point.x, p.point.y, &vp).unwrap();
            assert_close(back.lon(), geo.lon(), 1e-9);
            assert_close(back.lat(), geo.lat(), 1e-9);
        }
    }

    #[test]
    fn test_unproject_beyond_map_edge() {
        let vp = Viewport::new(100, 1000, 10, Orientation::IDENTITY);
        assert!(unproject(50.0, 0.0, &vp).is_none());
        assert!(unproject(50.0, 500.0, &vp).is_some());
        let empty = Viewport::new(100, 100, 0, Orientation::IDENTITY);
        assert!(unproject(50.0, 50.0, &empty).is_none());
    }

    #[test]
    fn test_covers_viewport() {
        let o = Orientation::IDENTITY;
        assert!(covers_viewport(&Viewport::new(800, 600, 400, o)));
        assert!(!covers_viewport(&Viewport::new(800, 600, 100, o)));
        assert!(!covers_viewport(&Viewport::new(800, 600, 0, o)));
    }

    #[test]
    fn test_visible_box() {
        let vp = Viewport::new(200, 200, 100, Orientation::IDENTITY);
        let bbox = visible_box(&vp.screen_rect(), &vp);
        assert_close(bbox.west, -PI / 2.0, 1e-9);
        assert_close(bbox.east, PI / 2.0, 1e-9);
        assert!(bbox.north > 0.0 && bbox.north <= MAX_LAT);
        assert_close(bbox.south, -bbox.north, 1e-9);

        let wide = Viewport::new(1000, 200, 100, Orientation::IDENTITY);
        assert!(visible_box(&wide.screen_rect(), &wide).covers_all_longitudes());
    }
}
