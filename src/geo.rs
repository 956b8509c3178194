use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Radius of the reference sphere in meters.
pub const EARTH_RADIUS: f64 = 6_378_000.0;

/// Wrap a longitude in radians into (-π, π].
#[inline(always)]
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Clamp a latitude in radians into [-π/2, π/2].
#[inline(always)]
pub fn normalize_lat(lat: f64) -> f64 {
    lat.clamp(-FRAC_PI_2, FRAC_PI_2)
}

/// Unit for angles handed back to callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AngleUnit {
    #[default]
    Radian,
    Degree,
}

impl AngleUnit {
    /// Convert an angle in radians into this unit.
    #[inline]
    pub fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Radian => angle,
            AngleUnit::Degree => angle.to_degrees(),
        }
    }
}

/// A geographic position: longitude and latitude in radians, altitude in
/// meters above the reference sphere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
    altitude: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self::with_altitude(lon, lat, 0.0)
    }

    pub fn with_altitude(lon: f64, lat: f64, altitude: f64) -> Self {
        Self {
            lon: normalize_lon(lon),
            lat: normalize_lat(lat),
            altitude,
        }
    }

    /// Build from longitude/latitude in degrees.
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self::new(lon.to_radians(), lat.to_radians())
    }

    #[inline(always)]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    #[inline(always)]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline(always)]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Direction on the unit sphere. +Y is the north pole, +Z points at
    /// (0°, 0°) and +X at (90°E, 0°).
    #[inline(always)]
    pub fn to_unit_vector(&self) -> DVec3 {
        let (sin_lon, cos_lon) = self.lon.sin_cos();
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        DVec3::new(cos_lat * sin_lon, sin_lat, cos_lat * cos_lon)
    }

    /// Inverse of [`GeoPoint::to_unit_vector`]. The vector need not be
    /// normalized; the altitude is zero.
    pub fn from_vector(v: DVec3) -> Self {
        let len = v.length();
        if len <= f64::EPSILON {
            return Self::default();
        }
        let lat = (v.y / len).clamp(-1.0, 1.0).asin();
        let lon = v.x.atan2(v.z);
        Self::new(lon, lat)
    }
}

/// Geographic bounding box in radians. When `west > east` the box crosses
/// the date line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self { north, south, east, west }
    }

    /// The whole sphere.
    pub fn full() -> Self {
        Self::new(FRAC_PI_2, -FRAC_PI_2, PI, -PI)
    }

    /// Smallest box enclosing the points. Longitudes are spanned the short
    /// way: the largest gap between neighbouring longitudes is left out.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut lons = Vec::new();
        let mut north = f64::MIN;
        let mut south = f64::MAX;
        for p in points {
            lons.push(p.lon());
            north = north.max(p.lat());
            south = south.min(p.lat());
        }
        if lons.is_empty() {
            return None;
        }
        lons.sort_by(|a, b| a.total_cmp(b));

        let first = lons[0];
        let last = lons[lons.len() - 1];
        // Gap across the date line, from the easternmost back to the westernmost.
        let mut widest = first + TAU - last;
        let (mut west, mut east) = (first, last);
        for pair in lons.windows(2) {
            let gap = pair[1] - pair[0];
            if gap > widest {
                widest = gap;
                west = pair[1];
                east = pair[0];
            }
        }
        Some(Self::new(north, south, east, west))
    }

    #[inline]
    pub fn crosses_date_line(&self) -> bool {
        self.west > self.east
    }

    /// Longitude extent in radians, in [0, 2π].
    pub fn width(&self) -> f64 {
        if self.crosses_date_line() {
            self.east + TAU - self.west
        } else {
            self.east - self.west
        }
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn covers_all_longitudes(&self) -> bool {
        self.width() >= TAU - 1e-12
    }

    pub fn center(&self) -> GeoPoint {
        let lon = normalize_lon(self.west + self.width() / 2.0);
        GeoPoint::new(lon, (self.north + self.south) / 2.0)
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        if p.lat() > self.north || p.lat() < self.south {
            return false;
        }
        if self.covers_all_longitudes() {
            return true;
        }
        if self.crosses_date_line() {
            p.lon() >= self.west || p.lon() <= self.east
        } else {
            p.lon() >= self.west && p.lon() <= self.east
        }
    }

    /// The four corners followed by the center.
    pub fn boundary(&self) -> [GeoPoint; 5] {
        [
            GeoPoint::new(self.west, self.north),
            GeoPoint::new(self.east, self.north),
            GeoPoint::new(self.east, self.south),
            GeoPoint::new(self.west, self.south),
            self.center(),
        ]
    }

    /// Human readable form in degrees, as shown in the status bar.
    pub fn to_degrees_string(&self) -> String {
        format!(
            "N{:.1} S{:.1} W{:.1} E{:.1}",
            self.north.to_degrees(),
            self.south.to_degrees(),
            self.west.to_degrees(),
            self.east.to_degrees()
        )
    }
}

impl Default for GeoBoundingBox {
    fn default() -> Self {
        Self::full()
    }
}
