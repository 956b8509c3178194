use crate::config::ProjectionSettings;
use crate::geo::{AngleUnit, GeoBoundingBox, GeoPoint};
use crate::map::polygon::{ScreenPoint, ScreenPolygon};
use crate::map::viewport::{ScreenRect, Viewport};
use crate::map::{globe, mercator, vector};

/// Result of projecting one geographic point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub point: ScreenPoint,
    /// Drawn on screen: not behind the globe and inside the viewport.
    pub visible: bool,
    /// Behind the globe. Always false for flat projections.
    pub globe_hides_point: bool,
}

impl Projected {
    /// On the viewer's side of the globe, whether or not on screen.
    #[inline(always)]
    pub fn faces_viewer(&self) -> bool {
        !self.globe_hides_point
    }
}

/// The supported map projections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Orthographic view of a rotating sphere.
    #[default]
    Spherical,
    /// Flat cylindrical map, repeating east-west.
    Mercator,
}

impl Projection {
    pub fn name(self) -> &'static str {
        match self {
            Projection::Spherical => "Globe",
            Projection::Mercator => "Mercator",
        }
    }

    /// The other projection, for toggling.
    pub fn next(self) -> Self {
        match self {
            Projection::Spherical => Projection::Mercator,
            Projection::Mercator => Projection::Spherical,
        }
    }

    /// Whether part of the map can be hidden behind a horizon.
    #[inline]
    pub fn has_horizon(self) -> bool {
        matches!(self, Projection::Spherical)
    }

    #[inline]
    pub fn project(self, geo: &GeoPoint, vp: &Viewport) -> Projected {
        match self {
            Projection::Spherical => globe::project(geo, vp),
            Projection::Mercator => mercator::project(geo, vp),
        }
    }

    /// All on-screen copies of a point plus whether the globe hides it.
    /// Only repeating projections return more than one copy.
    pub fn project_with_repeats(self, geo: &GeoPoint, vp: &Viewport) -> (Vec<ScreenPoint>, bool) {
        match self {
            Projection::Spherical => {
                let projected = globe::project(geo, vp);
                let points = if projected.visible { vec![projected.point] } else { Vec::new() };
                (points, projected.globe_hides_point)
            }
            Projection::Mercator => (mercator::project_with_repeats(geo, vp), false),
        }
    }

    /// Geographic point under a pixel, or `None` for a pixel off the map.
    pub fn unproject(self, x: i32, y: i32, vp: &Viewport) -> Option<GeoPoint> {
        self.unproject_point(x as f64, y as f64, vp)
    }

    /// [`Projection::unproject`] returning longitude/latitude in `unit`.
    pub fn geo_coordinates(
        self,
        x: i32,
        y: i32,
        vp: &Viewport,
        unit: AngleUnit,
    ) -> Option<(f64, f64)> {
        self.unproject(x, y, vp)
            .map(|geo| (unit.from_radians(geo.lon()), unit.from_radians(geo.lat())))
    }

    /// Sub-pixel variant of [`Projection::unproject`].
    pub fn unproject_point(self, x: f64, y: f64, vp: &Viewport) -> Option<GeoPoint> {
        match self {
            Projection::Spherical => globe::unproject(x, y, vp),
            Projection::Mercator => mercator::unproject(x, y, vp),
        }
    }

    /// True if the map fills the whole viewport.
    pub fn covers_viewport(self, vp: &Viewport) -> bool {
        match self {
            Projection::Spherical => globe::covers_viewport(vp),
            Projection::Mercator => mercator::covers_viewport(vp),
        }
    }

    /// Geographic range visible inside `rect`.
    pub fn visible_box(self, rect: &ScreenRect, vp: &Viewport) -> GeoBoundingBox {
        match self {
            Projection::Spherical => globe::visible_box(rect, vp),
            Projection::Mercator => mercator::visible_box(rect, vp),
        }
    }

    /// Project an open line with default settings.
    pub fn project_polyline(
        self,
        points: &[GeoPoint],
        vp: &Viewport,
        tessellate: bool,
    ) -> Vec<ScreenPolygon> {
        vector::trace(self, &ProjectionSettings::default(), points, false, tessellate, vp)
    }

    /// Project a closed ring with default settings.
    pub fn project_ring(self, points: &[GeoPoint], vp: &Viewport, tessellate: bool) -> Vec<ScreenPolygon> {
        vector::trace(self, &ProjectionSettings::default(), points, true, tessellate, vp)
    }
}
