//! Projection core for drawing geographic vector data on a rotating globe
//! or a flat Mercator map.
//!
//! Geometry goes in as longitude/latitude sequences plus a [`Viewport`];
//! screen-space [`ScreenPolygon`]s come out, clipped against the visible
//! hemisphere and tessellated so long segments follow the sphere.

pub mod config;
pub mod geo;
pub mod map;

pub use config::ProjectionSettings;
pub use geo::{AngleUnit, GeoBoundingBox, GeoPoint, EARTH_RADIUS};
pub use map::{
    GeoShape, HorizonClipper, Orientation, Painter, Projected, Projection, ScreenPoint,
    ScreenPolygon, ScreenRect, Tessellator, VectorMap, Viewport, ViewportError,
};
