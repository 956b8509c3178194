mod globe;
mod horizon;
mod mercator;
mod orientation;
mod polygon;
mod projection;
mod tessellate;
mod vector;
mod viewport;

pub use globe::HIGH_ALTITUDE_THRESHOLD;
pub use horizon::HorizonClipper;
pub use mercator::MAX_LAT as MERCATOR_MAX_LAT;
pub use orientation::Orientation;
pub use polygon::{Painter, ScreenPoint, ScreenPolygon};
pub use projection::{Projected, Projection};
pub use tessellate::{suggest_subdivisions, Tessellator};
pub use vector::{GeoShape, VectorMap};
pub use viewport::{ScreenRect, Viewport, ViewportError};
