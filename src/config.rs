/// Tuning knobs for turning geographic shapes into screen polygons.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionSettings {
    /// Maximum on-screen length of a segment before it gets subdivided.
    pub precision_px: f64,
    /// Distance assumed for segments touching the far side of the globe,
    /// so they are always subdivided near the limb.
    pub horizon_distance_px: f64,
    /// Subdivide segments between points of equal latitude along the
    /// parallel instead of the great circle.
    pub respect_latitude_circle: bool,
    /// Skip shapes whose bounding box lies entirely on the far side.
    pub cull_hidden_shapes: bool,
    /// Batches with at least this many shapes are traced in parallel.
    pub parallel_threshold: usize,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            precision_px: 70.0,
            horizon_distance_px: 350.0,
            respect_latitude_circle: true,
            cull_hidden_shapes: true,
            parallel_threshold: 64,
        }
    }
}
