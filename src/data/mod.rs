use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tui_globe::{GeoPoint, GeoShape};

/// Shapes grouped by how the viewer draws them.
#[derive(Default)]
pub struct GeoLayers {
    pub coastlines: Vec<GeoShape>,
    pub borders: Vec<GeoShape>,
}

impl GeoLayers {
    pub fn is_empty(&self) -> bool {
        self.coastlines.is_empty() && self.borders.is_empty()
    }

    pub fn shape_count(&self) -> usize {
        self.coastlines.len() + self.borders.len()
    }

    pub fn set_tessellate(&mut self, tessellate: bool) {
        for shape in self.coastlines.iter_mut().chain(self.borders.iter_mut()) {
            shape.set_tessellate(tessellate);
        }
    }
}

/// Natural Earth coastline files, coarsest first. The first one found wins.
const COASTLINE_FILES: [&str; 3] = ["ne_110m_coastline.json", "ne_50m_coastline.json", "ne_10m_coastline.json"];

const BORDER_FILES: [&str; 3] = [
    "ne_110m_admin_0_countries.json",
    "ne_50m_admin_0_countries.json",
    "ne_50m_borders.json",
];

/// Load whatever GeoJSON layers exist under `data_dir`. Files that fail
/// to load are logged and skipped.
pub fn load_layers(data_dir: &Path) -> GeoLayers {
    GeoLayers {
        coastlines: load_first(data_dir, &COASTLINE_FILES),
        borders: load_first(data_dir, &BORDER_FILES),
    }
}

fn load_first(data_dir: &Path, candidates: &[&str]) -> Vec<GeoShape> {
    for filename in candidates {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match load_shapes(&path) {
            Ok(shapes) => {
                info!(file = %path.display(), shapes = shapes.len(), "loaded geojson");
                return shapes;
            }
            Err(e) => warn!(file = %path.display(), error = %e, "failed to load geojson"),
        }
    }
    Vec::new()
}

fn load_shapes(path: &Path) -> Result<Vec<GeoShape>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_shapes(&mut bytes)
}

/// Parse GeoJSON in place and turn every line and polygon outline into a
/// shape.
pub fn parse_shapes(bytes: &mut [u8]) -> Result<Vec<GeoShape>> {
    let geojson: GeoJson = simd_json::serde::from_slice(bytes).context("parsing geojson")?;
    let mut shapes = Vec::new();
    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_geometry(geometry, &mut shapes);
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect_geometry(geometry, &mut shapes);
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry(geometry, &mut shapes),
    }
    Ok(shapes)
}

fn collect_geometry(geometry: &Geometry, shapes: &mut Vec<GeoShape>) {
    match &geometry.value {
        Value::LineString(coords) => push_line(coords, shapes),
        Value::MultiLineString(lines) => lines.iter().for_each(|coords| push_line(coords, shapes)),
        Value::Polygon(rings) => push_exterior(rings, shapes),
        Value::MultiPolygon(polygons) => polygons.iter().for_each(|rings| push_exterior(rings, shapes)),
        Value::GeometryCollection(geometries) => {
            geometries.iter().for_each(|g| collect_geometry(g, shapes));
        }
        Value::Point(_) | Value::MultiPoint(_) => {}
    }
}

fn to_points(coords: &[Vec<f64>]) -> Vec<GeoPoint> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| GeoPoint::from_degrees(c[0], c[1]))
        .collect()
}

fn push_line(coords: &[Vec<f64>], shapes: &mut Vec<GeoShape>) {
    let points = to_points(coords);
    if points.len() >= 2 {
        shapes.push(GeoShape::line(points, true));
    }
}

/// Only the exterior ring is kept. GeoJSON repeats the first position at
/// the end; rings here close implicitly.
fn push_exterior(rings: &[Vec<Vec<f64>>], shapes: &mut Vec<GeoShape>) {
    let Some(exterior) = rings.first() else {
        return;
    };
    let mut points = to_points(exterior);
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() >= 3 {
        shapes.push(GeoShape::ring(points, true));
    }
}

fn ring(coords: &[(f64, f64)]) -> GeoShape {
    GeoShape::ring(coords.iter().map(|&(lon, lat)| GeoPoint::from_degrees(lon, lat)).collect(), true)
}

/// Rough continent outlines for when no data directory is available.
pub fn fallback_world() -> GeoLayers {
    let coastlines = vec![
        // North America
        ring(&[
            (-165.0, 68.0), (-160.0, 58.0), (-135.0, 57.0), (-124.0, 45.0), (-115.0, 30.0),
            (-105.0, 20.0), (-90.0, 16.0), (-82.0, 9.0), (-77.0, 8.0), (-90.0, 21.0),
            (-97.0, 27.0), (-84.0, 29.0), (-80.0, 26.0), (-76.0, 37.0), (-66.0, 44.0),
            (-56.0, 50.0), (-63.0, 59.0), (-78.0, 62.0), (-94.0, 60.0), (-100.0, 68.0),
            (-125.0, 70.0), (-145.0, 70.0),
        ]),
        // South America
        ring(&[
            (-77.0, 8.0), (-62.0, 10.0), (-50.0, 1.0), (-35.0, -6.0), (-39.0, -14.0),
            (-42.0, -23.0), (-53.0, -34.0), (-62.0, -40.0), (-66.0, -47.0), (-69.0, -55.0),
            (-74.0, -50.0), (-73.0, -37.0), (-71.0, -18.0), (-81.0, -5.0), (-80.0, 1.0),
        ]),
        // Africa
        ring(&[
            (-17.0, 21.0), (-10.0, 31.0), (-5.0, 36.0), (11.0, 37.0), (20.0, 31.0),
            (32.0, 31.0), (43.0, 12.0), (51.0, 11.0), (40.0, -3.0), (40.0, -16.0),
            (33.0, -26.0), (20.0, -35.0), (12.0, -18.0), (9.0, 4.0), (-8.0, 4.0),
            (-17.0, 14.0),
        ]),
        // Eurasia
        ring(&[
            (-9.0, 37.0), (-9.0, 43.0), (-1.0, 46.0), (-5.0, 48.0), (8.0, 54.0),
            (5.0, 61.0), (15.0, 69.0), (28.0, 71.0), (45.0, 68.0), (70.0, 73.0),
            (105.0, 78.0), (140.0, 72.0), (170.0, 70.0), (178.0, 65.0), (160.0, 60.0),
            (140.0, 53.0), (130.0, 42.0), (122.0, 31.0), (110.0, 20.0), (105.0, 9.0),
            (100.0, 14.0), (92.0, 21.0), (80.0, 8.0), (72.0, 20.0), (57.0, 25.0),
            (50.0, 30.0), (43.0, 13.0), (35.0, 29.0), (35.0, 36.0), (27.0, 37.0),
            (23.0, 40.0), (13.0, 45.0), (3.0, 43.0),
        ]),
        // Australia
        ring(&[
            (114.0, -22.0), (122.0, -18.0), (131.0, -11.0), (137.0, -12.0), (142.0, -11.0),
            (146.0, -19.0), (153.0, -28.0), (150.0, -37.0), (141.0, -38.0), (135.0, -34.0),
            (124.0, -34.0), (115.0, -34.0),
        ]),
    ];
    GeoLayers { coastlines, borders: Vec::new() }
}
