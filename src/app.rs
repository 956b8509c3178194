use tui_globe::{AngleUnit, GeoPoint, GeoShape, Orientation, Projection, ProjectionSettings, Viewport};

use crate::data::GeoLayers;

/// Which layers the viewer draws.
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_coastlines: bool,
    pub show_borders: bool,
    pub show_graticule: bool,
    pub show_silhouette: bool,
    pub tessellate: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_coastlines: true,
            show_borders: true,
            show_graticule: true,
            show_silhouette: true,
            tessellate: true,
        }
    }
}

const MIN_RADIUS: u32 = 8;
const MAX_RADIUS: u32 = 200_000;
const ZOOM_STEP: f64 = 1.25;
/// Pixels the globe turns per arrow key press.
const KEY_ROTATE_PX: f64 = 12.0;

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub projection: Projection,
    pub projection_settings: ProjectionSettings,
    pub settings: DisplaySettings,
    pub layers: GeoLayers,
    pub graticule: Vec<GeoShape>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position, in terminal cells
    pub mouse_pos: Option<(u16, u16)>,
}

/// Braille pixel size of the map area for a terminal of the given size,
/// leaving room for the border and the status bar.
fn map_pixels(cols: usize, rows: usize) -> (u32, u32) {
    let inner_cols = cols.saturating_sub(2);
    let inner_rows = rows.saturating_sub(3);
    ((inner_cols * 2) as u32, (inner_rows * 4) as u32)
}

fn initial_radius(width: u32, height: u32) -> u32 {
    (width.min(height) * 9 / 20).max(MIN_RADIUS)
}

/// Terminal cell to braille pixel, inside the one-cell border.
#[inline]
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    (col.saturating_sub(1) as i32 * 2, row.saturating_sub(1) as i32 * 4)
}

impl App {
    pub fn new(cols: usize, rows: usize, layers: GeoLayers) -> Self {
        let (width, height) = map_pixels(cols, rows);
        let start = Orientation::from_geo(&GeoPoint::from_degrees(10.0, 30.0));
        Self {
            viewport: Viewport::new(width, height, initial_radius(width, height), start),
            projection: Projection::default(),
            projection_settings: ProjectionSettings::default(),
            settings: DisplaySettings::default(),
            layers,
            graticule: graticule(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        let (width, height) = map_pixels(cols, rows);
        self.viewport.set_size(width, height);
    }

    /// Turn the globe by a screen-space drag of `dx`, `dy` pixels, so the
    /// surface under the cursor follows it.
    pub fn rotate_by_pixels(&mut self, dx: f64, dy: f64) {
        let radius = self.viewport.radius().max(1) as f64;
        let turned = self
            .viewport
            .orientation()
            .rotated_in_view(-dx / radius, -dy / radius);
        self.viewport.set_orientation(turned);
    }

    pub fn rotate_key(&mut self, dx: i32, dy: i32) {
        self.rotate_by_pixels(dx as f64 * KEY_ROTATE_PX, dy as f64 * KEY_ROTATE_PX);
    }

    pub fn zoom_in(&mut self) {
        let radius = (self.viewport.radius() as f64 * ZOOM_STEP).round() as u32;
        self.viewport.set_radius(radius.min(MAX_RADIUS));
    }

    pub fn zoom_out(&mut self) {
        let radius = (self.viewport.radius() as f64 / ZOOM_STEP).round() as u32;
        self.viewport.set_radius(radius.max(MIN_RADIUS));
    }

    pub fn toggle_projection(&mut self) {
        self.projection = self.projection.next();
    }

    pub fn toggle_tessellation(&mut self) {
        self.settings.tessellate = !self.settings.tessellate;
        let on = self.settings.tessellate;
        self.layers.set_tessellate(on);
        for shape in &mut self.graticule {
            shape.set_tessellate(on);
        }
    }

    pub fn reset_view(&mut self) {
        let (width, height) = (self.viewport.width(), self.viewport.height());
        self.viewport.set_radius(initial_radius(width, height));
        self.viewport
            .set_orientation(Orientation::from_geo(&GeoPoint::from_degrees(10.0, 30.0)));
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (col as f64 - last_col as f64) * 2.0;
            let dy = (row as f64 - last_row as f64) * 4.0;
            self.rotate_by_pixels(dx, dy);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Mouse position in braille pixels.
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }

    /// Longitude/latitude under the mouse, or a placeholder off the map.
    pub fn cursor_coords(&self) -> String {
        let coords = self.mouse_pixel_pos().and_then(|(px, py)| {
            self.projection
                .geo_coordinates(px, py, &self.viewport, AngleUnit::Degree)
        });
        match coords {
            Some((lon, lat)) => format_lon_lat(lon, lat),
            None => "--".to_string(),
        }
    }

    pub fn center_coords(&self) -> String {
        let center = self.viewport.orientation().center();
        format_lon_lat(center.lon().to_degrees(), center.lat().to_degrees())
    }

    pub fn visible_box(&self) -> String {
        self.projection
            .visible_box(&self.viewport.screen_rect(), &self.viewport)
            .to_degrees_string()
    }

    /// Rendered shape batches, in drawing order.
    pub fn shape_layers(&self) -> [(&[GeoShape], bool); 3] {
        [
            (self.graticule.as_slice(), self.settings.show_graticule),
            (self.layers.coastlines.as_slice(), self.settings.show_coastlines),
            (self.layers.borders.as_slice(), self.settings.show_borders),
        ]
    }
}

fn format_lon_lat(lon: f64, lat: f64) -> String {
    format!(
        "{:.1}°{}, {:.1}°{}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lon.abs(),
        if lon >= 0.0 { "E" } else { "W" }
    )
}

/// Meridians every 30° and parallels every 30°, as open lines.
fn graticule() -> Vec<GeoShape> {
    let mut shapes = Vec::new();
    for lon in (-180..180).step_by(30) {
        let points = (-80..=80)
            .step_by(10)
            .map(|lat| GeoPoint::from_degrees(lon as f64, lat as f64))
            .collect();
        shapes.push(GeoShape::line(points, true));
    }
    for lat in [-60.0, -30.0, 0.0, 30.0, 60.0] {
        // Stop short of the date line so both ends stay distinct.
        let mut points: Vec<GeoPoint> = (-17..=17)
            .map(|i| GeoPoint::from_degrees(i as f64 * 10.0, lat))
            .collect();
        points.insert(0, GeoPoint::from_degrees(-179.9, lat));
        points.push(GeoPoint::from_degrees(179.9, lat));
        shapes.push(GeoShape::line(points, true));
    }
    shapes
}
