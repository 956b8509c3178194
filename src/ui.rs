use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::paint::{silhouette, CanvasPainter};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use tui_globe::{Painter, Projection, VectorMap, Viewport};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

/// One colored braille layer of the map.
struct Layer {
    canvas: BrailleCanvas,
    color: Color,
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.projection.name()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    viewport.set_size(inner.width as u32 * 2, inner.height as u32 * 4);

    let layers = draw_layers(app, &viewport, inner.width as usize, inner.height as usize);

    let cursor = app.mouse_pixel_pos().and_then(|(px, py)| {
        let (cx, cy) = ((px / 2) as u16, (py / 4) as u16);
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(MapWidget { layers, cursor }, inner);
}

fn draw_layers(app: &App, viewport: &Viewport, cols: usize, rows: usize) -> Vec<Layer> {
    const COLORS: [Color; 3] = [Color::DarkGray, Color::Cyan, Color::Yellow];

    let mut layers = Vec::new();
    if app.settings.show_silhouette && app.projection.has_horizon() {
        let mut canvas = BrailleCanvas::new(cols, rows);
        let outline = silhouette(viewport.center(), viewport.radius() as f64);
        CanvasPainter::new(&mut canvas).draw_polygon(&outline);
        layers.push(Layer { canvas, color: Color::Blue });
    }

    let offsets = copy_offsets(app.projection, viewport);
    let mut vector_map = VectorMap::new(app.projection, app.projection_settings.clone());
    for ((shapes, shown), color) in app.shape_layers().into_iter().zip(COLORS) {
        if !shown || shapes.is_empty() {
            continue;
        }
        vector_map.create_from_shapes(shapes, viewport);
        let mut canvas = BrailleCanvas::new(cols, rows);
        for &offset in &offsets {
            vector_map.paint(&mut CanvasPainter::with_offset(&mut canvas, offset));
        }
        layers.push(Layer { canvas, color });
    }
    layers
}

/// Horizontal shifts that tile a flat map across the screen.
fn copy_offsets(projection: Projection, viewport: &Viewport) -> Vec<f64> {
    let map_width = 4.0 * viewport.radius() as f64;
    if projection.has_horizon() || map_width <= 0.0 {
        return vec![0.0];
    }
    let copies = (viewport.width() as f64 / 2.0 / map_width).ceil() as i32;
    (-copies..=copies).map(|k| k as f64 * map_width).collect()
}

struct MapWidget {
    layers: Vec<Layer>,
    cursor: Option<(u16, u16)>,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for layer in &self.layers {
            for (col, row, glyph) in layer.canvas.glyphs() {
                if col >= area.width as usize || row >= area.height as usize {
                    continue;
                }
                let (x, y) = (area.x + col as u16, area.y + row as u16);
                buf[(x, y)].set_char(glyph).set_fg(layer.color);
            }
        }

        if let Some((cx, cy)) = self.cursor {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.settings;
    let toggle = |on: bool, label_on: &'static str, label_off: &'static str| {
        Span::styled(
            if on { label_on } else { label_off },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let status = Line::from(vec![
        Span::styled(" Center: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" Cursor: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.cursor_coords(), Style::default().fg(Color::Yellow)),
        Span::styled(" Box: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.visible_box(), Style::default().fg(Color::Magenta)),
        Span::raw(" "),
        toggle(settings.tessellate, "[T]ess ", "[t]ess "),
        toggle(settings.show_graticule, "[G]rid ", "[g]rid "),
        toggle(settings.show_borders, "[B]order ", "[b]order "),
        Span::styled(
            "| drag:rotate wheel:zoom m:projection r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_globe::Orientation;

    #[test]
    fn test_globe_draws_once() {
        let vp = Viewport::new(400, 200, 50, Orientation::IDENTITY);
        assert_eq!(copy_offsets(Projection::Spherical, &vp), vec![0.0]);
    }

    #[test]
    fn test_mercator_tiles_across_screen() {
        let vp = Viewport::new(400, 200, 50, Orientation::IDENTITY);
        assert_eq!(copy_offsets(Projection::Mercator, &vp), vec![-200.0, 0.0, 200.0]);
    }
}
