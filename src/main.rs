mod app;
mod braille;
mod data;
mod paint;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log file for tracing output; the terminal belongs to the UI.
const LOG_ENV: &str = "TUI_GLOBE_LOG";

fn main() -> Result<()> {
    init_logging()?;

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let mut layers = data::load_layers(&data_dir);
    if layers.is_empty() {
        info!(dir = %data_dir.display(), "no geojson found, using built-in outlines");
        layers = data::fallback_world();
    }

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, layers);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {}", path.to_string_lossy()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        MouseEventKind::ScrollLeft => app.rotate_key(-1, 0),
        MouseEventKind::ScrollRight => app.rotate_key(1, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Arrow keys move the view, so the globe turns the other way.
        KeyCode::Left | KeyCode::Char('h') => app.rotate_key(1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.rotate_key(-1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.rotate_key(0, 1),
        KeyCode::Down | KeyCode::Char('j') => app.rotate_key(0, -1),

        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char('m') | KeyCode::Char('M') => app.toggle_projection(),
        KeyCode::Char('t') | KeyCode::Char('T') => app.toggle_tessellation(),
        KeyCode::Char('g') | KeyCode::Char('G') => {
            app.settings.show_graticule = !app.settings.show_graticule;
        }
        KeyCode::Char('b') | KeyCode::Char('B') => {
            app.settings.show_borders = !app.settings.show_borders;
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.settings.show_coastlines = !app.settings.show_coastlines;
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.settings.show_silhouette = !app.settings.show_silhouette;
        }

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, layers: data::GeoLayers) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, layers);
    info!(shapes = app.layers.shape_count(), "viewer started");

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key.code),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
