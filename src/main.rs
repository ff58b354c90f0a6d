mod args;

use ai_energy_map::app::App;
use ai_energy_map::config::RegionConfig;
use ai_energy_map::data::{self, DataPaths};
use ai_energy_map::metric::Metric;
use ai_energy_map::ui;
use anyhow::{Context, Result};
use args::CliArgs;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args.log_file)?;

    // Everything is loaded before the terminal is taken over so that
    // failures print as ordinary errors.
    let config = RegionConfig::load(args.regions.as_deref())
        .context("failed to load region configuration")?;
    let data_dir = args.data_dir.display();
    let paths = DataPaths::in_dir(&args.data_dir);
    let dataset = data::load_dataset(&paths)
        .with_context(|| format!("failed to load data from {data_dir}"))?;
    info!(
        countries = dataset.countries.len(),
        regions = dataset.regions.len(),
        tasks = dataset.tasks.len(),
        "dataset loaded"
    );

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    let mut app = App::new(dataset, config, area, args.view, args.metric);
    let result = run(&mut terminal, &mut app);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    info!("exiting");
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved => app.pointer_moved(col, row),
        MouseEventKind::Down(MouseButton::Left) => app.pointer_down(col, row),
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(col, row),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(col, row),
        // Scroll wheel zooms towards the pointer
        MouseEventKind::ScrollUp => app.zoom_in_at(col, row),
        MouseEventKind::ScrollDown => app.zoom_out_at(col, row),
        // Horizontal scroll (trackpad swipe) pans
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        app.set_metric(Metric::Energy);
                    }
                    KeyCode::Char('i') | KeyCode::Char('I') => {
                        app.set_metric(Metric::Impact);
                    }
                    KeyCode::Char('m') | KeyCode::Char('M') => app.toggle_metric(),

                    KeyCode::Tab => app.toggle_view(),
                    KeyCode::Char('b') | KeyCode::Char('B') => app.toggle_borders(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
