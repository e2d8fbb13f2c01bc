mod animator;
mod app;
mod braille;
mod config;
mod error;
mod field;
mod host;
mod phase;
mod presets;
mod raster;
mod record;
mod sampler;
mod settings;
mod surface;
mod ui;

use app::App;
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use host::MountOptions;
use log::{info, warn};
use presets::{Preset, PresetManager};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use record::GifRecorder;
use settings::ViewportMode;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "particle-text")]
#[command(about = "Text-to-particle landing animation in the terminal")]
struct Args {
    /// Text to render (defaults to the config value)
    text: Option<String>,

    /// Viewport class (auto, mobile, desktop)
    #[arg(long)]
    viewport: Option<String>,

    /// Timing preset (brisk, classic, lingering, storm, or a saved user preset)
    #[arg(short = 'p', long)]
    preset: Option<String>,

    /// Config file to load instead of the default location
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write the effective config to this path and continue
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Save the effective timing and physics as a named user preset and continue
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    /// Delete a saved user preset and exit
    #[arg(long = "delete-preset")]
    delete_preset: Option<String>,

    /// List available presets and exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    /// RNG seed for a reproducible scatter
    #[arg(long)]
    seed: Option<u64>,

    /// Record the animation to an animated GIF
    #[arg(long)]
    record: Option<PathBuf>,

    /// Save the rasterized text bitmap as PNG
    #[arg(long = "dump-bitmap")]
    dump_bitmap: Option<PathBuf>,

    /// Write log output to this file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Show the status bar
    #[arg(long)]
    status: bool,

    /// Keep the finished screen until a key is pressed
    #[arg(long)]
    hold: bool,
}

fn parse_viewport(s: &str) -> ViewportMode {
    match s.to_lowercase().as_str() {
        "mobile" | "m" | "small" => ViewportMode::Mobile,
        "desktop" | "d" | "large" => ViewportMode::Desktop,
        _ => ViewportMode::Auto,
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> io::Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        // The terminal belongs to the TUI; stay quiet unless RUST_LOG asks otherwise
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init(),
    }
    Ok(())
}

/// Load the config file (explicit path, or the default location if present)
fn load_config(path: Option<&PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(AppConfig::load_from_file(path)?);
    }
    match AppConfig::default_path().filter(|p| p.exists()) {
        Some(path) => match AppConfig::load_from_file(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("ignoring default config: {}", e);
                Ok(AppConfig::default())
            }
        },
        None => Ok(AppConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let mut presets = PresetManager::new();
    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<12} {}", preset.name, preset.description);
        }
        return Ok(());
    }
    if let Some(name) = &args.delete_preset {
        presets.delete_preset(name)?;
        println!("deleted preset {:?}", name);
        return Ok(());
    }

    // Config file, then preset, then individual flags
    let mut config = load_config(args.config.as_ref())?;
    if let Some(name) = &args.preset {
        let preset = presets
            .find(name)
            .ok_or_else(|| format!("unknown preset: {}", name))?;
        config.schedule = preset.schedule;
        config.settings = preset.settings.clone();
    }
    if let Some(text) = args.text {
        config.text = text;
    }
    if let Some(viewport) = &args.viewport {
        config.viewport = parse_viewport(viewport);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.show_status |= args.status;

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        info!("saved config to {}", path.display());
    }
    if let Some(name) = &args.save_preset {
        presets.save_preset(Preset::new(
            name.clone(),
            "Saved from the command line",
            config.schedule,
            config.settings.clone(),
        ))?;
        info!("saved preset {:?}", name);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &config, &args.record, &args.dump_bitmap, args.hold);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &AppConfig,
    record: &Option<PathBuf>,
    dump_bitmap: &Option<PathBuf>,
    hold: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = terminal.size()?;
    let frame_rect = ratatui::layout::Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let viewport = config.viewport.resolve(size.width);

    if let Some(path) = dump_bitmap {
        let bitmap = raster::rasterize_for(&config.text, viewport)?;
        raster::save_bitmap(&bitmap, path)?;
        info!("saved bitmap to {}", path.display());
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let options = MountOptions {
        text: config.text.clone(),
        viewport,
        schedule: config.schedule,
        settings: config.settings.clone(),
        surface_size: ui::get_canvas_size(frame_rect, config.show_status),
    };

    let mut app = App::new(options, rng);
    app.show_status = config.show_status;
    app.hold = hold;

    if let Some(path) = record {
        let (w, h) = app.recording_size();
        app.attach_recorder(GifRecorder::create(path, w, h)?);
    }

    let res = run_app(terminal, &mut app);
    app.unmount();
    Ok(res?)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        if app.should_exit() {
            return Ok(());
        }

        // Poll for events with timeout
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    // Any key dismisses the held final screen
                    if app.is_complete() {
                        return Ok(());
                    }

                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('h') | KeyCode::Char('H') => {
                            app.toggle_status();
                            let size = terminal.size()?;
                            let (canvas_width, canvas_height) = ui::get_canvas_size(
                                ratatui::layout::Rect {
                                    x: 0,
                                    y: 0,
                                    width: size.width,
                                    height: size.height,
                                },
                                app.show_status,
                            );
                            app.resize(canvas_width, canvas_height);
                        }
                        _ => {}
                    }
                }
                Event::Resize(width, height) => {
                    let (canvas_width, canvas_height) = ui::get_canvas_size(
                        ratatui::layout::Rect {
                            x: 0,
                            y: 0,
                            width,
                            height,
                        },
                        app.show_status,
                    );
                    app.resize(canvas_width, canvas_height);
                }
                _ => {}
            }
        }

        // Run animation frame
        app.tick();
    }
}
