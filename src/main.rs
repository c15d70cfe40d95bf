//! beatgrid - a vocabulary drilling game driven by a look-ahead beat scheduler.
//!
//! Plays a session live through the default audio device, or renders the
//! same session offline to a WAV file.

mod app;
mod config;

use anyhow::{Context, Result};
use app::{App, Event};
use bg_master::{render_session, Controller, CpalHost};
use clap::{Parser, Subcommand};
use config::Settings;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "beatgrid")]
#[command(author, version, about = "Vocabulary drilling to a synthesized beat", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tempo in beats per minute (30-300)
    #[arg(long)]
    bpm: Option<f64>,

    /// Words per grid (1-16)
    #[arg(long)]
    grid_size: Option<u32>,

    /// Rounds per session (1-20)
    #[arg(long)]
    rounds: Option<u32>,

    /// Print each beat as a JSON line instead of the grid
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a session through the default audio device
    Play,
    /// Render a session to a WAV file
    Render {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Stop rendering after this many seconds
        #[arg(long, default_value = "600")]
        max_seconds: f64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    log::debug!("settings: {:?}", settings);

    match cli.command {
        None | Some(Commands::Play) => play(&settings, cli.json),
        Some(Commands::Render {
            out,
            sample_rate,
            max_seconds,
        }) => render(&settings, cli.json, &out, sample_rate, max_seconds),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    // Command-line overrides
    if let Some(bpm) = cli.bpm {
        settings.bpm = bpm;
    }
    if let Some(grid_size) = cli.grid_size {
        settings.grid_size = grid_size;
    }
    if let Some(rounds) = cli.rounds {
        settings.total_rounds = rounds;
    }

    Ok(settings.clamped())
}

fn play(settings: &Settings, json: bool) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut app = App::new(settings, json);

    let controller = Controller::with_config(CpalHost::new(), settings.engine_config())?;
    controller.set_callbacks(app::callbacks(tx))?;

    app.begin();
    controller
        .start()
        .context("could not start audio output")?;

    for event in rx.iter() {
        let stopped = event == Event::Stopped;
        if let Some(line) = app.handle(event) {
            println!("{}", line);
        }
        if stopped {
            break;
        }
    }
    Ok(())
}

fn render(
    settings: &Settings,
    json: bool,
    out: &Path,
    sample_rate: u32,
    max_seconds: f64,
) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut app = App::new(settings, json);
    app.begin();

    let session = render_session(
        settings.engine_config(),
        sample_rate,
        max_seconds,
        app::callbacks(tx),
    )?;

    for event in rx.try_iter() {
        if let Some(line) = app.handle(event) {
            println!("{}", line);
        }
    }

    session
        .save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    log::info!(
        "wrote {} ({:.1}s, {} hits)",
        out.display(),
        session.duration_secs(),
        session.hits.len()
    );
    Ok(())
}
