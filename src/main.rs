mod audio;
mod audio_api;
mod config;
mod error;
mod loader;
mod logging;
mod middle;
mod picker;
mod pipeline;
mod shared;
mod tui;

use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use config::{AppConfig, Cli};
use middle::{Middle, SessionConfig};
use pipeline::permissions::PermissionProbe;
use pipeline::persistence;
use shared::InputEvent;

const TICK_RATE: Duration = Duration::from_millis(16); // ~60fps

fn main() {
    if let Err(e) = run() {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load(Cli::parse());
    let log_path = logging::init(&cfg.data_dir, &cfg.log_level)?;
    log::info!("looper starting, data in {}, log at {}", cfg.data_dir.display(), log_path.display());
    if let Some(e) = &cfg.settings_error {
        log::warn!("settings ignored: {e}");
    }

    let audio = audio::start_audio()?;

    // without these there is nothing useful to do, so refuse to start
    PermissionProbe {
        mic_available: audio.has_input(),
        export_root: &cfg.export.root,
        import_dir: cfg.music_dir.as_deref(),
    }
    .require_all()?;

    let session = SessionConfig {
        recordings_dir: cfg.data_dir.join("recordings"),
        recording_extension: cfg.recording_extension.clone(),
        export: cfg.export.clone(),
        import_mode: cfg.import_mode,
        sample_rate: audio.sample_rate(),
        mic_available: audio.has_input(),
    };
    let mut middle = Middle::new(audio, session);

    let effect_paths = loader::sample_loader::index_audio_in_dir(&cfg.effects_dir).unwrap_or_else(|e| {
        log::warn!("no effects loaded from {}: {e}", cfg.effects_dir.display());
        Vec::new()
    });
    middle.load_effects(&effect_paths);

    // bring back the tracks from last time
    let saved = persistence::load_state(&cfg.data_dir).unwrap_or_else(|e| {
        log::warn!("starting with no tracks: {e}");
        Default::default()
    });
    middle.restore(&saved);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let blink_start = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let blink_on = (blink_start.elapsed().as_millis() / 250) % 2 == 0;

        // mic frames go to the recorder if one is running, otherwise nowhere
        let frames = middle.backend().drain_input();
        middle.capture(&frames);
        middle.poll_mix();

        let ds = middle.display_state();
        tui_state.sync(ds.rows.len());

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state, blink_on);
        })?;

        let events = tui::input::poll_input(TICK_RATE, &mut tui_state)?;
        for event in events {
            match event {
                InputEvent::Quit => {
                    let state = middle.shutdown();
                    if let Err(e) = persistence::save_state(&cfg.data_dir, &state) {
                        log::error!("could not save tracks: {e}");
                    }
                    log::info!("bye");
                    return Ok(());
                }
                InputEvent::PickImport => {
                    if let Some(path) = picker::pick_audio_file(cfg.music_dir.as_deref()) {
                        middle.handle_input(InputEvent::Import(path));
                    }
                }
                other => middle.handle_input(other),
            }
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
