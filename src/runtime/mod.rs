//! Startup, terminal setup and teardown around the event loop.

use std::env;
use std::path::PathBuf;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioBackend;
use crate::config::LibrarySettings;
use crate::library::{check_access, scan};
use crate::playback::PlaybackController;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings::LoadedSettings { settings, problem } = settings::load_settings();
    let arg = env::args().nth(1);

    if arg.as_deref() == Some("--dump-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let _log_guard = logging::init(&settings.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "tapdeck starting");
    if let Some(problem) = problem {
        warn!(%problem, "config rejected");
    }

    let dir = resolve_dir(arg, &settings.library);

    // Nothing is scanned or played unless the music root can be read.
    if let Err(e) = check_access(&dir) {
        warn!(error = %e, "music directory not accessible");
        eprintln!("tapdeck: {e}");
        return Ok(());
    }

    let tracks = scan(&dir, &settings.library);
    let backend = RodioBackend::new()?;
    let mut controller = PlaybackController::new(backend);
    let snapshots = controller.subscribe();

    let mut app = App::new(tracks);
    app.set_current_dir(dir.display().to_string());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings);
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut controller,
            &snapshots,
            &mut state,
        )
    })();

    // The screen is going away; so does the audio, whatever its state.
    controller.release();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("tapdeck exiting");
    run_result
}

/// Music root: command-line argument, then `library.root`, then the working directory.
fn resolve_dir(arg: Option<String>, library: &LibrarySettings) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"))
}
