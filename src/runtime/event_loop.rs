use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::audio::AudioBackend;
use crate::config;
use crate::playback::{PlaybackController, PlaybackError, PlaybackSnapshot, ProgressPoller};
use crate::ui;

/// Longest the loop sleeps waiting for input when nothing is being polled.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    poller: ProgressPoller,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        Self {
            pending_gg: false,
            poller: ProgressPoller::new(Duration::from_millis(settings.playback.poll_interval_ms)),
        }
    }
}

/// Main terminal event loop: applies published snapshots, ticks the progress
/// poller, draws, and routes input to the controller. Returns `Ok(())` when
/// the user quits.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<B>,
    snapshots: &Receiver<PlaybackSnapshot>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        drain_snapshots(app, snapshots);

        state.poller.sync(controller.is_playing(), now);
        if let Some(progress) = state.poller.tick(now, controller) {
            app.update_progress(progress);
        }
        // A track that just ended publishes from inside the tick.
        drain_snapshots(app, snapshots);

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        let wait = state
            .poller
            .time_until_due(Instant::now())
            .map_or(IDLE_WAIT, |d| d.min(IDLE_WAIT));
        if !event::poll(wait)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key_event(key, settings, app, controller, state) {
                    break;
                }
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let area = Rect::new(0, 0, size.width, size.height);
                handle_mouse_event(mouse, area, settings, app, controller);
            }
            _ => {}
        }
    }

    Ok(())
}

fn drain_snapshots(app: &mut App, snapshots: &Receiver<PlaybackSnapshot>) {
    while let Ok(snapshot) = snapshots.try_recv() {
        app.apply_snapshot(snapshot);
    }
}

fn report(app: &mut App, result: Result<PlaybackSnapshot, PlaybackError>) {
    match result {
        Ok(_) => app.clear_notice(),
        Err(e) => app.set_notice(e.to_string()),
    }
}

/// A tap on the selected row.
fn tap_selected<B: AudioBackend>(app: &mut App, controller: &mut PlaybackController<B>) {
    if let Some(path) = app.pick_selected() {
        let result = controller.select_or_toggle(&path);
        report(app, result);
    }
}

/// The play/pause button. After a failed load it retries the picked track.
fn press_play_pause<B: AudioBackend>(app: &mut App, controller: &mut PlaybackController<B>) {
    let result = if controller.has_resource() {
        controller.toggle_current()
    } else if let Some(path) = app.now_playing_path().map(Path::to_path_buf) {
        controller.select_or_toggle(&path)
    } else {
        return;
    };
    report(app, result);
}

fn seek_by<B: AudioBackend>(
    app: &mut App,
    controller: &mut PlaybackController<B>,
    secs: u64,
    forward: bool,
) {
    if !controller.has_resource() {
        return;
    }
    let step = Duration::from_secs(secs);
    let base = app.playback.position;
    let target = if forward {
        base.saturating_add(step)
    } else {
        base.saturating_sub(step)
    };
    let result = controller.seek_to(target);
    report(app, result);
}

fn handle_key_event<B: AudioBackend>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<B>,
    state: &mut EventLoopState,
) -> bool {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => {
            app.scrub.cancel();
            app.clear_notice();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => tap_selected(app, controller),
        KeyCode::Char('p') | KeyCode::Char(' ') => press_play_pause(app, controller),
        KeyCode::Char('L') => seek_by(app, controller, settings.controls.scrub_seconds, true),
        KeyCode::Char('H') => seek_by(app, controller, settings.controls.scrub_seconds, false),
        _ => {}
    }

    false
}

fn handle_mouse_event<B: AudioBackend>(
    mouse: MouseEvent,
    area: Rect,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<B>,
) {
    let screen = ui::layout(area, app, &settings.ui);
    let (column, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(idx) = screen.track_at(app, column, row) {
                app.set_selected(idx);
                tap_selected(app, controller);
            } else if screen.hits_button(column, row) {
                press_play_pause(app, controller);
            } else if screen.hits_scrub_bar(column, row) && controller.has_resource() {
                if let (Some(bar), Some(total)) = (screen.scrub_bar(), app.display_duration()) {
                    app.scrub.begin(ui::scrub_target(bar, column, total));
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.scrub.is_active() {
                if let (Some(bar), Some(total)) = (screen.scrub_bar(), app.display_duration()) {
                    app.scrub.drag_to(ui::scrub_target(bar, column, total));
                }
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if app.scrub.is_active() {
                if let (Some(bar), Some(total)) = (screen.scrub_bar(), app.display_duration()) {
                    app.scrub.drag_to(ui::scrub_target(bar, column, total));
                }
            }
            if let Some(target) = app.scrub.release() {
                debug!(?target, "scrub released");
                let result = controller.seek_to(target);
                report(app, result);
            }
        }
        MouseEventKind::ScrollDown => app.next(),
        MouseEventKind::ScrollUp => app.prev(),
        _ => {}
    }
}
