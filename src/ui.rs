//! UI rendering helpers for the terminal user interface.
//!
//! `draw` is a pure function of the `App` model: it reads the last playback
//! snapshot and never talks to the controller. `layout` is shared with the
//! event loop so mouse clicks can be mapped back to rows and controls.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};

const BUTTON_WIDTH: u16 = 11;
const HIGHLIGHT_SYMBOL: &str = "> ";

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play/pause selected");
    map.insert("space/p", "play/pause");
    // H/L is filled dynamically from config.
    map.insert("mouse", "click to play, drag bar to seek");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = ["j/k", "gg/G", "enter", "space/p", "H/L", "mouse", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
pub fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Label of the play/pause control: it names the action a press performs.
pub fn button_label(playing: bool) -> &'static str {
    if playing { " ❚❚ Pause " } else { " ▶ Play " }
}

fn button_style(playing: bool) -> Style {
    let bg = if playing { Color::Green } else { Color::DarkGray };
    Style::default()
        .fg(Color::White)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}

/// `elapsed / total`, with `--:--` while the length is unknown.
pub fn time_text(elapsed: Duration, total: Option<Duration>) -> String {
    let total = total.map(format_mmss).unwrap_or_else(|| "--:--".to_string());
    format!("{} / {}", format_mmss(elapsed), total)
}

fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> f64 {
    match total {
        Some(t) if !t.is_zero() => (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Map a column on the scrub bar to a position within `total`.
pub fn scrub_target(bar: Rect, column: u16, total: Duration) -> Duration {
    let span = bar.width.saturating_sub(1).max(1);
    let offset = column.saturating_sub(bar.x).min(span);
    total.mul_f64(f64::from(offset) / f64::from(span))
}

/// Compute the `[start, end)` slice of rows to show so the selection stays centered.
pub fn visible_window(total: usize, height: usize, sel_pos: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = sel_pos.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn contains(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

/// Regions of the now-playing panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowPlayingLayout {
    pub block: Rect,
    pub title: Rect,
    pub button: Rect,
    pub time: Rect,
    pub scrub_bar: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub list: Rect,
    pub list_rows: Rect,
    pub now_playing: Option<NowPlayingLayout>,
    pub notice: Option<Rect>,
    pub footer: Rect,
}

impl ScreenLayout {
    /// Track index under a click, if the click landed on a list row.
    pub fn track_at(&self, app: &App, column: u16, row: u16) -> Option<usize> {
        if !contains(self.list_rows, column, row) {
            return None;
        }
        let (start, end) = visible_window(
            app.tracks.len(),
            self.list_rows.height as usize,
            app.selected,
        );
        let idx = start + (row - self.list_rows.y) as usize;
        (idx < end).then_some(idx)
    }

    pub fn hits_button(&self, column: u16, row: u16) -> bool {
        self.now_playing
            .is_some_and(|np| contains(np.button, column, row))
    }

    pub fn hits_scrub_bar(&self, column: u16, row: u16) -> bool {
        self.now_playing
            .and_then(|np| np.scrub_bar)
            .is_some_and(|bar| contains(bar, column, row))
    }

    pub fn scrub_bar(&self) -> Option<Rect> {
        self.now_playing.and_then(|np| np.scrub_bar)
    }
}

/// Split the screen. The now-playing panel exists once a track was ever picked.
pub fn layout(area: Rect, app: &App, ui: &UiSettings) -> ScreenLayout {
    let np_height = match (&app.now_playing, ui.show_progress) {
        (None, _) => 0,
        (Some(_), true) => 5,
        (Some(_), false) => 4,
    };
    let notice_height = u16::from(app.notice.is_some());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(np_height),
            Constraint::Length(notice_height),
            Constraint::Length(3),
        ])
        .split(area);

    let list_rows = Block::default().borders(Borders::ALL).inner(chunks[1]);

    let now_playing = app.now_playing.as_ref().map(|_| {
        let block = chunks[2];
        let inner = Block::default().borders(Borders::ALL).inner(block);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);
        let controls = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(BUTTON_WIDTH),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(rows[1]);

        NowPlayingLayout {
            block,
            title: rows[0],
            button: controls[0],
            time: controls[2],
            scrub_bar: ui.show_progress.then_some(rows[2]),
        }
    });

    ScreenLayout {
        header: chunks[0],
        list: chunks[1],
        list_rows,
        now_playing,
        notice: app.notice.as_ref().map(|_| chunks[3]),
        footer: chunks[4],
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui: &UiSettings, controls: &ControlsSettings) {
    let screen = layout(frame.area(), app, ui);

    // Header
    let header = Paragraph::new(ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tapdeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, screen.header);

    draw_track_list(frame, app, &screen);

    if let (Some(np), Some(picked)) = (screen.now_playing, app.now_playing.as_ref()) {
        let playing = app.is_playing();

        frame.render_widget(
            Block::default().borders(Borders::ALL).title(" now playing "),
            np.block,
        );

        let title = truncate_with_ellipsis(&picked.title, np.title.width as usize);
        frame.render_widget(Paragraph::new(title).bold(), np.title);

        frame.render_widget(
            Paragraph::new(button_label(playing))
                .alignment(Alignment::Center)
                .style(button_style(playing)),
            np.button,
        );

        let elapsed = app.display_position();
        let total = app.display_duration();
        frame.render_widget(Paragraph::new(time_text(elapsed, total)), np.time);

        if let Some(bar) = np.scrub_bar {
            let color = if app.scrub.is_active() {
                Color::Yellow
            } else if playing {
                Color::Green
            } else {
                Color::DarkGray
            };
            let gauge = Gauge::default()
                .ratio(progress_ratio(elapsed, total))
                .label("")
                .use_unicode(true)
                .gauge_style(Style::default().fg(color).bg(Color::Black));
            frame.render_widget(gauge, bar);
        }
    }

    if let (Some(area), Some(notice)) = (screen.notice, app.notice.as_deref()) {
        let line = Line::from(vec![
            Span::styled(" ! ", Style::default().fg(Color::Black).bg(Color::Red)),
            Span::raw(" "),
            Span::raw(truncate_with_ellipsis(
                notice,
                (area.width as usize).saturating_sub(4),
            )),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    let footer = Paragraph::new(controls_text(controls.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, screen.footer);
}

fn draw_track_list(frame: &mut Frame, app: &App, screen: &ScreenLayout) {
    let title = match &app.current_dir {
        Some(dir) => format!(" tracks ({}) · {} ", app.tracks.len(), dir),
        None => format!(" tracks ({}) ", app.tracks.len()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if !app.has_tracks() {
        let empty = Paragraph::new("No audio files found.")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, screen.list);
        return;
    }

    // Only build ListItems for the visible window.
    let (start, end) = visible_window(
        app.tracks.len(),
        screen.list_rows.height as usize,
        app.selected,
    );
    let width = (screen.list_rows.width as usize).saturating_sub(HIGHLIGHT_SYMBOL.len());
    let loaded = app.playback.current_path.as_deref();

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .map(|track| {
            let text = truncate_with_ellipsis(&track.display, width);
            if loaded == Some(track.path.as_path()) {
                ListItem::new(text).style(Style::default().fg(Color::Green))
            } else {
                ListItem::new(text)
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    let mut state = ListState::default();
    state.select(Some(app.selected - start));
    frame.render_stateful_widget(list, screen.list, &mut state);
}
