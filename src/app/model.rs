//! Application model: list selection plus the presentation mirror of the
//! playback controller.
//!
//! `App` never drives audio itself. It stores the last `PlaybackSnapshot`
//! the controller published and the title/path of the track the user last
//! picked, which is what the now-playing panel and the play/pause button show.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::library::Track;
use crate::playback::{PlaybackSnapshot, Progress, ScrubGesture};

/// The track the user last picked; drives the now-playing panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub path: PathBuf,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub playback: PlaybackSnapshot,
    pub now_playing: Option<NowPlaying>,
    pub notice: Option<String>,
    pub scrub: ScrubGesture,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            selected: 0,
            playback: PlaybackSnapshot::default(),
            now_playing: None,
            notice: None,
            scrub: ScrubGesture::default(),
            current_dir: None,
        }
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Return true if the library contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Set the selected row, clamped to the list.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.tracks.len().saturating_sub(1));
    }

    /// Move selection to the next track, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.tracks.len() - 1);
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    /// Mark the selected row as the track being played and return its path.
    pub fn pick_selected(&mut self) -> Option<PathBuf> {
        let track = self.tracks.get(self.selected)?;
        let picked = NowPlaying {
            title: track.title.clone(),
            path: track.path.clone(),
        };
        let path = picked.path.clone();
        self.now_playing = Some(picked);
        Some(path)
    }

    pub fn now_playing_path(&self) -> Option<&Path> {
        self.now_playing.as_ref().map(|n| n.path.as_path())
    }

    pub fn is_playing(&self) -> bool {
        self.playback.playing
    }

    /// Store the latest snapshot published by the controller.
    pub fn apply_snapshot(&mut self, snapshot: PlaybackSnapshot) {
        if let Some(path) = snapshot.current_path.as_deref() {
            let known = self.now_playing_path() == Some(path);
            if !known {
                self.now_playing = Some(NowPlaying {
                    title: self.title_for(path),
                    path: path.to_path_buf(),
                });
            }
        }
        self.playback = snapshot;
    }

    pub fn update_progress(&mut self, progress: Progress) {
        self.playback.position = progress.position;
        self.playback.duration = progress.duration;
    }

    /// Position to render: the drag preview while scrubbing, else the last poll.
    pub fn display_position(&self) -> Duration {
        self.scrub.preview().unwrap_or(self.playback.position)
    }

    /// Length of the loaded track, falling back to the scanned metadata.
    pub fn display_duration(&self) -> Option<Duration> {
        self.playback.duration.or_else(|| {
            let path = self.now_playing_path()?;
            self.tracks.iter().find(|t| t.path == path)?.duration
        })
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn title_for(&self, path: &Path) -> String {
        self.tracks
            .iter()
            .find(|t| t.path == path)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("UNKNOWN")
                    .to_string()
            })
    }
}
