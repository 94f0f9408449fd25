//! The playback controller owns at most one audio resource and decides,
//! for each tap on a track, whether to start, pause, resume or switch.

use std::mem;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::audio::{AudioBackend, AudioResource, OutputError};

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The resource for `path` could not be created, prepared or driven.
    #[error("cannot play {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
    #[error("seek failed: {0}")]
    Seek(#[source] OutputError),
}

/// Position and length of the live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub position: Duration,
    pub duration: Option<Duration>,
}

/// Immutable view of the controller, published after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackSnapshot {
    pub current_path: Option<PathBuf>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
}

enum Session<R> {
    Idle,
    Loaded {
        resource: R,
        path: PathBuf,
        playing: bool,
    },
}

pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    session: Session<B::Resource>,
    subscribers: Vec<Sender<PlaybackSnapshot>>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: Session::Idle,
            subscribers: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.session, Session::Loaded { playing: true, .. })
    }

    pub fn has_resource(&self) -> bool {
        matches!(self.session, Session::Loaded { .. })
    }

    pub fn current_path(&self) -> Option<&Path> {
        match &self.session {
            Session::Idle => None,
            Session::Loaded { path, .. } => Some(path),
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        match &self.session {
            Session::Idle => PlaybackSnapshot::default(),
            Session::Loaded {
                resource,
                path,
                playing,
            } => PlaybackSnapshot {
                current_path: Some(path.clone()),
                playing: *playing,
                position: resource.position(),
                duration: resource.duration(),
            },
        }
    }

    /// Receive a snapshot now and after every later transition.
    pub fn subscribe(&mut self) -> Receiver<PlaybackSnapshot> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.snapshot());
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self) -> PlaybackSnapshot {
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        snapshot
    }

    /// Handle a tap on `requested`.
    ///
    /// Same track while playing pauses; same track while paused resumes
    /// (restarting if it already played to the end); any other track
    /// releases the current resource and starts a new one. On failure the
    /// controller is left idle with no resource.
    pub fn select_or_toggle(&mut self, requested: &Path) -> Result<PlaybackSnapshot, PlaybackError> {
        let outcome = match mem::replace(&mut self.session, Session::Idle) {
            Session::Idle => self.load(requested),
            Session::Loaded {
                mut resource,
                path,
                playing,
            } if path == requested => {
                if playing {
                    match resource.pause() {
                        Ok(()) => {
                            debug!(path = %path.display(), "paused");
                            Ok(Session::Loaded {
                                resource,
                                path,
                                playing: false,
                            })
                        }
                        Err(source) => {
                            release_quietly(resource);
                            Err(PlaybackError::Unavailable { path, source })
                        }
                    }
                } else if resource.is_finished() {
                    debug!(path = %path.display(), "restarting finished track");
                    release_quietly(resource);
                    self.load(requested)
                } else {
                    match resource.resume() {
                        Ok(()) => {
                            debug!(path = %path.display(), "resumed");
                            Ok(Session::Loaded {
                                resource,
                                path,
                                playing: true,
                            })
                        }
                        Err(source) => {
                            release_quietly(resource);
                            Err(PlaybackError::Unavailable { path, source })
                        }
                    }
                }
            }
            Session::Loaded { resource, path, .. } => {
                info!(from = %path.display(), to = %requested.display(), "switching track");
                release_quietly(resource);
                self.load(requested)
            }
        };

        match outcome {
            Ok(session) => {
                self.session = session;
                Ok(self.publish())
            }
            Err(e) => {
                error!(error = %e, "playback unavailable");
                self.publish();
                Err(e)
            }
        }
    }

    /// The play/pause button: toggle whatever track is loaded.
    pub fn toggle_current(&mut self) -> Result<PlaybackSnapshot, PlaybackError> {
        match self.current_path().map(Path::to_path_buf) {
            Some(path) => self.select_or_toggle(&path),
            None => Ok(self.snapshot()),
        }
    }

    /// Issue one seek on the live resource, clamped to its known length.
    pub fn seek_to(&mut self, target: Duration) -> Result<PlaybackSnapshot, PlaybackError> {
        let Session::Loaded { resource, path, .. } = &mut self.session else {
            return Ok(self.snapshot());
        };

        let target = match resource.duration() {
            Some(total) => target.min(total),
            None => target,
        };
        if let Err(e) = resource.seek_to(target) {
            warn!(path = %path.display(), ?target, error = %e, "seek failed");
            return Err(PlaybackError::Seek(e));
        }
        debug!(path = %path.display(), ?target, "seeked");
        Ok(self.publish())
    }

    /// Read position and length, only if a resource is alive.
    pub fn progress(&self) -> Option<Progress> {
        match &self.session {
            Session::Idle => None,
            Session::Loaded { resource, .. } => Some(Progress {
                position: resource.position(),
                duration: resource.duration(),
            }),
        }
    }

    /// Mark a track that played to its end as paused. Returns true on that transition.
    pub fn check_finished(&mut self) -> bool {
        let finished = match &mut self.session {
            Session::Loaded {
                resource,
                path,
                playing,
            } if *playing && resource.is_finished() => {
                info!(path = %path.display(), "track finished");
                *playing = false;
                true
            }
            _ => false,
        };
        if finished {
            self.publish();
        }
        finished
    }

    /// Release the active resource, whatever its state.
    pub fn release(&mut self) {
        if let Session::Loaded { resource, .. } = mem::replace(&mut self.session, Session::Idle) {
            release_quietly(resource);
            self.publish();
        }
    }

    fn load(&mut self, path: &Path) -> Result<Session<B::Resource>, PlaybackError> {
        let mut resource = self.backend.create();
        let acquired = resource
            .set_source(path)
            .and_then(|()| resource.prepare())
            .and_then(|()| resource.start());

        match acquired {
            Ok(()) => {
                info!(path = %path.display(), "playing");
                Ok(Session::Loaded {
                    resource,
                    path: path.to_path_buf(),
                    playing: true,
                })
            }
            Err(source) => {
                release_quietly(resource);
                Err(PlaybackError::Unavailable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

impl<B: AudioBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.release();
    }
}

fn release_quietly<R: AudioResource>(resource: R) {
    if let Err(e) = resource.release() {
        warn!(error = %e, "failed to release audio resource");
    }
}
