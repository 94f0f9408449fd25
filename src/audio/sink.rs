//! `rodio` implementation of the audio resource.
//!
//! Each resource owns its own `Sink` on the shared output stream, so
//! releasing one never disturbs another.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use super::output::{AudioBackend, AudioResource, OutputError};

pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn new() -> Result<Self, OutputError> {
        let mut stream = OutputStreamBuilder::open_default_stream().map_err(OutputError::NoDevice)?;
        // rodio logs to stderr when OutputStream is dropped, which would land on the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl AudioBackend for RodioBackend {
    type Resource = RodioResource;

    fn create(&mut self) -> RodioResource {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        RodioResource {
            sink,
            path: None,
            duration: None,
            prepared: false,
        }
    }
}

pub struct RodioResource {
    sink: Sink,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    prepared: bool,
}

impl RodioResource {
    fn ensure_prepared(&self) -> Result<(), OutputError> {
        if self.prepared {
            Ok(())
        } else {
            Err(OutputError::NotPrepared)
        }
    }
}

/// Fall back to container metadata when the decoder cannot report a length.
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

impl AudioResource for RodioResource {
    fn set_source(&mut self, path: &Path) -> Result<(), OutputError> {
        self.path = Some(path.to_path_buf());
        self.prepared = false;
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), OutputError> {
        let path = self.path.clone().ok_or(OutputError::NoSource)?;

        let file = File::open(&path).map_err(|source| OutputError::Open {
            path: path.clone(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|source| OutputError::Decode {
            path: path.clone(),
            source,
        })?;

        self.duration = source.total_duration().or_else(|| probe_duration(&path));
        self.sink.pause();
        self.sink.append(source);
        self.prepared = true;
        debug!(path = %path.display(), duration = ?self.duration, "resource prepared");
        Ok(())
    }

    fn start(&mut self) -> Result<(), OutputError> {
        self.ensure_prepared()?;
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), OutputError> {
        self.ensure_prepared()?;
        self.sink.pause();
        Ok(())
    }

    fn resume(&mut self) -> Result<(), OutputError> {
        self.ensure_prepared()?;
        self.sink.play();
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), OutputError> {
        self.ensure_prepared()?;
        self.sink.try_seek(position).map_err(OutputError::Seek)
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.prepared && self.sink.empty()
    }

    fn release(self) -> Result<(), OutputError> {
        self.sink.stop();
        debug!(path = ?self.path, "resource released");
        Ok(())
    }
}
