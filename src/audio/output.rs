use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no audio output device: {0}")]
    NoDevice(#[source] rodio::StreamError),
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("no source set")]
    NoSource,
    #[error("resource is not prepared")]
    NotPrepared,
    #[error("seek failed: {0}")]
    Seek(#[source] rodio::source::SeekError),
}

/// A single audio-output resource bound to one file.
///
/// `release` takes the resource by value, so nothing can read from it afterwards.
pub trait AudioResource {
    fn set_source(&mut self, path: &Path) -> Result<(), OutputError>;
    /// Open and decode the source. Leaves the resource paused at zero.
    fn prepare(&mut self) -> Result<(), OutputError>;
    fn start(&mut self) -> Result<(), OutputError>;
    fn pause(&mut self) -> Result<(), OutputError>;
    fn resume(&mut self) -> Result<(), OutputError>;
    fn seek_to(&mut self, position: Duration) -> Result<(), OutputError>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    /// True once a prepared source has played to its end.
    fn is_finished(&self) -> bool;
    fn release(self) -> Result<(), OutputError>
    where
        Self: Sized;
}

/// Creates fresh, empty resources.
pub trait AudioBackend {
    type Resource: AudioResource;

    fn create(&mut self) -> Self::Resource;
}
