use std::path::PathBuf;
use std::time::Duration;

/// One playable file found under the music root.
///
/// Identity is `path`; two tracks with the same path are the same track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
}
