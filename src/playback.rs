//! Playback control: the select-or-toggle state machine, the progress
//! poller that feeds the scrub bar, and the scrub gesture itself.

mod controller;
mod progress;
mod scrub;

pub use controller::{PlaybackController, PlaybackError, PlaybackSnapshot, Progress};
pub use progress::ProgressPoller;
pub use scrub::ScrubGesture;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod tests;
