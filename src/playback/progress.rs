use std::time::{Duration, Instant};

use crate::audio::AudioBackend;

use super::controller::{PlaybackController, Progress};

/// Periodic progress reader, ticked from the event loop.
///
/// Armed only while the controller is playing; any tick that finds playback
/// stopped or the resource gone disarms it before touching the resource.
#[derive(Debug)]
pub struct ProgressPoller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Follow the playing flag: arm (due immediately) on play, cancel otherwise.
    pub fn sync(&mut self, playing: bool, now: Instant) {
        if !playing {
            self.next_due = None;
        } else if self.next_due.is_none() {
            self.next_due = Some(now);
        }
    }

    /// How long the event loop may sleep before the next tick is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    pub fn tick<B: AudioBackend>(
        &mut self,
        now: Instant,
        controller: &mut PlaybackController<B>,
    ) -> Option<Progress> {
        let due = self.next_due?;
        if !controller.is_playing() {
            self.next_due = None;
            return None;
        }
        if now < due {
            return None;
        }

        if controller.check_finished() {
            self.next_due = None;
            return controller.progress();
        }

        match controller.progress() {
            Some(progress) => {
                self.next_due = Some(now + self.interval);
                Some(progress)
            }
            None => {
                self.next_due = None;
                None
            }
        }
    }
}
