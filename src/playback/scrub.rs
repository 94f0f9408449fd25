use std::time::Duration;

/// A drag on the progress bar.
///
/// Moving the drag only updates the preview; the seek target is handed out
/// once, when the gesture is released.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrubGesture {
    target: Option<Duration>,
}

impl ScrubGesture {
    pub fn begin(&mut self, at: Duration) {
        self.target = Some(at);
    }

    pub fn drag_to(&mut self, at: Duration) {
        if self.target.is_some() {
            self.target = Some(at);
        }
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn preview(&self) -> Option<Duration> {
        self.target
    }

    pub fn release(&mut self) -> Option<Duration> {
        self.target.take()
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }
}
