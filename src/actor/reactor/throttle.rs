use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Run now.
    Run,
    /// Schedule one trailing run after this long.
    Defer(Duration),
    /// A trailing run is already scheduled and will cover this call.
    Skip,
}

/// Leading and trailing edge throttle: the first call in a window runs at
/// once, any further calls inside it collapse into a single run at the end
/// of the window.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last_run: Option<Instant>,
    trailing_pending: bool,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: None,
            trailing_pending: false,
        }
    }

    pub fn hit(&mut self, now: Instant) -> ThrottleDecision {
        if self.trailing_pending {
            return ThrottleDecision::Skip;
        }
        match self.last_run {
            Some(last) if now.duration_since(last) < self.window => {
                self.trailing_pending = true;
                ThrottleDecision::Defer(self.window - now.duration_since(last))
            }
            _ => {
                self.last_run = Some(now);
                ThrottleDecision::Run
            }
        }
    }

    /// Records that the deferred trailing run happened.
    pub fn fire_trailing(&mut self, now: Instant) {
        self.trailing_pending = false;
        self.last_run = Some(now);
    }
}
