//! Sleep timer
//!
//! Pauses playback after a user-chosen delay. The timer is deadline-based:
//! the engine has no timers of its own, so the embedder's ordinary tick
//! (the same one that drives the media driver's polling) calls
//! [`SleepTimer::poll`] and the pause fires once the deadline has passed.

use crate::manager::PlaybackManager;
use std::time::{Duration, Instant};
use tracing::debug;

/// Pause-later timer armed from UI presets (e.g. 15/30/60 minutes)
#[derive(Debug, Default)]
pub struct SleepTimer {
    ends_at: Option<Instant>,
}

impl SleepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for the given number of minutes; re-arming replaces
    /// the previous deadline.
    pub fn start(&mut self, minutes: u32) {
        self.start_for(Duration::from_secs(u64::from(minutes) * 60));
    }

    /// Arm the timer for an arbitrary duration.
    pub fn start_for(&mut self, duration: Duration) {
        self.ends_at = Some(Instant::now() + duration);
    }

    /// Disarm without pausing.
    pub fn cancel(&mut self) {
        self.ends_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.ends_at.is_some()
    }

    /// Time left before the pause, for display. `None` while disarmed.
    pub fn remaining(&self) -> Option<Duration> {
        self.ends_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Pause playback once the deadline has passed; fires at most once per
    /// arming.
    pub fn poll(&mut self, manager: &mut PlaybackManager) {
        let Some(ends_at) = self.ends_at else {
            return;
        };
        if Instant::now() >= ends_at {
            self.ends_at = None;
            debug!("sleep timer elapsed, pausing playback");
            manager.pause();
        }
    }
}
