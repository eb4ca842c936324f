//! Volume ramp math for end-of-track crossfades
//!
//! The driver fades the element volume to zero over the crossfade
//! duration, stepping on a fixed 10-steps-per-second grid so the ramp
//! advances the same amount however often position updates arrive.

use std::time::Duration;

/// Volume steps per second of crossfade
const STEPS_PER_SECOND: u32 = 10;

/// An in-progress fade-out of the element volume
///
/// Progress is measured against the element's reported position rather
/// than wall-clock time, so pausing mid-fade freezes the ramp.
#[derive(Debug, Clone)]
pub struct FadeRamp {
    /// Position at which the fade began
    start_position: Duration,
    /// Total number of volume steps in the ramp
    total_steps: u32,
    /// Element volume when the fade began, restored on completion
    initial_volume: f32,
}

impl FadeRamp {
    /// Begin a fade lasting `seconds`, anchored at `start_position`
    pub fn new(seconds: u32, start_position: Duration, initial_volume: f32) -> Self {
        Self {
            start_position,
            total_steps: (seconds * STEPS_PER_SECOND).max(1),
            initial_volume,
        }
    }

    /// Step index reached at `position`, clamped to the final step
    fn step_at(&self, position: Duration) -> u32 {
        let elapsed = position.saturating_sub(self.start_position);
        let step = (elapsed.as_secs_f64() * f64::from(STEPS_PER_SECOND)) as u32;
        step.min(self.total_steps)
    }

    /// Element volume the ramp prescribes at `position`
    pub fn level_at(&self, position: Duration) -> f32 {
        let ratio = 1.0 - self.step_at(position) as f32 / self.total_steps as f32;
        self.initial_volume * ratio
    }

    /// Whether the ramp has reached its final step at `position`
    pub fn is_complete(&self, position: Duration) -> bool {
        self.step_at(position) >= self.total_steps
    }

    /// Volume to restore once the fade is over
    pub fn initial_volume(&self) -> f32 {
        self.initial_volume
    }
}
