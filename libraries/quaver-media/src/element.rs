//! Platform-agnostic media element trait
//!
//! Abstracts the underlying audio resource (an HTML audio element on the
//! web, a native output stream elsewhere) so the driver can be tested
//! without real audio hardware.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a single audio resource
///
/// Implementors own exactly one loadable stream slot. Loading a new source
/// discards whatever was loaded before; there is no mixing and no second
/// channel. All methods are synchronous from the driver's point of view,
/// and playback failures surface through the `play` result rather than a
/// callback.
pub trait MediaElement: Send {
    /// Replace the current source and begin fetching it
    ///
    /// Resets the position to zero. The element stays paused until `play`
    /// is called.
    fn load(&mut self, url: &str);

    /// Start or resume playback of the loaded source
    ///
    /// # Returns
    /// * `Ok(())` - Playback started (or was already running)
    /// * `Err(_)` - Playback could not start; `MediaError::NotAllowed`
    ///   means the platform wants a user gesture first
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the loaded source and position
    fn pause(&mut self);

    /// Current playback position from the start of the source
    fn position(&self) -> Duration;

    /// Move the playback position
    fn set_position(&mut self, position: Duration);

    /// Total duration of the loaded source, once known
    ///
    /// Returns `None` until the element has read enough of the stream to
    /// know, and for live or endless sources that never report one.
    fn duration(&self) -> Option<Duration>;

    /// Current output volume in `0.0..=1.0`
    fn volume(&self) -> f32;

    /// Set the output volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f32);

    /// Set the playback rate (1.0 is normal speed)
    fn set_playback_rate(&mut self, rate: f32);

    /// Whether the element is currently paused
    fn is_paused(&self) -> bool;
}

/// Notifications a media element delivers to the driver
///
/// Mirrors the event set of a browser audio element. Payloads are read
/// back from the element itself when the event is handled, so the
/// variants carry no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// The playback position advanced
    TimeUpdate,
    /// The reported duration changed
    DurationChange,
    /// Enough data is buffered to start playing
    CanPlay,
    /// Playback reached the end of the source
    Ended,
    /// The element failed to fetch or decode the source
    Error,
}
