//! Media element driving for Quaver
//!
//! Owns the audio resource side of playback: `quaver-playback` decides
//! what should be playing, this crate makes a [`MediaElement`] do it and
//! feeds element reality back into the manager. It carries everything
//! platform-shaped: source loading, the post-load suppression window,
//! end-of-track detection, crossfades, blocked-autoplay recovery, seeking,
//! volume, mute and playback rate.
//!
//! # Wiring
//!
//! ```
//! use quaver_media::testing::MockElement;
//! use quaver_media::{MediaDriver, MediaEvent};
//! use quaver_playback::types::PlayableTrack;
//! use quaver_playback::{MemorySettings, PlaybackManager};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let settings = Arc::new(MemorySettings::new());
//! let element = MockElement::new();
//! let driver = MediaDriver::new(element.clone(), settings.clone());
//! let mut manager = PlaybackManager::new(settings);
//! driver.attach(&mut manager);
//!
//! let track = PlayableTrack {
//!     id: "t1".into(),
//!     title: "First Light".into(),
//!     artist: None,
//!     artist_id: None,
//!     album: None,
//!     duration: Duration::from_secs(180),
//!     cover_art_url: None,
//!     stream_url: Some("https://example.com/t1.mp3".into()),
//! };
//! manager.play(&track, None);
//! assert_eq!(
//!     element.last_loaded().as_deref(),
//!     Some("https://example.com/t1.mp3")
//! );
//!
//! // The embedder forwards drained manager events and element callbacks.
//! for event in manager.drain_events() {
//!     driver.on_player_event(&event);
//! }
//! driver.handle_event(&mut manager, MediaEvent::TimeUpdate);
//! ```

mod driver;
mod element;
mod error;
mod fade;
pub mod testing;

pub use driver::{DriverConfig, MediaDriver, SPEED_OPTIONS};
pub use element::{MediaElement, MediaEvent};
pub use error::{MediaError, Result};
