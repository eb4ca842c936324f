//! Quaver - Playback Management
//!
//! Platform-agnostic playback and queue state for Quaver.
//!
//! This crate provides:
//! - The playback queue (insertion-ordered, duplicates allowed)
//! - The now-playing slot and play/pause flag
//! - Shuffle (random pick-different) and loop modes (Off, All, One)
//! - Crossfade duration with persistence
//! - The playback trigger seam the media driver registers
//! - Player events for UI/history observers
//! - A sleep timer
//!
//! # Architecture
//!
//! `quaver-playback` never touches a media resource:
//! - No dependency on any audio or browser backend
//! - No I/O beyond the key-value [`SettingsStore`] seam
//! - No timers or threads; the embedder drives polling
//!
//! The media side lives in `quaver-media`, which registers the playback
//! trigger, reports real resource state back through
//! [`PlaybackManager::set_playing`], and announces genuine track completion
//! via [`PlaybackManager::handle_ended`].
//!
//! # Example: Queue Control
//!
//! ```rust
//! use quaver_playback::{PlaybackManager, PlayableTrack};
//! use std::time::Duration;
//!
//! let mut manager = PlaybackManager::default();
//!
//! let track = |id: &str| PlayableTrack {
//!     id: id.to_string(),
//!     title: format!("Track {id}"),
//!     artist: Some("Some Artist".to_string()),
//!     artist_id: None,
//!     album: None,
//!     duration: Duration::from_secs(180),
//!     cover_art_url: None,
//!     stream_url: Some(format!("https://example.com/stream/{id}")),
//! };
//!
//! manager.play_queue(vec![track("a"), track("b"), track("c")], 0);
//! assert_eq!(manager.now_playing().unwrap().track.id, "a");
//!
//! manager.next();
//! assert_eq!(manager.now_playing().unwrap().track.id, "b");
//!
//! manager.toggle_play_pause();
//! assert!(!manager.is_playing());
//! ```
//!
//! # Example: Driving a Resource
//!
//! ```rust
//! use quaver_playback::{PlaybackManager, PlayableTrack, PlayerEvent};
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//!
//! let mut manager = PlaybackManager::default();
//!
//! // The media driver registers the single playback trigger; it fires
//! // synchronously inside `play`, within the user-gesture call stack.
//! let loads = Arc::new(Mutex::new(Vec::new()));
//! let recorded = Arc::clone(&loads);
//! manager.register_playback_trigger(move |url, track_id| {
//!     recorded.lock().unwrap().push((url.to_string(), track_id.to_string()));
//! });
//!
//! let track = PlayableTrack {
//!     id: "a".to_string(),
//!     title: "Track a".to_string(),
//!     artist: None,
//!     artist_id: None,
//!     album: None,
//!     duration: Duration::from_secs(180),
//!     cover_art_url: None,
//!     stream_url: Some("https://example.com/stream/a".to_string()),
//! };
//! manager.play(&track, None);
//! assert_eq!(loads.lock().unwrap().len(), 1);
//!
//! // Observers read state changes from the event drain.
//! let events = manager.drain_events();
//! assert!(events.iter().any(|e| matches!(e, PlayerEvent::TrackChanged { .. })));
//! ```

mod events;
mod manager;
mod queue;
mod settings;
mod shuffle;
mod sleep_timer;
pub mod types;

// Public exports
pub use events::PlayerEvent;
pub use manager::PlaybackManager;
pub use settings::{MemorySettings, SettingsStore};
pub use sleep_timer::SleepTimer;
pub use types::{LoopMode, NowPlaying, PlayableTrack};
