//! Core types for playback and queue management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A track that can be queued and played
///
/// Catalog lookups happen elsewhere; by the time a track reaches the
/// playback core it carries everything needed for playback and display.
/// Identity is `id`: two values with the same `id` are treated as the same
/// track for already-playing checks even if other fields differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableTrack {
    /// Stable catalog identifier
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name (optional)
    pub artist: Option<String>,

    /// Artist catalog identifier (optional)
    pub artist_id: Option<String>,

    /// Album name (optional)
    pub album: Option<String>,

    /// Declared duration; `Duration::ZERO` when unknown at queue time
    pub duration: Duration,

    /// Cover art URL (optional)
    pub cover_art_url: Option<String>,

    /// Stream URL; may be absent when playback needs a resolved override
    pub stream_url: Option<String>,
}

impl PlayableTrack {
    /// Whether this is the same track as `other_id`, by identity.
    pub fn is(&self, other_id: &str) -> bool {
        self.id == other_id
    }
}

/// The currently loaded track plus its resolved stream URL
///
/// Exists only while something is loaded. `stream_url` is always non-empty:
/// it is the play-time override when one was given, otherwise the track's
/// own URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// The loaded track
    pub track: PlayableTrack,

    /// Resolved URL the media resource was pointed at
    pub stream_url: String,
}

/// Loop mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Stop when the queue ends
    Off,

    /// Wrap to the start of the queue
    All,

    /// Repeat the current track indefinitely
    One,
}

impl LoopMode {
    /// The next mode in the `Off -> All -> One -> Off` cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

impl Default for LoopMode {
    fn default() -> Self {
        Self::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_mode_cycles_through_all_modes() {
        let mut mode = LoopMode::Off;
        mode = mode.cycled();
        assert_eq!(mode, LoopMode::All);
        mode = mode.cycled();
        assert_eq!(mode, LoopMode::One);
        mode = mode.cycled();
        assert_eq!(mode, LoopMode::Off);
    }

    #[test]
    fn track_identity_is_by_id() {
        let track = PlayableTrack {
            id: "track1".to_string(),
            title: "Test Song".to_string(),
            artist: Some("Test Artist".to_string()),
            artist_id: Some("artist1".to_string()),
            album: None,
            duration: Duration::from_secs(180),
            cover_art_url: None,
            stream_url: Some("https://example.com/stream/track1".to_string()),
        };

        assert!(track.is("track1"));
        assert!(!track.is("track2"));
    }
}
