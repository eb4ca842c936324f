//! Player events
//!
//! Change notifications emitted by the manager. Events accumulate in an
//! internal buffer and the embedder drains them after calling operations,
//! forwarding each to its observers (UI state, the media driver's element
//! mirroring, history/stats collectors).

use crate::types::{LoopMode, PlayableTrack};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// A new track was loaded into the now-playing slot
    ///
    /// History collectors append their entries from this.
    TrackChanged {
        /// The track now playing
        track: PlayableTrack,
        /// Resolved URL the driver was pointed at
        stream_url: String,
    },

    /// The now-playing slot was emptied (`stop`)
    NowPlayingCleared,

    /// The playing flag flipped
    ///
    /// Emitted only on actual transitions, not on same-value writes.
    StateChanged {
        /// Whether playback should be running
        playing: bool,
    },

    /// Queue contents changed (replace/append/remove/clear)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Shuffle was toggled
    ShuffleChanged {
        /// Whether shuffle is now enabled
        enabled: bool,
    },

    /// Loop mode cycled
    LoopModeChanged {
        /// The new loop mode
        mode: LoopMode,
    },

    /// Crossfade duration changed
    CrossfadeChanged {
        /// New duration in whole seconds (0 = disabled)
        seconds: u32,
    },
}
