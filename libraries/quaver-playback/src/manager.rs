//! Playback manager
//!
//! Single source of truth for what should be playing and in what order,
//! independent of whether a media resource is actually producing sound.
//! The manager holds the queue, the now-playing slot, and the playback
//! flags; the one outward call it ever makes is the registered playback
//! trigger, invoked synchronously inside `play` so the resource call lands
//! in the same stack frame as the user gesture that caused it.
//!
//! Every guard condition (missing URL, empty queue, bad index) is a silent
//! no-op. Playback controls are driven by UI events and must tolerate
//! races like a double-click mid-transition without ever erroring.

use crate::events::PlayerEvent;
use crate::queue::Queue;
use crate::settings::SettingsStore;
use crate::shuffle;
use crate::types::{LoopMode, NowPlaying, PlayableTrack};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Settings key for the persisted crossfade duration
const CROSSFADE_KEY: &str = "crossfade-duration";

/// Longest allowed crossfade, in whole seconds
const CROSSFADE_MAX_SECS: u32 = 12;

/// The single-slot callback that performs the resource-level play call
type PlaybackTrigger = Box<dyn FnMut(&str, &str) + Send>;

/// Round a requested crossfade duration onto the supported range.
fn clamp_crossfade(seconds: f32) -> u32 {
    if !seconds.is_finite() {
        return 0;
    }
    seconds.round().clamp(0.0, CROSSFADE_MAX_SECS as f32) as u32
}

/// Effective stream URL for a play request: the override wins over the
/// track's own URL, and blank values count as absent.
fn resolve_stream_url(track: &PlayableTrack, override_url: Option<&str>) -> Option<String> {
    override_url
        .or(track.stream_url.as_deref())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Queue and playback state for a single logical player
///
/// Owns:
/// - The ordered queue and the now-playing slot
/// - Play/pause, shuffle, and loop flags
/// - Crossfade duration (persisted through the settings store)
/// - The playback trigger the media driver registers
///
/// It never touches the media resource itself; the driver observes this
/// state (via [`drain_events`](Self::drain_events) and the trigger) and
/// reports real resource state back through [`set_playing`](Self::set_playing)
/// and [`handle_ended`](Self::handle_ended).
pub struct PlaybackManager {
    // State
    now_playing: Option<NowPlaying>,
    playing: bool,

    // Queue
    queue: Queue,

    // Flags
    shuffle_enabled: bool,
    loop_mode: LoopMode,
    crossfade_secs: u32,

    // Collaborators
    settings: Arc<dyn SettingsStore>,
    playback_trigger: Option<PlaybackTrigger>,

    // Event queue for observers
    pending_events: Vec<PlayerEvent>,
}

impl PlaybackManager {
    /// Create a new manager, restoring the crossfade duration from settings
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        let crossfade_secs = settings
            .get(CROSSFADE_KEY)
            .and_then(|raw| raw.parse::<f32>().ok())
            .map_or(0, clamp_crossfade);

        Self {
            now_playing: None,
            playing: false,
            queue: Queue::new(),
            shuffle_enabled: false,
            loop_mode: LoopMode::Off,
            crossfade_secs,
            settings,
            playback_trigger: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Load a track and start playing it
    ///
    /// The effective URL is `stream_url_override` when given, otherwise the
    /// track's own `stream_url`. Without a resolvable URL the request is
    /// ignored and prior state is left untouched. Otherwise the now-playing
    /// slot and playing flag are updated first, then the registered playback
    /// trigger runs synchronously with `(url, track.id)`.
    pub fn play(&mut self, track: &PlayableTrack, stream_url_override: Option<&str>) {
        let Some(url) = resolve_stream_url(track, stream_url_override) else {
            debug!(track_id = %track.id, "ignoring play request without a stream url");
            return;
        };

        debug!(track_id = %track.id, "playing track");
        self.now_playing = Some(NowPlaying {
            track: track.clone(),
            stream_url: url.clone(),
        });
        self.pending_events.push(PlayerEvent::TrackChanged {
            track: track.clone(),
            stream_url: url.clone(),
        });
        self.set_playing_flag(true);

        // State is fully updated before the trigger fires, so the resource
        // call happens inside the caller's own stack frame.
        if let Some(trigger) = self.playback_trigger.as_mut() {
            trigger(&url, &track.id);
        }
    }

    /// Replace the queue wholesale and play the track at `start_index`
    ///
    /// Empty input is ignored. An out-of-range `start_index` clamps to the
    /// last track.
    pub fn play_queue(&mut self, tracks: Vec<PlayableTrack>, start_index: usize) {
        if tracks.is_empty() {
            return;
        }
        let index = start_index.min(tracks.len() - 1);
        let track = tracks[index].clone();

        self.queue.replace(tracks);
        self.emit_queue_changed();
        self.play(&track, None);
    }

    /// Flip the playing flag; the loaded track is untouched
    ///
    /// Ignored while nothing is loaded, so a playing flag can never exist
    /// without a track behind it.
    pub fn toggle_play_pause(&mut self) {
        if self.now_playing.is_none() {
            return;
        }
        self.set_playing_flag(!self.playing);
    }

    /// Authoritative sync point for the media driver
    ///
    /// Called when the resource itself reports play/pause/error so the
    /// observable state reflects what is actually happening rather than
    /// what was last requested. `true` is ignored while nothing is loaded.
    pub fn set_playing(&mut self, playing: bool) {
        if playing && self.now_playing.is_none() {
            return;
        }
        self.set_playing_flag(playing);
    }

    /// Pause playback, keeping the loaded track
    pub fn pause(&mut self) {
        self.set_playing_flag(false);
    }

    /// Stop playback and unload the current track (the queue survives)
    pub fn stop(&mut self) {
        self.set_playing_flag(false);
        if self.now_playing.take().is_some() {
            self.pending_events.push(PlayerEvent::NowPlayingCleared);
        }
    }

    // ===== Mode Flags =====

    /// Toggle random track selection
    pub fn toggle_shuffle(&mut self) {
        self.shuffle_enabled = !self.shuffle_enabled;
        self.pending_events.push(PlayerEvent::ShuffleChanged {
            enabled: self.shuffle_enabled,
        });
    }

    /// Step the loop mode through off -> all -> one -> off
    pub fn cycle_loop_mode(&mut self) {
        self.loop_mode = self.loop_mode.cycled();
        self.pending_events.push(PlayerEvent::LoopModeChanged {
            mode: self.loop_mode,
        });
    }

    /// Set the crossfade duration in seconds
    ///
    /// Rounded to a whole second and clamped to 0..=12 (0 disables the
    /// fade); the result is persisted and restored on the next start.
    pub fn set_crossfade_duration(&mut self, seconds: f32) {
        let clamped = clamp_crossfade(seconds);
        if clamped != self.crossfade_secs {
            self.crossfade_secs = clamped;
            self.pending_events
                .push(PlayerEvent::CrossfadeChanged { seconds: clamped });
        }
        self.settings.set(CROSSFADE_KEY, &clamped.to_string());
    }

    // ===== Track Advance =====

    /// Advance to the next track
    ///
    /// Shuffle picks a random track different from the current one. In
    /// order mode the queue advances by position; past the last entry the
    /// queue wraps when loop is `All`, otherwise the current track stays
    /// loaded and the playing flag drops (stop at the end of the queue).
    pub fn next(&mut self) {
        let Some(current_id) = self.current_track_id() else {
            return;
        };
        if self.queue.is_empty() {
            return;
        }

        if self.shuffle_enabled {
            let picked =
                shuffle::pick_random_different(self.queue.tracks(), Some(&current_id)).cloned();
            if let Some(track) = picked {
                self.play(&track, None);
            }
            return;
        }

        // A current id missing from the queue (wholesale replacement under
        // us) recovers by playing the first entry.
        let next_index = match self.queue.index_of(&current_id) {
            Some(index) => index + 1,
            None => 0,
        };

        if let Some(track) = self.queue.get(next_index).cloned() {
            self.play(&track, None);
        } else if self.loop_mode == LoopMode::All {
            if let Some(track) = self.queue.get(0).cloned() {
                self.play(&track, None);
            }
        } else {
            debug!("end of queue reached, stopping");
            self.set_playing_flag(false);
        }
    }

    /// Go back to the previous track
    ///
    /// Shuffle picks a random different track, as in [`next`](Self::next).
    /// In order mode the first entry wraps back to the end of the queue no
    /// matter the loop mode; only advancing past the end respects it.
    pub fn previous(&mut self) {
        let Some(current_id) = self.current_track_id() else {
            return;
        };
        if self.queue.is_empty() {
            return;
        }

        if self.shuffle_enabled {
            let picked =
                shuffle::pick_random_different(self.queue.tracks(), Some(&current_id)).cloned();
            if let Some(track) = picked {
                self.play(&track, None);
            }
            return;
        }

        let previous_index = match self.queue.index_of(&current_id) {
            Some(index) if index > 0 => index - 1,
            _ => self.queue.len() - 1,
        };

        if let Some(track) = self.queue.get(previous_index).cloned() {
            self.play(&track, None);
        }
    }

    /// React to genuine playback completion
    ///
    /// Only the media driver calls this, and only after its end-of-track
    /// guards have passed. Loop `One` replays the current track through the
    /// trigger; anything else advances like [`next`](Self::next).
    pub fn handle_ended(&mut self) {
        let Some(now) = self.now_playing.clone() else {
            return;
        };
        if self.loop_mode == LoopMode::One {
            self.play(&now.track, Some(&now.stream_url));
            return;
        }
        self.next();
    }

    // ===== Queue Management =====

    /// Append a track, or start playing it when the player is idle
    ///
    /// Returns `true` when the call started playback (empty queue, nothing
    /// loaded), so callers can skip their own redundant play call.
    pub fn add_to_queue(&mut self, track: PlayableTrack) -> bool {
        if self.queue.is_empty() && self.now_playing.is_none() {
            self.play_queue(vec![track], 0);
            return true;
        }
        self.queue.push(track);
        self.emit_queue_changed();
        false
    }

    /// Empty the queue
    ///
    /// The loaded track keeps playing; callers that want full silence pause
    /// the resource and call [`stop`](Self::stop) as well.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
    }

    /// Remove the track at `index`; out of range is ignored
    ///
    /// Removing the current track (matched by id) moves playback to the
    /// entry now sitting at `min(index, len - 1)`, or stops when the queue
    /// ran out.
    pub fn remove_from_queue(&mut self, index: usize) {
        let Some(removed) = self.queue.remove(index) else {
            return;
        };
        self.emit_queue_changed();

        let removed_current = self
            .now_playing
            .as_ref()
            .is_some_and(|now| now.track.is(&removed.id));
        if !removed_current {
            return;
        }

        if self.queue.is_empty() {
            self.stop();
        } else {
            let next_index = index.min(self.queue.len() - 1);
            if let Some(track) = self.queue.get(next_index).cloned() {
                self.play(&track, None);
            }
        }
    }

    // ===== Trigger =====

    /// Register the callback that performs the resource-level play call
    ///
    /// Exactly one trigger exists at a time; registering again replaces the
    /// previous one. The manager relies on exactly-once invocation per play
    /// to avoid double-starting the resource, which is why this is a single
    /// slot and not a subscriber list.
    pub fn register_playback_trigger<F>(&mut self, trigger: F)
    where
        F: FnMut(&str, &str) + Send + 'static,
    {
        self.playback_trigger = Some(Box::new(trigger));
    }

    // ===== Readers =====

    /// The loaded track and its resolved URL, if any
    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    /// Whether playback should currently be running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Queue contents in order
    pub fn queue(&self) -> &[PlayableTrack] {
        self.queue.tracks()
    }

    /// Number of queued tracks
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Sum of the declared durations of all queued tracks
    pub fn queue_duration(&self) -> Duration {
        self.queue.total_duration()
    }

    /// Whether shuffle is enabled
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Current loop mode
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Crossfade duration in whole seconds (0 = disabled)
    pub fn crossfade_duration(&self) -> u32 {
        self.crossfade_secs
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns everything emitted since the last drain. The embedder calls
    /// this after invoking operations and forwards each event to its
    /// observers (UI, media driver, history collectors).
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    fn current_track_id(&self) -> Option<String> {
        self.now_playing.as_ref().map(|now| now.track.id.clone())
    }

    /// Set the playing flag, emitting `StateChanged` only on a real flip.
    fn set_playing_flag(&mut self, playing: bool) {
        if self.playing == playing {
            return;
        }
        self.playing = playing;
        self.pending_events
            .push(PlayerEvent::StateChanged { playing });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }
}

impl Default for PlaybackManager {
    fn default() -> Self {
        Self::new(Arc::new(crate::settings::MemorySettings::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn create_test_track(id: &str) -> PlayableTrack {
        PlayableTrack {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist: Some("Test Artist".to_string()),
            artist_id: Some("artist1".to_string()),
            album: Some("Test Album".to_string()),
            duration: Duration::from_secs(180),
            cover_art_url: None,
            stream_url: Some(format!("https://example.com/stream/{}", id)),
        }
    }

    fn create_track_without_url(id: &str) -> PlayableTrack {
        let mut track = create_test_track(id);
        track.stream_url = None;
        track
    }

    /// Register a trigger that counts invocations and records arguments.
    fn install_recording_trigger(
        manager: &mut PlaybackManager,
    ) -> (Arc<AtomicUsize>, Arc<Mutex<Vec<(String, String)>>>) {
        let count = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let trigger_count = Arc::clone(&count);
        let trigger_calls = Arc::clone(&calls);
        manager.register_playback_trigger(move |url, track_id| {
            trigger_count.fetch_add(1, Ordering::SeqCst);
            trigger_calls
                .lock()
                .unwrap()
                .push((url.to_string(), track_id.to_string()));
        });
        (count, calls)
    }

    fn now_playing_id(manager: &PlaybackManager) -> Option<String> {
        manager.now_playing().map(|now| now.track.id.clone())
    }

    #[test]
    fn new_manager_is_idle() {
        let manager = PlaybackManager::default();
        assert!(manager.now_playing().is_none());
        assert!(!manager.is_playing());
        assert!(manager.queue().is_empty());
        assert!(!manager.shuffle_enabled());
        assert_eq!(manager.loop_mode(), LoopMode::Off);
        assert_eq!(manager.crossfade_duration(), 0);
    }

    #[test]
    fn play_without_url_is_ignored() {
        let mut manager = PlaybackManager::default();
        let (count, _) = install_recording_trigger(&mut manager);

        manager.play(&create_track_without_url("a"), None);

        assert!(manager.now_playing().is_none());
        assert!(!manager.is_playing());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn play_without_url_keeps_prior_track() {
        let mut manager = PlaybackManager::default();
        manager.play(&create_test_track("a"), None);

        manager.play(&create_track_without_url("b"), None);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
    }

    #[test]
    fn play_with_blank_override_is_ignored() {
        let mut manager = PlaybackManager::default();

        manager.play(&create_test_track("a"), Some(""));

        assert!(manager.now_playing().is_none());
    }

    #[test]
    fn play_sets_state_and_invokes_trigger() {
        let mut manager = PlaybackManager::default();
        let (count, calls) = install_recording_trigger(&mut manager);

        manager.play(&create_test_track("a"), None);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[(
                "https://example.com/stream/a".to_string(),
                "a".to_string()
            )]
        );
    }

    #[test]
    fn play_prefers_override_url() {
        let mut manager = PlaybackManager::default();
        let (_, calls) = install_recording_trigger(&mut manager);

        manager.play(&create_test_track("a"), Some("https://cdn.example.com/a"));

        assert_eq!(
            manager.now_playing().unwrap().stream_url,
            "https://cdn.example.com/a"
        );
        assert_eq!(calls.lock().unwrap()[0].0, "https://cdn.example.com/a");
    }

    #[test]
    fn play_queue_empty_is_ignored() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);

        manager.play_queue(Vec::new(), 3);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert_eq!(manager.queue_len(), 1);
    }

    #[test]
    fn play_queue_starts_at_index() {
        let mut manager = PlaybackManager::default();

        manager.play_queue(
            vec![
                create_test_track("a"),
                create_test_track("b"),
                create_test_track("c"),
            ],
            1,
        );

        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
        assert_eq!(manager.queue_len(), 3);
        assert!(manager.is_playing());
    }

    #[test]
    fn play_queue_clamps_out_of_range_start() {
        let mut manager = PlaybackManager::default();

        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 7);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
    }

    #[test]
    fn toggle_play_pause_is_involution() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);
        assert!(manager.is_playing());

        manager.toggle_play_pause();
        assert!(!manager.is_playing());
        manager.toggle_play_pause();
        assert!(manager.is_playing());
    }

    #[test]
    fn toggle_play_pause_without_track_is_ignored() {
        let mut manager = PlaybackManager::default();

        manager.toggle_play_pause();

        assert!(!manager.is_playing());
        assert!(manager.now_playing().is_none());
    }

    #[test]
    fn set_playing_true_requires_loaded_track() {
        let mut manager = PlaybackManager::default();

        manager.set_playing(true);
        assert!(!manager.is_playing());

        manager.play_queue(vec![create_test_track("a")], 0);
        manager.set_playing(false);
        assert!(!manager.is_playing());
        manager.set_playing(true);
        assert!(manager.is_playing());
    }

    #[test]
    fn stop_clears_now_playing_and_flag() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);

        manager.stop();

        assert!(manager.now_playing().is_none());
        assert!(!manager.is_playing());
        // The queue survives a stop
        assert_eq!(manager.queue_len(), 1);
    }

    #[test]
    fn next_advances_in_queue_order() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(
            vec![
                create_test_track("a"),
                create_test_track("b"),
                create_test_track("c"),
            ],
            0,
        );

        manager.next();
        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
        manager.next();
        assert_eq!(now_playing_id(&manager).as_deref(), Some("c"));
    }

    #[test]
    fn next_at_end_stops_without_advancing() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 1);

        manager.next();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
        assert!(!manager.is_playing());
    }

    #[test]
    fn next_wraps_with_loop_all() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 1);
        manager.cycle_loop_mode(); // all

        manager.next();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
    }

    #[test]
    fn next_with_unknown_current_plays_first() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);
        // Load an id the queue does not contain
        manager.play(&create_test_track("orphan"), None);

        manager.next();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
    }

    #[test]
    fn next_without_track_or_queue_is_ignored() {
        let mut manager = PlaybackManager::default();
        manager.next();
        assert!(manager.now_playing().is_none());

        // Loaded track but empty queue: still a no-op
        manager.play(&create_test_track("a"), None);
        manager.next();
        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
    }

    #[test]
    fn previous_steps_back_in_order() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(
            vec![
                create_test_track("a"),
                create_test_track("b"),
                create_test_track("c"),
            ],
            2,
        );

        manager.previous();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
    }

    #[test]
    fn previous_wraps_from_first_track_for_every_loop_mode() {
        for cycles in 0..3 {
            let mut manager = PlaybackManager::default();
            manager.play_queue(
                vec![
                    create_test_track("a"),
                    create_test_track("b"),
                    create_test_track("c"),
                ],
                0,
            );
            for _ in 0..cycles {
                manager.cycle_loop_mode();
            }

            manager.previous();

            assert_eq!(
                now_playing_id(&manager).as_deref(),
                Some("c"),
                "loop mode {:?} should not affect the wrap",
                manager.loop_mode()
            );
        }
    }

    #[test]
    fn queue_walkthrough_with_previous_wrap() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(
            vec![
                create_test_track("a"),
                create_test_track("b"),
                create_test_track("c"),
            ],
            0,
        );

        manager.next();
        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
        manager.previous();
        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        manager.previous();
        assert_eq!(now_playing_id(&manager).as_deref(), Some("c"));
    }

    #[test]
    fn handle_ended_loop_one_replays_same_track() {
        let mut manager = PlaybackManager::default();
        let (count, calls) = install_recording_trigger(&mut manager);
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);
        manager.cycle_loop_mode();
        manager.cycle_loop_mode(); // one
        let before = count.load(Ordering::SeqCst);

        manager.handle_ended();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert_eq!(count.load(Ordering::SeqCst), before + 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.last().unwrap().1, "a");
    }

    #[test]
    fn handle_ended_advances_like_next() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);

        manager.handle_ended();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
    }

    #[test]
    fn handle_ended_without_track_is_ignored() {
        let mut manager = PlaybackManager::default();
        manager.handle_ended();
        assert!(manager.now_playing().is_none());
    }

    #[test]
    fn cycle_loop_mode_three_times_returns_to_off() {
        let mut manager = PlaybackManager::default();

        manager.cycle_loop_mode();
        assert_eq!(manager.loop_mode(), LoopMode::All);
        manager.cycle_loop_mode();
        assert_eq!(manager.loop_mode(), LoopMode::One);
        manager.cycle_loop_mode();
        assert_eq!(manager.loop_mode(), LoopMode::Off);
    }

    #[test]
    fn toggle_shuffle_flips_flag() {
        let mut manager = PlaybackManager::default();

        manager.toggle_shuffle();
        assert!(manager.shuffle_enabled());
        manager.toggle_shuffle();
        assert!(!manager.shuffle_enabled());
    }

    #[test]
    fn shuffle_next_on_two_tracks_always_picks_the_other() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);
        manager.toggle_shuffle();

        for _ in 0..20 {
            let before = now_playing_id(&manager).unwrap();
            manager.next();
            let after = now_playing_id(&manager).unwrap();
            assert_ne!(before, after, "shuffle repeated the current track");
        }
    }

    #[test]
    fn shuffle_single_track_replays_it() {
        let mut manager = PlaybackManager::default();
        let (count, _) = install_recording_trigger(&mut manager);
        manager.play_queue(vec![create_test_track("a")], 0);
        manager.toggle_shuffle();
        let before = count.load(Ordering::SeqCst);

        manager.next();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert_eq!(count.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn shuffle_previous_also_picks_different() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);
        manager.toggle_shuffle();

        manager.previous();

        assert_eq!(now_playing_id(&manager).as_deref(), Some("b"));
    }

    #[test]
    fn add_to_queue_starts_playback_when_idle() {
        let mut manager = PlaybackManager::default();

        let started = manager.add_to_queue(create_test_track("a"));

        assert!(started);
        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
        assert_eq!(manager.queue_len(), 1);
    }

    #[test]
    fn add_to_queue_appends_when_something_is_queued() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);

        let started = manager.add_to_queue(create_test_track("b"));

        assert!(!started);
        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert_eq!(manager.queue_len(), 2);
        assert_eq!(manager.queue()[1].id, "b");
    }

    #[test]
    fn add_to_queue_appends_when_stopped_with_leftover_queue() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);
        manager.stop();

        // Queue still holds "a", so this must append rather than start
        let started = manager.add_to_queue(create_test_track("b"));

        assert!(!started);
        assert!(manager.now_playing().is_none());
        assert_eq!(manager.queue_len(), 2);
    }

    #[test]
    fn clear_queue_keeps_current_playback() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);

        manager.clear_queue();

        assert_eq!(manager.queue_len(), 0);
        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
    }

    #[test]
    fn remove_from_queue_out_of_range_is_ignored() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);

        manager.remove_from_queue(4);

        assert_eq!(manager.queue_len(), 1);
        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
    }

    #[test]
    fn remove_current_last_entry_stops_playback() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);

        manager.remove_from_queue(0);

        assert!(manager.now_playing().is_none());
        assert!(!manager.is_playing());
        assert_eq!(manager.queue_len(), 0);
    }

    #[test]
    fn remove_current_plays_track_at_same_index() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(
            vec![
                create_test_track("a"),
                create_test_track("b"),
                create_test_track("c"),
            ],
            1,
        );

        manager.remove_from_queue(1);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("c"));
        assert_eq!(manager.queue_len(), 2);
    }

    #[test]
    fn remove_current_at_tail_plays_new_last_track() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 1);

        manager.remove_from_queue(1);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
    }

    #[test]
    fn remove_non_current_track_keeps_playback() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(
            vec![
                create_test_track("a"),
                create_test_track("b"),
                create_test_track("c"),
            ],
            0,
        );

        manager.remove_from_queue(2);

        assert_eq!(now_playing_id(&manager).as_deref(), Some("a"));
        assert!(manager.is_playing());
        assert_eq!(manager.queue_len(), 2);
    }

    #[test]
    fn crossfade_duration_rounds_and_clamps() {
        let mut manager = PlaybackManager::default();

        manager.set_crossfade_duration(5.4);
        assert_eq!(manager.crossfade_duration(), 5);

        manager.set_crossfade_duration(100.0);
        assert_eq!(manager.crossfade_duration(), 12);

        manager.set_crossfade_duration(-3.0);
        assert_eq!(manager.crossfade_duration(), 0);

        manager.set_crossfade_duration(f32::NAN);
        assert_eq!(manager.crossfade_duration(), 0);
    }

    #[test]
    fn crossfade_duration_persists_across_restarts() {
        let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::new());

        let mut manager = PlaybackManager::new(Arc::clone(&settings));
        manager.set_crossfade_duration(8.0);

        let restored = PlaybackManager::new(Arc::clone(&settings));
        assert_eq!(restored.crossfade_duration(), 8);
    }

    #[test]
    fn malformed_persisted_crossfade_falls_back_to_zero() {
        let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::new());
        settings.set("crossfade-duration", "not-a-number");

        let manager = PlaybackManager::new(settings);
        assert_eq!(manager.crossfade_duration(), 0);
    }

    #[test]
    fn register_trigger_replaces_previous() {
        let mut manager = PlaybackManager::default();
        let (old_count, _) = install_recording_trigger(&mut manager);
        let (new_count, _) = install_recording_trigger(&mut manager);

        manager.play(&create_test_track("a"), None);

        assert_eq!(old_count.load(Ordering::SeqCst), 0);
        assert_eq!(new_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn play_emits_track_and_state_events() {
        let mut manager = PlaybackManager::default();

        manager.play(&create_test_track("a"), None);

        let events = manager.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::TrackChanged { track, .. } if track.id == "a"
        )));
        assert!(events
            .iter()
            .any(|event| matches!(event, PlayerEvent::StateChanged { playing: true })));
        assert!(!manager.has_pending_events());
    }

    #[test]
    fn same_value_playing_writes_emit_nothing() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);
        manager.drain_events();

        manager.set_playing(true);

        assert!(!manager.has_pending_events());
    }

    #[test]
    fn stop_emits_cleared_event() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);
        manager.drain_events();

        manager.stop();

        let events = manager.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, PlayerEvent::StateChanged { playing: false })));
        assert!(events
            .iter()
            .any(|event| matches!(event, PlayerEvent::NowPlayingCleared)));
    }

    #[test]
    fn queue_mutations_emit_queue_changed() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a")], 0);
        manager.drain_events();

        manager.add_to_queue(create_test_track("b"));
        manager.remove_from_queue(1);
        manager.clear_queue();

        let lengths: Vec<usize> = manager
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::QueueChanged { length } => Some(length),
                _ => None,
            })
            .collect();
        assert_eq!(lengths, vec![2, 1, 0]);
    }

    #[test]
    fn queue_duration_sums_tracks() {
        let mut manager = PlaybackManager::default();
        manager.play_queue(vec![create_test_track("a"), create_test_track("b")], 0);

        assert_eq!(manager.queue_duration(), Duration::from_secs(360));
    }
}
