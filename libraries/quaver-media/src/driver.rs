//! Media element driver
//!
//! Bridges a [`PlaybackManager`] and a [`MediaElement`]: the manager
//! decides what should be playing, the driver makes the element do it and
//! feeds element reality back into the manager. Everything platform-shaped
//! lives here so the manager stays pure state.

use crate::element::{MediaElement, MediaEvent};
use crate::fade::FadeRamp;
use quaver_playback::{PlaybackManager, PlayerEvent, SettingsStore};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const VOLUME_KEY: &str = "music-player-volume";
const MUTED_KEY: &str = "music-player-muted";
const SPEED_KEY: &str = "music-player-playback-speed";

/// Playback rates the driver accepts
pub const SPEED_OPTIONS: [f32; 4] = [0.5, 1.0, 1.5, 2.0];

/// An `Ended` event only counts when the element got this close to the
/// reported duration. Source changes fire spurious `Ended` events from
/// earlier positions.
const ENDED_GUARD: Duration = Duration::from_secs(2);

/// Timing knobs for the driver
///
/// The defaults fit interactive use; tests shrink them to make deferred
/// work due immediately.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// How long element play/pause/ended/error events are ignored after a
    /// source change, so the load churn does not toggle the manager.
    pub suppress_window: Duration,
    /// Extra delay after the suppression window before the one-shot state
    /// sync reads the element.
    pub resync_grace: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            suppress_window: Duration::from_millis(1500),
            resync_grace: Duration::from_millis(100),
        }
    }
}

/// Work a driver entry point decided on that must run against the manager
/// after the internal lock is released.
enum DriverAction {
    SetPlaying(bool),
    HandleEnded,
}

struct DriverState<E> {
    element: E,
    settings: Arc<dyn SettingsStore>,
    config: DriverConfig,
    /// Track id we last pointed the element at (the stream URL may not
    /// contain the id).
    loaded_track_id: Option<String>,
    /// Element play/pause/ended/error events are ignored until this
    /// instant after a source change.
    suppress_until: Instant,
    /// When the one-shot post-load state sync is due; rescheduled by
    /// every load, consumed by `poll`.
    resync_at: Option<Instant>,
    /// Active end-of-track fade, if any.
    fade: Option<FadeRamp>,
    /// A play call was rejected and has not been dealt with yet.
    play_failed: bool,
    /// Waiting for a user gesture to retry a blocked play.
    retry_armed: bool,
    /// A seek drag is in progress; position updates from the element are
    /// ignored until it ends.
    seeking: bool,
    /// User volume in `0.0..=1.0`; zero doubles as muted.
    volume: f32,
    /// Volume to restore when unmuting.
    previous_volume: f32,
    playback_rate: f32,
    /// Last position read from the element.
    position: Duration,
    /// Last usable duration, seeded from track metadata until the element
    /// reports one.
    duration: Option<Duration>,
}

/// Drives a single media element from playback manager state
///
/// The driver owns the element. Wire it to a [`PlaybackManager`] with
/// [`attach`](MediaDriver::attach), which registers the playback trigger;
/// from then on the embedder routes element callbacks into
/// [`handle_event`](MediaDriver::handle_event), forwards drained manager
/// events to [`on_player_event`](MediaDriver::on_player_event), and calls
/// [`poll`](MediaDriver::poll) on a coarse timer tick so deferred work
/// (autoplay recovery, the post-load state sync) can run.
pub struct MediaDriver<E: MediaElement> {
    state: Arc<Mutex<DriverState<E>>>,
}

impl<E: MediaElement + 'static> MediaDriver<E> {
    // ===== Construction =====

    /// Create a driver with default timing
    pub fn new(element: E, settings: Arc<dyn SettingsStore>) -> Self {
        Self::with_config(element, settings, DriverConfig::default())
    }

    /// Create a driver with explicit timing
    ///
    /// Restores volume, mute and playback rate from `settings` and applies
    /// the volume to the element right away. The rate is applied on the
    /// next load, since loading resets it anyway.
    pub fn with_config(
        mut element: E,
        settings: Arc<dyn SettingsStore>,
        config: DriverConfig,
    ) -> Self {
        let mut volume = settings
            .get(VOLUME_KEY)
            .and_then(|raw| raw.parse::<f32>().ok())
            .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
            .unwrap_or(1.0);
        let mut previous_volume = 1.0;
        if settings.get(MUTED_KEY).as_deref() == Some("true") {
            previous_volume = volume;
            volume = 0.0;
        }
        let playback_rate = settings
            .get(SPEED_KEY)
            .and_then(|raw| raw.parse::<f32>().ok())
            .filter(|rate| SPEED_OPTIONS.contains(rate))
            .unwrap_or(1.0);

        element.set_volume(volume);

        Self {
            state: Arc::new(Mutex::new(DriverState {
                element,
                settings,
                config,
                loaded_track_id: None,
                suppress_until: Instant::now(),
                resync_at: None,
                fade: None,
                play_failed: false,
                retry_armed: false,
                seeking: false,
                volume,
                previous_volume,
                playback_rate,
                position: Duration::ZERO,
                duration: None,
            })),
        }
    }

    /// Register this driver as the manager's playback trigger
    ///
    /// The trigger runs inside the manager's own call stack, after state
    /// is fully updated, and only touches the element.
    pub fn attach(&self, manager: &mut PlaybackManager) {
        let state = Arc::clone(&self.state);
        manager.register_playback_trigger(move |url, track_id| {
            state.lock().unwrap().begin_load(url, track_id);
        });
    }

    // ===== Element Events =====

    /// Feed an element callback into the driver
    ///
    /// Decisions are made under the internal lock, which is released
    /// before the manager is touched, so a resulting load can re-enter
    /// the trigger safely.
    pub fn handle_event(&self, manager: &mut PlaybackManager, event: MediaEvent) {
        let crossfade_secs = manager.crossfade_duration();
        let manager_playing = manager.is_playing();
        let actions =
            self.state
                .lock()
                .unwrap()
                .process_event(event, crossfade_secs, manager_playing);
        Self::apply_actions(manager, actions);
    }

    /// Run deferred work: blocked-play recovery and the post-load sync
    ///
    /// Call this on a coarse timer tick (a second is plenty).
    pub fn poll(&self, manager: &mut PlaybackManager) {
        let actions = self.state.lock().unwrap().poll_actions();
        Self::apply_actions(manager, actions);
    }

    /// Report a user gesture (click, key press)
    ///
    /// If a blocked play is waiting for one, retry it once. A failed
    /// retry stays paused and does not re-arm.
    pub fn notify_user_gesture(&self, manager: &mut PlaybackManager) {
        let loaded = manager.now_playing().is_some();
        let resumed = {
            let mut state = self.state.lock().unwrap();
            if !state.retry_armed {
                return;
            }
            state.retry_armed = false;
            loaded && state.element.play().is_ok()
        };
        if resumed {
            manager.set_playing(true);
        }
    }

    /// Mirror a drained manager event onto the element
    ///
    /// Play/pause state follows `StateChanged`, the element is silenced
    /// when the now-playing slot empties, and track metadata seeds the
    /// duration mirror until the element reports its own.
    pub fn on_player_event(&self, event: &PlayerEvent) {
        let mut state = self.state.lock().unwrap();
        match event {
            PlayerEvent::StateChanged { playing: true } => {
                if state.loaded_track_id.is_some() && state.element.is_paused() {
                    if let Err(error) = state.element.play() {
                        debug!(%error, "resume was blocked");
                        state.play_failed = true;
                    }
                }
            }
            PlayerEvent::StateChanged { playing: false } => {
                state.element.pause();
            }
            PlayerEvent::NowPlayingCleared => {
                state.loaded_track_id = None;
                state.fade = None;
                state.seeking = false;
                state.position = Duration::ZERO;
                state.duration = None;
                state.element.pause();
            }
            PlayerEvent::TrackChanged { track, .. } => {
                state.duration = if track.duration > Duration::ZERO {
                    Some(track.duration)
                } else {
                    None
                };
            }
            _ => {}
        }
    }

    /// Empty the queue and stop playback, silencing the element
    pub fn clear_queue(&self, manager: &mut PlaybackManager) {
        {
            let mut state = self.state.lock().unwrap();
            state.fade = None;
            state.element.pause();
        }
        manager.clear_queue();
        manager.stop();
    }

    // ===== Transport =====

    /// Start a seek drag; the position mirror freezes until `seek_to`
    pub fn begin_seek(&self) {
        self.state.lock().unwrap().seeking = true;
    }

    /// Jump to `position`, ending any seek drag
    pub fn seek_to(&self, position: Duration) {
        let mut state = self.state.lock().unwrap();
        state.seeking = false;
        state.seek_element(position);
    }

    /// Seek by a signed number of seconds from the current position
    ///
    /// Does nothing until the element knows its duration.
    pub fn seek_relative(&self, delta_seconds: f64) {
        if !delta_seconds.is_finite() {
            return;
        }
        let mut state = self.state.lock().unwrap();
        let Some(duration) = state.element.duration() else {
            return;
        };
        let current = state.element.position().as_secs_f64();
        let target = (current + delta_seconds).clamp(0.0, duration.as_secs_f64());
        state.seek_element(Duration::from_secs_f64(target));
    }

    // ===== Volume =====

    /// Set the user volume, applying and persisting it
    ///
    /// Zero counts as muted. During a fade the ramp keeps control of the
    /// element level; the new volume still sticks and applies from the
    /// next load.
    pub fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.set_volume_level(volume.clamp(0.0, 1.0));
    }

    /// Mute, or unmute back to the remembered level
    ///
    /// Unmuting with no usable remembered level restores full volume.
    pub fn toggle_mute(&self) {
        let mut state = self.state.lock().unwrap();
        if state.volume == 0.0 {
            let restore = if state.previous_volume > 0.0 {
                state.previous_volume
            } else {
                1.0
            };
            state.set_volume_level(restore);
        } else {
            state.previous_volume = state.volume;
            state.set_volume_level(0.0);
        }
    }

    // ===== Playback Rate =====

    /// Set the playback rate; values outside [`SPEED_OPTIONS`] are ignored
    pub fn set_playback_rate(&self, rate: f32) {
        if !SPEED_OPTIONS.contains(&rate) {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.playback_rate = rate;
        state.element.set_playback_rate(rate);
        state.settings.set(SPEED_KEY, &rate.to_string());
    }

    /// Step to the next preset rate, wrapping at the end
    pub fn cycle_playback_rate(&self) -> f32 {
        let next = {
            let state = self.state.lock().unwrap();
            let index = SPEED_OPTIONS
                .iter()
                .position(|option| *option == state.playback_rate);
            SPEED_OPTIONS[index.map_or(0, |i| (i + 1) % SPEED_OPTIONS.len())]
        };
        self.set_playback_rate(next);
        next
    }

    // ===== Readers =====

    /// Last known playback position
    pub fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    /// Last known duration, if any
    pub fn duration(&self) -> Option<Duration> {
        self.state.lock().unwrap().duration
    }

    /// Current user volume
    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    /// Whether the player is muted (volume zero)
    pub fn is_muted(&self) -> bool {
        self.state.lock().unwrap().volume == 0.0
    }

    /// Current playback rate
    pub fn playback_rate(&self) -> f32 {
        self.state.lock().unwrap().playback_rate
    }

    // ===== Internal =====

    fn apply_actions(manager: &mut PlaybackManager, actions: Vec<DriverAction>) {
        for action in actions {
            match action {
                DriverAction::SetPlaying(playing) => manager.set_playing(playing),
                DriverAction::HandleEnded => manager.handle_ended(),
            }
        }
    }
}

impl<E: MediaElement> DriverState<E> {
    /// Playback trigger body: point the element at a new source
    fn begin_load(&mut self, url: &str, track_id: &str) {
        debug!(track_id, "loading source into media element");
        if self.fade.take().is_some() {
            let level = self.volume;
            self.element.set_volume(level);
        }
        self.loaded_track_id = Some(track_id.to_string());
        let now = Instant::now();
        self.suppress_until = now + self.config.suppress_window;
        self.resync_at = Some(now + self.config.suppress_window + self.config.resync_grace);
        self.element.load(url);
        // Loading resets the element's rate
        let rate = self.playback_rate;
        self.element.set_playback_rate(rate);
        self.position = Duration::ZERO;
        self.duration = None;
        self.seeking = false;
        if let Err(error) = self.element.play() {
            debug!(%error, "immediate play failed after load");
            self.play_failed = true;
        }
    }

    fn process_event(
        &mut self,
        event: MediaEvent,
        crossfade_secs: u32,
        manager_playing: bool,
    ) -> Vec<DriverAction> {
        let mut actions = Vec::new();
        match event {
            MediaEvent::Play => {
                if !self.suppressed() {
                    actions.push(DriverAction::SetPlaying(true));
                }
            }
            MediaEvent::Pause => {
                if !self.suppressed() {
                    actions.push(DriverAction::SetPlaying(false));
                }
            }
            MediaEvent::Error => {
                if !self.suppressed() {
                    warn!("media element reported a source error");
                    actions.push(DriverAction::SetPlaying(false));
                }
            }
            MediaEvent::Ended => {
                if !self.suppressed() && self.played_to_completion() {
                    actions.push(DriverAction::HandleEnded);
                }
            }
            MediaEvent::TimeUpdate => {
                let position = self.element.position();
                if !self.seeking {
                    self.position = position;
                }
                if let Some(action) = self.advance_fade(position, crossfade_secs) {
                    actions.push(action);
                }
            }
            MediaEvent::DurationChange => {
                if let Some(duration) = self.element.duration() {
                    if duration > Duration::ZERO {
                        self.duration = Some(duration);
                    }
                }
            }
            MediaEvent::CanPlay => {
                if manager_playing && self.loaded_track_id.is_some() && self.element.is_paused() {
                    if let Err(error) = self.element.play() {
                        debug!(%error, "deferred play failed once the source was ready");
                        self.play_failed = true;
                    }
                }
            }
        }
        self.take_play_failure(&mut actions);
        actions
    }

    fn poll_actions(&mut self) -> Vec<DriverAction> {
        let mut actions = Vec::new();
        self.take_play_failure(&mut actions);
        if let Some(resync_at) = self.resync_at {
            if Instant::now() >= resync_at {
                self.resync_at = None;
                let paused = self.element.is_paused();
                if !self.seeking {
                    self.position = self.element.position();
                }
                if let Some(duration) = self.element.duration() {
                    if duration > Duration::ZERO {
                        self.duration = Some(duration);
                    }
                }
                debug!(paused, "syncing playing flag from element after load");
                actions.push(DriverAction::SetPlaying(!paused));
            }
        }
        actions
    }

    /// Convert a recorded play rejection into a pause plus an armed
    /// one-shot gesture retry.
    fn take_play_failure(&mut self, actions: &mut Vec<DriverAction>) {
        if self.play_failed {
            self.play_failed = false;
            self.retry_armed = true;
            debug!("playback blocked, will retry on the next user gesture");
            actions.push(DriverAction::SetPlaying(false));
        }
    }

    fn suppressed(&self) -> bool {
        Instant::now() < self.suppress_until
    }

    /// Whether an `Ended` event reflects the source actually finishing
    fn played_to_completion(&self) -> bool {
        let Some(duration) = self.element.duration() else {
            return false;
        };
        if duration.is_zero() {
            return false;
        }
        self.element.position() + ENDED_GUARD >= duration
    }

    /// Advance an active fade, or start one when inside the window
    fn advance_fade(&mut self, position: Duration, crossfade_secs: u32) -> Option<DriverAction> {
        if let Some(fade) = self.fade.clone() {
            let level = fade.level_at(position);
            self.element.set_volume(level);
            if fade.is_complete(position) {
                self.fade = None;
                self.element.set_volume(fade.initial_volume());
                return Some(DriverAction::HandleEnded);
            }
            return None;
        }
        if crossfade_secs == 0 || self.seeking {
            return None;
        }
        let duration = self.element.duration().filter(|d| !d.is_zero())?;
        let remaining = duration.saturating_sub(position);
        if remaining.is_zero() || remaining > Duration::from_secs(u64::from(crossfade_secs)) {
            return None;
        }
        debug!(seconds = crossfade_secs, "starting end-of-track fade");
        self.fade = Some(FadeRamp::new(crossfade_secs, position, self.volume));
        None
    }

    fn seek_element(&mut self, position: Duration) {
        let target = match self.element.duration() {
            Some(duration) => position.min(duration),
            None => position,
        };
        self.element.set_position(target);
        self.position = target;
    }

    fn set_volume_level(&mut self, volume: f32) {
        self.volume = volume;
        if self.fade.is_none() {
            self.element.set_volume(volume);
        }
        self.settings.set(VOLUME_KEY, &volume.to_string());
        self.settings
            .set(MUTED_KEY, if volume == 0.0 { "true" } else { "false" });
    }
}
