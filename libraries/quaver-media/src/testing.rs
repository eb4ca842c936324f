//! Test double for the media element
//!
//! `MockElement` records every call the driver makes and lets tests
//! script play failures and simulate position or duration changes. It is
//! a cloneable handle over shared state, so a test keeps one clone while
//! the driver owns another.

use crate::element::MediaElement;
use crate::error::{MediaError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call the driver made against the element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    /// `load` with the source URL
    Load(String),
    /// `play`
    Play,
    /// `pause`
    Pause,
    /// `set_position` with the target position
    Seek(Duration),
    /// `set_volume` with the level
    SetVolume(f32),
    /// `set_playback_rate` with the rate
    SetRate(f32),
}

#[derive(Debug)]
struct MockState {
    source: Option<String>,
    paused: bool,
    position: Duration,
    duration: Option<Duration>,
    volume: f32,
    playback_rate: f32,
    play_failures: VecDeque<MediaError>,
    calls: Vec<ElementCall>,
}

/// In-memory media element for driver tests
#[derive(Debug, Clone)]
pub struct MockElement {
    inner: Arc<Mutex<MockState>>,
}

impl MockElement {
    /// Create a fresh element with nothing loaded, at full volume
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                source: None,
                paused: true,
                position: Duration::ZERO,
                duration: None,
                volume: 1.0,
                playback_rate: 1.0,
                play_failures: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Queue an error for the next `play` call
    ///
    /// Failures are consumed in order; once the queue is empty, `play`
    /// succeeds again.
    pub fn fail_next_play(&self, error: MediaError) {
        self.inner.lock().unwrap().play_failures.push_back(error);
    }

    /// Simulate playback having advanced to `position`
    pub fn set_reported_position(&self, position: Duration) {
        self.inner.lock().unwrap().position = position;
    }

    /// Simulate the element learning (or losing) the stream duration
    pub fn set_reported_duration(&self, duration: Option<Duration>) {
        self.inner.lock().unwrap().duration = duration;
    }

    /// Force the paused flag, as if the platform paused or resumed on its own
    pub fn force_paused(&self, paused: bool) {
        self.inner.lock().unwrap().paused = paused;
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<ElementCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// URL of the most recent `load`
    pub fn last_loaded(&self) -> Option<String> {
        self.inner.lock().unwrap().source.clone()
    }

    /// Number of `play` calls so far, including failed ones
    pub fn play_count(&self) -> usize {
        self.count_calls(|call| matches!(call, ElementCall::Play))
    }

    /// Number of `load` calls so far
    pub fn load_count(&self) -> usize {
        self.count_calls(|call| matches!(call, ElementCall::Load(_)))
    }

    fn count_calls(&self, matches: impl Fn(&ElementCall) -> bool) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| matches(call))
            .count()
    }
}

impl Default for MockElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for MockElement {
    fn load(&mut self, url: &str) {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(ElementCall::Load(url.to_string()));
        state.source = Some(url.to_string());
        state.position = Duration::ZERO;
        state.duration = None;
        state.paused = true;
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(ElementCall::Play);
        if let Some(error) = state.play_failures.pop_front() {
            return Err(error);
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(ElementCall::Pause);
        state.paused = true;
    }

    fn position(&self) -> Duration {
        self.inner.lock().unwrap().position
    }

    fn set_position(&mut self, position: Duration) {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(ElementCall::Seek(position));
        state.position = position;
    }

    fn duration(&self) -> Option<Duration> {
        self.inner.lock().unwrap().duration
    }

    fn volume(&self) -> f32 {
        self.inner.lock().unwrap().volume
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(ElementCall::SetVolume(volume));
        state.volume = volume;
    }

    fn set_playback_rate(&mut self, rate: f32) {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(ElementCall::SetRate(rate));
        state.playback_rate = rate;
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }
}
