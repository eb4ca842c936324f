//! Insertion-ordered playback queue
//!
//! A flat, ordered list of tracks. Order is insertion order; duplicate ids
//! are allowed and never deduplicated. Advance policy (what plays next)
//! lives in the manager; the queue only stores and indexes.

use crate::types::PlayableTrack;
use std::time::Duration;

/// The ordered list of tracks available for playback
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<PlayableTrack>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire queue contents.
    pub fn replace(&mut self, tracks: Vec<PlayableTrack>) {
        self.tracks = tracks;
    }

    /// Append a track at the end.
    pub fn push(&mut self, track: PlayableTrack) {
        self.tracks.push(track);
    }

    /// Remove the track at `index`. Out of range returns `None`.
    pub fn remove(&mut self, index: usize) -> Option<PlayableTrack> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }

    /// Remove all tracks.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn get(&self, index: usize) -> Option<&PlayableTrack> {
        self.tracks.get(index)
    }

    /// Position of the first track with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.is(id))
    }

    pub fn tracks(&self) -> &[PlayableTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sum of declared track durations. Unknown durations count as zero,
    /// so the total is a lower bound when metadata is incomplete.
    pub fn total_duration(&self) -> Duration {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}
