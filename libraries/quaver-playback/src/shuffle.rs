//! Random track selection for shuffle playback
//!
//! Shuffle here is pick-on-demand: the queue keeps its insertion order and
//! each advance draws a random track, rather than reordering the queue up
//! front. The draw avoids repeating the current track whenever the queue
//! offers an alternative.

use crate::types::PlayableTrack;
use rand::{thread_rng, Rng};

/// Redraws before falling back to a linear scan for a different track
const MAX_RANDOM_RETRIES: usize = 8;

/// Pick a uniformly random track, avoiding the current id when possible
///
/// Draws up to [`MAX_RANDOM_RETRIES`] times; if every draw matched the
/// current id, scans for the first non-matching track. A queue whose every
/// entry matches the current id (single entry, or duplicates of it) yields
/// the first entry, so shuffle on a one-track queue replays that track.
pub fn pick_random_different<'a>(
    tracks: &'a [PlayableTrack],
    current_id: Option<&str>,
) -> Option<&'a PlayableTrack> {
    if tracks.is_empty() {
        return None;
    }
    if tracks.len() == 1 {
        return tracks.first();
    }

    let differs = |track: &PlayableTrack| current_id.map_or(true, |id| !track.is(id));

    let mut rng = thread_rng();
    for _ in 0..MAX_RANDOM_RETRIES {
        let candidate = &tracks[rng.gen_range(0..tracks.len())];
        if differs(candidate) {
            return Some(candidate);
        }
    }

    tracks.iter().find(|t| differs(t)).or_else(|| tracks.first())
}
