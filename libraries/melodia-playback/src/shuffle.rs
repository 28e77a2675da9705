//! Shuffle selection
//!
//! Shuffle is sampled at selection time rather than by permuting the queue.

use rand::Rng;

/// Pick a uniformly random index in `[0, len)` different from `current`
///
/// Resamples until the draw differs, so there is no guarantee of visiting
/// every index before repeating one. Returns `None` when no other index exists.
pub fn pick_other_index<R: Rng + ?Sized>(len: usize, current: usize, rng: &mut R) -> Option<usize> {
    if len < 2 {
        return None;
    }

    loop {
        let candidate = rng.gen_range(0..len);
        if candidate != current {
            return Some(candidate);
        }
    }
}
