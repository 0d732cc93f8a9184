//! Boss selection (§4.3 "Boss"): filter the 28-entry list to unlocked
//! entries of the ante's kind, refilling the pool if exhausted, pick
//! uniformly, and lock the choice.
//!
//! §8 scenario 3 requires driving this from a *single* stream created once
//! at seed start and stepped ante-by-ante, not recreated per ante — callers
//! must reuse the same `Stream` across calls to [`draw_boss`].

use crate::rng;
use crate::rng::Stream;
use crate::state::{self, RunState};

pub fn boss_stream_key() -> &'static str {
    "boss"
}

/// draws and locks the boss for `ante`, given the single long-lived boss
/// stream and the run's boss-lock state.
pub fn draw_boss(stream: &mut Stream, run: &mut RunState, ante: u32) -> usize {
    let mut kind = state::boss_kind_indices(ante);
    if run.is_boss_pool_exhausted(kind.iter().copied()) {
        run.reset_boss_pool(kind.iter().copied());
    }
    kind.retain(|&idx| !run.is_boss_locked(idx));
    debug_assert!(!kind.is_empty());
    let pick = rng::next_random_int(stream, 0, kind.len() as i32 - 1) as usize;
    let boss_index = kind[pick];
    run.lock_boss(boss_index);
    boss_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn single_stream_stepped_across_antes_is_deterministic() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut stream = Stream::from_key(boss_stream_key().as_bytes(), seed.as_bytes());
        let mut run = RunState::new();
        let sequence_a: Vec<usize> = (1..=8).map(|ante| draw_boss(&mut stream, &mut run, ante)).collect();

        let mut stream_b = Stream::from_key(boss_stream_key().as_bytes(), seed.as_bytes());
        let mut run_b = RunState::new();
        let sequence_b: Vec<usize> = (1..=8)
            .map(|ante| draw_boss(&mut stream_b, &mut run_b, ante))
            .collect();

        assert_eq!(sequence_a, sequence_b);
    }

    #[test]
    fn pool_exhaustion_resets_and_covers_full_kind() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut stream = Stream::from_key(boss_stream_key().as_bytes(), seed.as_bytes());
        let mut run = RunState::new();
        let kind = crate::state::boss_kind_indices(1); // regular, 23 entries
        let mut seen = std::collections::HashSet::new();
        for _ in 0..kind.len() {
            seen.insert(draw_boss(&mut stream, &mut run, 1));
        }
        assert_eq!(seen.len(), kind.len(), "every regular boss seen once before any repeat");
    }
}
