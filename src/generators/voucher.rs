//! Voucher generation (§4.3 "Voucher"): per-ante draw with resample when
//! the voucher is already active or its odd-indexed upgrade's even
//! predecessor isn't active yet.

use crate::items::{Category, Item};
use crate::rng;
use crate::state::RunState;
use crate::streams::StreamSet;
use crate::tables;

/// draws and activates ante `ante`'s voucher under `run`'s current state,
/// resampling on collision (bounded at 1000 iterations per §4.3/§7).
pub fn draw_voucher(streams: &mut StreamSet, run: &mut RunState, ante: u32) -> u8 {
    let base_key = format!("Voucher{ante}");
    let mut n = 0u32;
    loop {
        let stream = if n == 0 {
            streams.get(&base_key)
        } else {
            streams.resample(&base_key, n)
        };
        let v = rng::next_random_int(stream, 0, tables::VOUCHERS.len() as i32 - 1) as u8;
        let needs_predecessor = v % 2 == 1 && !run.is_voucher_active(v - 1);
        if run.is_voucher_active(v) || needs_predecessor {
            n += 1;
            assert!(n < 1000, "voucher resample loop exceeded bound: programming bug");
            continue;
        }
        run.activate_voucher(v);
        return v;
    }
}

pub fn as_item(ordinal: u8) -> Item {
    Item::new(Category::Voucher, ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn repeated_draw_for_same_ante_is_idempotent_with_fresh_state() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut streams = StreamSet::new(seed.as_bytes());
        let mut run = RunState::new();
        let v = draw_voucher(&mut streams, &mut run, 1);
        assert!(run.is_voucher_active(v));
    }

    #[test]
    fn odd_voucher_implies_even_predecessor_active() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut streams = StreamSet::new(seed.as_bytes());
        let mut run = RunState::new();
        for ante in 1..=6 {
            let v = draw_voucher(&mut streams, &mut run, ante);
            if v % 2 == 1 {
                assert!(run.is_voucher_active(v - 1));
            }
        }
    }
}
