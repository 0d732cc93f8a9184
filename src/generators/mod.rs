//! Item generators (C3): one function per category, sharing the five-step
//! contract of §4.3 (type draw, sub-item draw, edition, stickers, resample
//! on duplicate) through the small shared helpers in this module so there
//! is one source of truth for edition/sticker rolls regardless of category
//! (§9 "define the recurrence once ... specialize via monomorphization").

pub mod boss;
pub mod joker;
pub mod pack;
pub mod playing_card;
pub mod shop;
pub mod tag;
pub mod voucher;

use crate::items::{Edition, Stickers};
use crate::rng::{self, Stream};
use crate::Stake;

/// edition roll against fixed thresholds (§4.3 step 3). `rate` scales the
/// higher-tier thresholds (e.g. `MagicTrick`-style modifiers); default 1.0.
pub fn roll_edition(stream: &mut Stream, rate: f64) -> Edition {
    let r = rng::next_random(stream);
    if r > 0.997 {
        Edition::Negative
    } else if r > 1.0 - 0.006 * rate {
        Edition::Polychrome
    } else if r > 1.0 - 0.02 * rate {
        Edition::Holographic
    } else if r > 1.0 - 0.04 * rate {
        Edition::Foil
    } else {
        Edition::None
    }
}

/// sticker roll (§4.3 step 4): Eternal/Perishable at Black+, Rental at
/// Gold+, unless the item is on [`crate::tables::CANNOT_BE_ETERNAL`].
pub fn roll_stickers(stream: &mut Stream, stake: Stake, cannot_be_eternal: bool) -> Stickers {
    let mut stickers = Stickers::default();
    if stake.allows_eternal_perishable() {
        let r = rng::next_random(stream);
        if r > 0.7 {
            if !cannot_be_eternal {
                stickers.eternal = true;
            }
        } else if r > 0.4 {
            stickers.perishable = true;
        }
    }
    if stake.allows_rental() {
        let r = rng::next_random(stream);
        if r > 0.7 {
            stickers.rental = true;
        }
    }
    stickers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn stake_gates_sticker_kinds() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut stream = Stream::from_key(b"sti1", seed.as_bytes());
        let stickers = roll_stickers(&mut stream, Stake::White, false);
        assert!(!stickers.eternal && !stickers.perishable && !stickers.rental);
    }

    #[test]
    fn cannot_be_eternal_list_suppresses_eternal_not_perishable() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        // search for a seed/stream offset where the roll lands > 0.7 (eternal band)
        let mut found = false;
        for n in 0..200u32 {
            let key = format!("sti{n}");
            let mut probe = Stream::from_key(key.as_bytes(), seed.as_bytes());
            let r = rng::next_random(&mut probe);
            if r > 0.7 {
                let mut stream = Stream::from_key(key.as_bytes(), seed.as_bytes());
                let stickers = roll_stickers(&mut stream, Stake::Black, true);
                assert!(!stickers.eternal);
                found = true;
                break;
            }
        }
        assert!(found, "expected at least one probe to land in the eternal band");
    }
}
