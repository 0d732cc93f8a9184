//! Joker generation: rarity poll, pool index draw, duplicate resample,
//! Showman-aware legality check lives in [`crate::state`] (§4.3 steps 2+5).

use crate::generators::{roll_edition, roll_stickers};
use crate::items::{Category, Item};
use crate::rng::{self, Stream};
use crate::state::RunState;
use crate::streams::StreamSet;
use crate::tables::{self, Rarity};
use crate::Stake;

pub fn rarity_poll(stream: &mut Stream) -> Rarity {
    let r = rng::next_random(stream);
    if r > 0.95 {
        Rarity::Rare
    } else if r > 0.7 {
        Rarity::Uncommon
    } else {
        Rarity::Common
    }
}

fn pool_for(rarity: Rarity) -> &'static [&'static str] {
    match rarity {
        Rarity::Common => tables::COMMON_JOKERS,
        Rarity::Uncommon => tables::UNCOMMON_JOKERS,
        Rarity::Rare => tables::RARE_JOKERS,
        Rarity::Legendary => tables::LEGENDARY_JOKERS,
    }
}

/// Draws the next joker for `stream_base` (e.g. `"Joker1shop2"`), handling
/// duplicate resample (pack/shop contexts that track ownership) and
/// Showman. `edition_rate` is the effective edition-rate multiplier for
/// this context (e.g. from an active voucher).
pub fn draw_joker(
    streams: &mut StreamSet,
    run: &mut RunState,
    stream_base: &str,
    stake: Stake,
    edition_rate: f64,
    forced_rarity: Option<Rarity>,
) -> Item {
    let rarity_key = format!("{stream_base}rarity");
    let rarity = match forced_rarity {
        Some(r) => r,
        None => rarity_poll(streams.get(&rarity_key)),
    };
    let pool = pool_for(rarity);

    let mut n = 0u32;
    let mut local = draw_pool_index(streams, stream_base, pool, n);
    let mut global = tables::joker_global_ordinal(rarity, local);
    while !run.can_obtain_joker(Category::Joker, global) {
        n += 1;
        assert!(n < 1000, "resample loop exceeded bound: programming bug");
        local = draw_pool_index(streams, stream_base, pool, n);
        global = tables::joker_global_ordinal(rarity, local);
    }

    let edition_key = format!("{stream_base}edi");
    let edition = roll_edition(streams.get(&edition_key), edition_rate);
    let cannot_be_eternal = tables::CANNOT_BE_ETERNAL.contains(&pool[local as usize]);
    let sticker_key = format!("{stream_base}sti");
    let stickers = roll_stickers(streams.get(&sticker_key), stake, cannot_be_eternal);

    let item = Item::new(Category::Joker, global)
        .with_edition(edition)
        .with_stickers(stickers);
    run.add_owned_joker(item);
    item
}

fn draw_pool_index(streams: &mut StreamSet, stream_base: &str, pool: &[&str], n: u32) -> u8 {
    let stream = if n == 0 {
        streams.get(stream_base)
    } else {
        streams.resample(stream_base, n)
    };
    rng::next_random_int(stream, 0, pool.len() as i32 - 1) as u8
}

/// draws one legendary joker from the dedicated soul-joker stream of `ante`
/// (§4.3 "Soul").
pub fn draw_soul_joker(streams: &mut StreamSet, ante: u32) -> Item {
    let key = format!("sou{ante}");
    let local =
        rng::next_random_int(streams.get(&key), 0, tables::SOUL_JOKERS.len() as i32 - 1) as u8;
    let global = tables::joker_global_ordinal(Rarity::Legendary, local);
    Item::new(Category::Joker, global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn duplicate_joker_triggers_resample_without_showman() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut streams = StreamSet::new(seed.as_bytes());
        let mut run = RunState::new();

        let first = draw_joker(
            &mut streams,
            &mut run,
            "Joker1shop2",
            Stake::White,
            1.0,
            Some(Rarity::Common),
        );
        // force a duplicate draw of the same pool deterministically by
        // re-adding the same item to owned jokers and redrawing through a
        // fresh stream seeded identically, which must land on a different
        // ordinal than `first` once resampled.
        let mut run2 = RunState::new();
        run2.add_owned_joker(first);
        let mut streams2 = StreamSet::new(seed.as_bytes());
        // Pre-consume the base draw the same way draw_joker would, so the
        // resample path is exercised deterministically.
        let second = draw_joker(
            &mut streams2,
            &mut run2,
            "Joker1shop2",
            Stake::White,
            1.0,
            Some(Rarity::Common),
        );
        assert_ne!(second.ordinal(), first.ordinal());
    }

    #[test]
    fn showman_allows_exact_duplicate() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut streams = StreamSet::new(seed.as_bytes());
        let mut run = RunState::new();
        run.activate_showman();
        let first = draw_joker(
            &mut streams,
            &mut run,
            "Joker1shop2",
            Stake::White,
            1.0,
            Some(Rarity::Common),
        );
        let mut run2 = RunState::new();
        run2.activate_showman();
        run2.add_owned_joker(first);
        let mut streams2 = StreamSet::new(seed.as_bytes());
        let second = draw_joker(
            &mut streams2,
            &mut run2,
            "Joker1shop2",
            Stake::White,
            1.0,
            Some(Rarity::Common),
        );
        assert_eq!(second.ordinal(), first.ordinal());
    }
}
