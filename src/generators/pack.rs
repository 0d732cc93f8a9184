//! Booster pack opening (§4.3 "Soul" + pack-content generation). A pack
//! yields a fixed-size [`ItemSet`]; Arcana/Spectral packs may produce a
//! Soul slot, which the filter evaluator (C6) later decides whether to
//! consume via [`crate::state::RunState::mark_soul_pack_consumed`].
//!
//! Soul/BlackHole are represented as sentinel ordinals one and two past the
//! end of the Tarot/Spectral tables respectively, rather than a separate
//! enum variant, so `Item`'s bitfields stay uniform across categories.

use crate::generators::joker::draw_joker;
use crate::generators::playing_card::draw_playing_card;
use crate::generators::roll_edition;
use crate::items::{Category, Item, ItemSet};
use crate::rng;
use crate::state::RunState;
use crate::streams::StreamSet;
use crate::tables;
use crate::Stake;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackKind {
    Arcana,
    Celestial,
    Spectral,
    Buffoon,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackSize {
    Normal,
    Jumbo,
    Mega,
}

impl PackSize {
    pub fn slot_count(self) -> usize {
        match self {
            PackSize::Normal => 3,
            PackSize::Jumbo => 5,
            PackSize::Mega => 5,
        }
    }
}

pub const TAROT_SOUL_ORDINAL: u8 = tables::TAROTS.len() as u8;
pub const SPECTRAL_SOUL_ORDINAL: u8 = tables::SPECTRALS.len() as u8;
pub const SPECTRAL_BLACK_HOLE_ORDINAL: u8 = tables::SPECTRALS.len() as u8 + 1;

pub fn is_soul(item: &Item) -> bool {
    match item.category() {
        Category::Tarot => item.ordinal() == TAROT_SOUL_ORDINAL,
        Category::Spectral => item.ordinal() == SPECTRAL_SOUL_ORDINAL,
        _ => false,
    }
}

/// opens a pack of `kind`/`size` at (`ante`, `pack_slot`), returning its
/// contents. `run` is consulted only for Showman/ownership during Buffoon
/// packs; Soul-consumption bookkeeping is left to the caller.
pub fn open_pack(
    streams: &mut StreamSet,
    run: &mut RunState,
    ante: u32,
    pack_slot: u32,
    kind: PackKind,
    size: PackSize,
    stake: Stake,
) -> ItemSet {
    let mut set = ItemSet::new();
    let slots = size.slot_count();
    let mut soul_found = false;
    for i in 0..slots {
        let item = match kind {
            PackKind::Arcana => draw_arcana_slot(streams, ante, pack_slot, i, &mut soul_found),
            PackKind::Celestial => draw_celestial_slot(streams, ante, pack_slot, i),
            PackKind::Spectral => draw_spectral_slot(streams, ante, pack_slot, i, &mut soul_found),
            PackKind::Buffoon => {
                let base = format!("buf{ante}_{pack_slot}_{i}");
                draw_joker(streams, run, &base, stake, 1.0, None)
            }
            PackKind::Standard => {
                let key = format!("sta{ante}_{pack_slot}_{i}");
                draw_playing_card(streams.get(&key), 1.0)
            }
        };
        let dedup = dedupe_into_set(streams, &mut set, item, kind, ante, pack_slot, i);
        set.append(dedup);
    }
    set
}

/// resample-on-duplicate (§4.3 step 5): if `item` collides with something
/// already in `set`, redraw from the pool's n-th resample stream, copying
/// the original draw's edition/stickers onto the resampled item (§9 OQ4
/// decision: copy, not reroll).
fn dedupe_into_set(
    streams: &mut StreamSet,
    set: &ItemSet,
    item: Item,
    kind: PackKind,
    ante: u32,
    pack_slot: u32,
    slot: usize,
) -> Item {
    if !set.contains_same_base(item.category(), item.ordinal()) {
        return item;
    }
    // Buffoon/Standard packs dedupe through their own generator's resample
    // chain (handled inside draw_joker); only Arcana/Celestial/Spectral
    // consumable draws need dedup here, since their draw functions above
    // are simple index rolls with no resample awareness of their own.
    if matches!(kind, PackKind::Buffoon | PackKind::Standard) {
        return item;
    }
    let base = format!("pack{ante}_{pack_slot}_{slot}");
    let mut n = 1u32;
    let pool_len = match kind {
        PackKind::Arcana => tables::TAROTS.len(),
        PackKind::Celestial => tables::PLANETS.len(),
        PackKind::Spectral => tables::SPECTRALS.len(),
        _ => unreachable!(),
    };
    loop {
        let ordinal = rng::next_random_int(streams.resample(&base, n), 0, pool_len as i32 - 1) as u8;
        let candidate = Item::new(item.category(), ordinal)
            .with_edition(item.edition())
            .with_stickers(item.stickers());
        if !set.contains_same_base(candidate.category(), candidate.ordinal()) {
            return candidate;
        }
        n += 1;
        assert!(n < 1000, "pack resample loop exceeded bound: programming bug");
    }
}

fn draw_arcana_slot(
    streams: &mut StreamSet,
    ante: u32,
    pack_slot: u32,
    slot: usize,
    soul_found: &mut bool,
) -> Item {
    let soul_key = format!("ar1{ante}_{pack_slot}_{slot}soul");
    if !*soul_found {
        let roll = rng::next_random(streams.get(&soul_key));
        if roll > 0.997 {
            *soul_found = true;
            return Item::new(Category::Tarot, TAROT_SOUL_ORDINAL);
        }
    }
    let key = format!("ar1{ante}_{pack_slot}_{slot}");
    let ordinal = rng::next_random_int(streams.get(&key), 0, tables::TAROTS.len() as i32 - 1) as u8;
    Item::new(Category::Tarot, ordinal)
}

fn draw_celestial_slot(streams: &mut StreamSet, ante: u32, pack_slot: u32, slot: usize) -> Item {
    let key = format!("pl1{ante}_{pack_slot}_{slot}");
    let ordinal = rng::next_random_int(streams.get(&key), 0, tables::PLANETS.len() as i32 - 1) as u8;
    Item::new(Category::Planet, ordinal)
}

fn draw_spectral_slot(
    streams: &mut StreamSet,
    ante: u32,
    pack_slot: u32,
    slot: usize,
    soul_found: &mut bool,
) -> Item {
    // roll Soul first, then Black Hole, then normal spectral (§4.3).
    let soul_key = format!("spe{ante}_{pack_slot}_{slot}soul");
    if !*soul_found {
        let roll = rng::next_random(streams.get(&soul_key));
        if roll > 0.997 {
            *soul_found = true;
            return Item::new(Category::Spectral, SPECTRAL_SOUL_ORDINAL);
        }
    }
    let bh_key = format!("spe{ante}_{pack_slot}_{slot}bh");
    let roll = rng::next_random(streams.get(&bh_key));
    if roll > 0.997 {
        return Item::new(Category::Spectral, SPECTRAL_BLACK_HOLE_ORDINAL);
    }
    let key = format!("spe{ante}_{pack_slot}_{slot}");
    let ordinal =
        rng::next_random_int(streams.get(&key), 0, tables::SPECTRALS.len() as i32 - 1) as u8;
    let edi_key = format!("{key}edi");
    Item::new(Category::Spectral, ordinal).with_edition(roll_edition(streams.get(&edi_key), 1.0))
}
