//! Scalar verification (§4.6): the per-seed authoritative walk that
//! generates vouchers, tags, the boss, and shop/pack contents ante by ante,
//! then counts how many times each compiled clause matches.
//!
//! [`vector_prefilter_batch`] runs a `LANES`-wide cheap pass over a whole
//! lane chunk at once — voucher/tag/boss draws only, since those never need
//! shop/pack generation — and returns a [`LaneMask`] of which seeds survive,
//! so a chunk that fails a cheap MUST clause never pays for shop/pack
//! generation in the first place. Any clause that needs shop or pack
//! contents is fail-open here per §4.6's "a clause the vector stage cannot
//! prove must default to true, never false".

use crate::config::{CardMatch, Clause, ClauseType, ClauseValue, Sources};
use crate::filter::compile::CompiledFilter;
use crate::generators::pack::{self, PackKind, PackSize};
use crate::generators::{boss, joker, shop, tag, voucher};
use crate::items::{Category, Item, ItemSet};
use crate::lanes::LaneMask;
use crate::pseudohash::PartialHashCache;
use crate::rng::Stream;
use crate::seed::Seed;
use crate::state::RunState;
use crate::streams::StreamSet;
use crate::tables::{self, Rarity};
use crate::{Deck, Stake, LANES};

const SHOP_SLOTS_DEFAULT: u32 = 2;
const PACK_SLOTS_DEFAULT: u32 = 1;
const PACK_KIND_CYCLE: [PackKind; 3] = [PackKind::Arcana, PackKind::Celestial, PackKind::Spectral];

struct PackRecord {
    slot: u32,
    size: PackSize,
    items: ItemSet,
}

struct AnteRecord {
    voucher: Item,
    small_tag: Item,
    big_tag: Item,
    boss: Item,
    shop: Vec<Item>,
    packs: Vec<PackRecord>,
    /// (pack_slot, legendary joker) pairs, one per Soul resolved this ante —
    /// the slot is kept so a clause's `packSlots` restriction can pin which
    /// physical pack it must come from (§8 scenario 5).
    soul_jokers: Vec<(u32, Item)>,
}

fn shop_slot_bound(clauses: &[&Clause], ante: u32) -> u32 {
    let mut bound = SHOP_SLOTS_DEFAULT - 1;
    for clause in clauses {
        if !clause.antes.contains(&ante) {
            continue;
        }
        if let Some(slots) = &clause.sources.shop_slots {
            if let Some(&max) = slots.iter().max() {
                bound = bound.max(max);
            }
        }
    }
    bound
}

fn pack_slot_bound(clauses: &[&Clause], ante: u32) -> u32 {
    let mut bound = PACK_SLOTS_DEFAULT - 1;
    for clause in clauses {
        if !clause.antes.contains(&ante) {
            continue;
        }
        if let Some(slots) = &clause.sources.pack_slots {
            if let Some(&max) = slots.iter().max() {
                bound = bound.max(max);
            }
        }
    }
    bound
}

fn pack_requires_mega(clauses: &[&Clause], ante: u32, slot: u32) -> bool {
    clauses.iter().any(|clause| {
        clause.antes.contains(&ante)
            && clause.sources.require_mega
            && clause
                .sources
                .pack_slots
                .as_ref()
                .map_or(false, |s| s.contains(&slot))
    })
}

fn build_ante_record(
    streams: &mut StreamSet,
    boss_stream: &mut Stream,
    run: &mut RunState,
    ante: u32,
    deck: Deck,
    stake: Stake,
    clauses: &[&Clause],
    include_shop_and_packs: bool,
) -> AnteRecord {
    let v = voucher::draw_voucher(streams, run, ante);
    let tags = tag::draw_tag_pair(streams, ante);
    let boss_idx = boss::draw_boss(boss_stream, run, ante);

    let mut shop = Vec::new();
    let mut packs = Vec::new();
    let mut soul_jokers = Vec::new();

    if include_shop_and_packs {
        let shop_bound = shop_slot_bound(clauses, ante);
        for slot in 0..=shop_bound {
            shop.push(shop::draw_shop_item(streams, run, ante, slot, deck, stake));
        }

        let pack_bound = pack_slot_bound(clauses, ante);
        for slot in 0..=pack_bound {
            let kind = PACK_KIND_CYCLE[(slot as usize) % PACK_KIND_CYCLE.len()];
            let size = if pack_requires_mega(clauses, ante, slot) {
                PackSize::Mega
            } else {
                PackSize::Normal
            };
            let items = pack::open_pack(streams, run, ante, slot, kind, size, stake);
            for item in items.iter() {
                if pack::is_soul(item) && run.mark_soul_pack_consumed(ante, slot) {
                    soul_jokers.push((slot, joker::draw_soul_joker(streams, ante)));
                }
            }
            packs.push(PackRecord { slot, size, items });
        }
    }

    AnteRecord {
        voucher: voucher::as_item(v),
        small_tag: tag::as_item(tags.small_blind),
        big_tag: tag::as_item(tags.big_blind),
        boss: Item::new(Category::Boss, boss_idx as u8),
        shop,
        packs,
        soul_jokers,
    }
}

fn expected_category(kind: ClauseType) -> Category {
    match kind {
        ClauseType::Joker | ClauseType::SoulJoker => Category::Joker,
        ClauseType::TarotCard => Category::Tarot,
        ClauseType::PlanetCard => Category::Planet,
        ClauseType::SpectralCard => Category::Spectral,
        ClauseType::SmallBlindTag | ClauseType::BigBlindTag => Category::Tag,
        ClauseType::Voucher => Category::Voucher,
        ClauseType::PlayingCard => Category::PlayingCard,
        ClauseType::Boss => Category::Boss,
    }
}

fn value_matches(value: ClauseValue, item: &Item) -> bool {
    match value {
        ClauseValue::Any | ClauseValue::AnyJoker => true,
        ClauseValue::Named(o) => item.ordinal() == o,
        ClauseValue::AnyCommon => tables::joker_rarity_of_global(item.ordinal()) == Rarity::Common,
        ClauseValue::AnyUncommon => tables::joker_rarity_of_global(item.ordinal()) == Rarity::Uncommon,
        ClauseValue::AnyRare => tables::joker_rarity_of_global(item.ordinal()) == Rarity::Rare,
        ClauseValue::AnyLegendary => tables::joker_rarity_of_global(item.ordinal()) == Rarity::Legendary,
    }
}

fn card_match(card_match: &CardMatch, item: &Item) -> bool {
    if let Some(edition) = card_match.edition {
        if item.edition() != edition {
            return false;
        }
    }
    if let Some(required) = card_match.stickers {
        let have = item.stickers();
        if required.eternal && !have.eternal {
            return false;
        }
        if required.perishable && !have.perishable {
            return false;
        }
        if required.rental && !have.rental {
            return false;
        }
    }
    if let Some(suit) = card_match.suit {
        if item.suit() != suit {
            return false;
        }
    }
    if let Some(rank) = card_match.rank {
        if item.rank() != rank {
            return false;
        }
    }
    if let Some(enhancement) = card_match.enhancement {
        if item.enhancement() != enhancement {
            return false;
        }
    }
    if let Some(seal) = card_match.seal {
        if item.seal() != seal {
            return false;
        }
    }
    true
}

fn item_matches(clause: &Clause, item: &Item) -> bool {
    item.category() == expected_category(clause.kind)
        && value_matches(clause.value, item)
        && card_match(&clause.card_match, item)
}

/// candidate items a clause may draw from, honoring `sources` slot
/// restriction when present (§6 "sources narrows which slots count").
fn candidates<'a>(clause: &Clause, record: &'a AnteRecord) -> Vec<&'a Item> {
    match clause.kind {
        ClauseType::Voucher => vec![&record.voucher],
        ClauseType::SmallBlindTag => vec![&record.small_tag],
        ClauseType::BigBlindTag => vec![&record.big_tag],
        ClauseType::Boss => vec![&record.boss],
        ClauseType::SoulJoker => record
            .soul_jokers
            .iter()
            .filter(|(slot, _)| pack_slot_allowed(&clause.sources, *slot))
            .map(|(_, item)| item)
            .collect(),
        ClauseType::Joker => {
            let mut out: Vec<&Item> = Vec::new();
            if sources_allow_shop(&clause.sources) {
                out.extend(shop_slots(&clause.sources, &record.shop));
            }
            if sources_allow_packs(&clause.sources) {
                for pack in &record.packs {
                    if pack_slot_allowed(&clause.sources, pack.slot)
                        && (!clause.sources.require_mega || pack.size == PackSize::Mega)
                    {
                        out.extend(pack.items.iter());
                    }
                }
                out.extend(
                    record
                        .soul_jokers
                        .iter()
                        .filter(|(slot, _)| pack_slot_allowed(&clause.sources, *slot))
                        .map(|(_, item)| item),
                );
            }
            out
        }
        ClauseType::TarotCard | ClauseType::PlanetCard | ClauseType::SpectralCard | ClauseType::PlayingCard => {
            let mut out: Vec<&Item> = Vec::new();
            if sources_allow_shop(&clause.sources) {
                out.extend(shop_slots(&clause.sources, &record.shop));
            }
            if sources_allow_packs(&clause.sources) {
                for pack in &record.packs {
                    if pack_slot_allowed(&clause.sources, pack.slot)
                        && (!clause.sources.require_mega || pack.size == PackSize::Mega)
                    {
                        out.extend(pack.items.iter());
                    }
                }
            }
            out
        }
    }
}

/// `sources.tags` restricts a clause to items granted directly by a blind
/// tag; this engine doesn't generate tag-granted jokers/consumables/cards
/// (only the tag's own identity, matched via `SmallBlindTag`/`BigBlindTag`
/// clauses), so such a restriction is honored by excluding the shop and
/// pack candidates it would otherwise draw from, rather than silently
/// ignoring it.
fn sources_allow_shop(sources: &Sources) -> bool {
    !sources.tags.unwrap_or(false) && (sources.pack_slots.is_none() || sources.shop_slots.is_some())
}

fn sources_allow_packs(sources: &Sources) -> bool {
    !sources.tags.unwrap_or(false) && (sources.shop_slots.is_none() || sources.pack_slots.is_some())
}

fn shop_slots<'a>(sources: &Sources, shop: &'a [Item]) -> Vec<&'a Item> {
    match &sources.shop_slots {
        Some(slots) => slots
            .iter()
            .filter_map(|&s| shop.get(s as usize))
            .collect(),
        None => shop.iter().collect(),
    }
}

fn pack_slot_allowed(sources: &Sources, slot: u32) -> bool {
    match &sources.pack_slots {
        Some(slots) => slots.contains(&slot),
        None => true,
    }
}

fn occurrences(clause: &Clause, records: &[(u32, AnteRecord)]) -> u32 {
    records
        .iter()
        .filter(|(ante, _)| clause.antes.contains(ante))
        .map(|(_, record)| {
            candidates(clause, record)
                .into_iter()
                .filter(|item| item_matches(clause, item))
                .count() as u32
        })
        .sum()
}

fn max_ante(clauses: &[&Clause]) -> u32 {
    clauses
        .iter()
        .flat_map(|c| c.antes.iter().copied())
        .max()
        .unwrap_or(1)
}

fn walk(
    filter: &CompiledFilter,
    seed: &Seed,
    include_shop_and_packs: bool,
) -> Vec<(u32, AnteRecord)> {
    let all_clauses: Vec<&Clause> = filter
        .must
        .iter()
        .chain(filter.should.iter())
        .chain(filter.must_not.iter())
        .collect();
    let top = max_ante(&all_clauses);

    let mut streams = StreamSet::new(seed.as_bytes());
    let mut run = RunState::new();
    let mut boss_stream = Stream::from_key(boss::boss_stream_key().as_bytes(), seed.as_bytes());

    (1..=top)
        .map(|ante| {
            let record = build_ante_record(
                &mut streams,
                &mut boss_stream,
                &mut run,
                ante,
                filter.deck,
                filter.stake,
                &all_clauses,
                include_shop_and_packs,
            );
            (ante, record)
        })
        .collect()
}

fn cheap_clause(clause: &Clause) -> bool {
    matches!(
        clause.kind,
        ClauseType::Voucher | ClauseType::SmallBlindTag | ClauseType::BigBlindTag | ClauseType::Boss
    )
}

struct CheapAnteRecord {
    voucher: Item,
    small_tag: Item,
    big_tag: Item,
    boss: Item,
}

fn cheap_candidate<'a>(clause: &Clause, record: &'a CheapAnteRecord) -> &'a Item {
    match clause.kind {
        ClauseType::Voucher => &record.voucher,
        ClauseType::SmallBlindTag => &record.small_tag,
        ClauseType::BigBlindTag => &record.big_tag,
        ClauseType::Boss => &record.boss,
        _ => unreachable!("cheap_candidate is only called for cheap_clause() clauses"),
    }
}

/// cheap rejection pass, `LANES`-wide (§9 "vector prefilter runs over a
/// W-wide batch; returns a W-bit survival mask"): only voucher/tag/boss MUST
/// and MUST-NOT clauses are checked, since those never need shop/pack
/// generation. Any clause that does need it is treated as passing
/// (fail-open) by simply never being consulted here.
///
/// The pseudohash tail for every ante's `Voucher{ante}`/`Tag{ante}`/`"boss"`
/// stream keys is computed once per batch across all lanes via
/// [`PartialHashCache`], rather than once per seed per key, and a lane is
/// dropped from the mask (and skipped for the rest of the walk) the moment
/// it trips a MUST-NOT clause. `seeds` may hold fewer than [`LANES`] seeds
/// (the final chunk of a batch); lanes beyond `seeds.len()` are never set.
pub fn vector_prefilter_batch(filter: &CompiledFilter, seeds: &[Seed]) -> LaneMask {
    let mut mask = LaneMask::from_fn(|lane| lane < seeds.len());
    if seeds.is_empty() {
        return mask;
    }
    debug_assert!(seeds.len() <= LANES);

    let must: Vec<&Clause> = filter.must.iter().filter(|c| cheap_clause(c)).collect();
    let must_not: Vec<&Clause> = filter.must_not.iter().filter(|c| cheap_clause(c)).collect();
    if must.is_empty() && must_not.is_empty() {
        return mask;
    }
    let all_cheap: Vec<&Clause> = must.iter().chain(must_not.iter()).copied().collect();
    let top = max_ante(&all_cheap);

    let filler = seeds[0].as_bytes();
    let mut padded: [&[u8]; LANES] = [filler; LANES];
    for (lane, seed) in seeds.iter().enumerate() {
        padded[lane] = seed.as_bytes();
    }

    let mut cache = PartialHashCache::new();
    cache.precompute(boss::boss_stream_key().len(), &padded);
    for ante in 1..=top {
        cache.precompute(format!("Voucher{ante}").len(), &padded);
        cache.precompute(format!("Tag{ante}").len(), &padded);
    }

    let mut runs: Vec<RunState> = (0..seeds.len()).map(|_| RunState::new()).collect();
    let mut streams: Vec<StreamSet> = seeds.iter().map(|s| StreamSet::new(s.as_bytes())).collect();
    let mut boss_streams: Vec<Stream> = (0..seeds.len())
        .map(|lane| {
            let initial = cache
                .finish(boss::boss_stream_key().as_bytes(), lane)
                .expect("boss key length was precomputed above");
            Stream::from_initial(initial)
        })
        .collect();

    let mut must_hits = vec![vec![0u32; must.len()]; seeds.len()];
    let mut must_not_hits = vec![vec![0u32; must_not.len()]; seeds.len()];

    for ante in 1..=top {
        if mask.is_all_zero() {
            break;
        }
        let voucher_key = format!("Voucher{ante}");
        let tag_key = format!("Tag{ante}");
        for lane in 0..seeds.len() {
            if !mask.get(lane) {
                continue;
            }
            if let Some(initial) = cache.finish(voucher_key.as_bytes(), lane) {
                streams[lane].insert(&voucher_key, Stream::from_initial(initial));
            }
            if let Some(initial) = cache.finish(tag_key.as_bytes(), lane) {
                streams[lane].insert(&tag_key, Stream::from_initial(initial));
            }

            let v = voucher::draw_voucher(&mut streams[lane], &mut runs[lane], ante);
            let tags = tag::draw_tag_pair(&mut streams[lane], ante);
            let boss_idx = boss::draw_boss(&mut boss_streams[lane], &mut runs[lane], ante);

            let record = CheapAnteRecord {
                voucher: voucher::as_item(v),
                small_tag: tag::as_item(tags.small_blind),
                big_tag: tag::as_item(tags.big_blind),
                boss: Item::new(Category::Boss, boss_idx as u8),
            };

            for (i, clause) in must.iter().enumerate() {
                if clause.antes.contains(&ante) && item_matches(clause, cheap_candidate(clause, &record)) {
                    must_hits[lane][i] += 1;
                }
            }
            for (i, clause) in must_not.iter().enumerate() {
                if clause.antes.contains(&ante) && item_matches(clause, cheap_candidate(clause, &record)) {
                    must_not_hits[lane][i] += 1;
                    if must_not_hits[lane][i] >= clause.min.unwrap_or(1) {
                        mask.set(lane, false);
                    }
                }
            }
        }
    }

    for lane in 0..seeds.len() {
        if !mask.get(lane) {
            continue;
        }
        for (i, clause) in must.iter().enumerate() {
            if must_hits[lane][i] < clause.min.unwrap_or(1) {
                mask.set(lane, false);
                break;
            }
        }
    }

    mask
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub seed: Seed,
    pub score: i32,
}

/// authoritative scalar evaluation: `None` if the seed fails any MUST or
/// MUST-NOT clause, otherwise `Some` with the summed SHOULD score (§4.6,
/// §8 "base score 1 for a passing seed if its SHOULD list is the duplicated
/// MUST list").
pub fn evaluate_seed(filter: &CompiledFilter, seed: Seed) -> Option<MatchOutcome> {
    let records = walk(filter, &seed, true);

    for clause in &filter.must {
        if occurrences(clause, &records) < clause.min.unwrap_or(1) {
            return None;
        }
    }
    for clause in &filter.must_not {
        if occurrences(clause, &records) >= clause.min.unwrap_or(1) {
            return None;
        }
    }

    let mut score = 0i32;
    for clause in &filter.should {
        let count = occurrences(clause, &records);
        if count >= clause.min.unwrap_or(1) {
            score += clause.score;
        }
    }

    Some(MatchOutcome { seed, score })
}
