//! Clause compilation: cost-heuristic ordering of the three clause lists so
//! the cheapest-to-disprove clause runs first (§4.6 "order clauses by
//! ascending cost so an early MUST failure short-circuits the rest").

use crate::config::{Clause, ClauseType, ClauseValue, FilterConfig};
use crate::tables::{self, Rarity};
use crate::{Deck, Stake};

#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub deck: Deck,
    pub stake: Stake,
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

/// relative evaluation cost per clause kind/value. Soul jokers and
/// legendary lookups resolve from a single dedicated stream; voucher and
/// tag checks need one per-ante stream each; playing cards are the most
/// expensive since matching one means generating and inspecting every
/// candidate in the relevant shop/pack slots.
fn cost(clause: &Clause) -> u32 {
    match clause.kind {
        ClauseType::SoulJoker => 1,
        ClauseType::Joker => match clause.value {
            ClauseValue::AnyLegendary => 2,
            ClauseValue::AnyRare => 8,
            ClauseValue::Named(o) => match tables::joker_rarity_of_global(o) {
                Rarity::Legendary => 2,
                Rarity::Rare => 8,
                Rarity::Uncommon | Rarity::Common => 18,
            },
            _ => 18,
        },
        ClauseType::Voucher => 3,
        ClauseType::Boss => 4,
        ClauseType::SmallBlindTag | ClauseType::BigBlindTag => 6,
        ClauseType::TarotCard | ClauseType::PlanetCard | ClauseType::SpectralCard => 11,
        ClauseType::PlayingCard => 30,
    }
}

fn ordered(mut clauses: Vec<Clause>) -> Vec<Clause> {
    clauses.sort_by_key(cost);
    clauses
}

pub fn compile(cfg: FilterConfig) -> CompiledFilter {
    CompiledFilter {
        deck: cfg.deck,
        stake: cfg.stake,
        must: ordered(cfg.must),
        should: ordered(cfg.should),
        must_not: ordered(cfg.must_not),
    }
}
