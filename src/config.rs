//! Declarative filter configuration (§6): raw JSON shape, strict
//! validation, and compilation into the immutable form the hot loop
//! consumes with zero string work (§3 "Clauses are preprocessed").

use crate::items::{Edition, Enhancement, Rank, Seal, Stickers, Suit};
use crate::tables;
use crate::{Deck, Stake};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseType {
    Joker,
    #[serde(rename = "souljoker")]
    SoulJoker,
    #[serde(rename = "tarotcard")]
    TarotCard,
    #[serde(rename = "planetcard")]
    PlanetCard,
    #[serde(rename = "spectralcard")]
    SpectralCard,
    #[serde(rename = "smallblindtag")]
    SmallBlindTag,
    #[serde(rename = "bigblindtag")]
    BigBlindTag,
    Voucher,
    #[serde(rename = "playingcard")]
    PlayingCard,
    Boss,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSources {
    #[serde(rename = "shopSlots")]
    pub shop_slots: Option<Vec<u32>>,
    #[serde(rename = "packSlots")]
    pub pack_slots: Option<Vec<u32>>,
    pub tags: Option<bool>,
    #[serde(rename = "requireMega")]
    pub require_mega: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawClause {
    #[serde(rename = "type")]
    pub kind: ClauseType,
    pub value: Option<String>,
    pub antes: Vec<u32>,
    #[serde(default = "default_score")]
    pub score: i32,
    pub min: Option<u32>,
    pub edition: Option<String>,
    pub stickers: Option<Vec<String>>,
    pub suit: Option<String>,
    pub rank: Option<String>,
    pub enhancement: Option<String>,
    pub seal: Option<String>,
    #[serde(default)]
    pub sources: RawSources,
}

fn default_score() -> i32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilterConfig {
    #[serde(default)]
    pub deck: Deck,
    #[serde(default)]
    pub stake: Stake,
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub must: Vec<RawClause>,
    #[serde(default)]
    pub should: Vec<RawClause>,
    #[serde(default)]
    pub must_not: Vec<RawClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownValue { clause_index: usize, field: &'static str, value: String },
    EmptyAntes { clause_index: usize },
    ConflictingSources { clause_index: usize, reason: String },
    InvalidMin { clause_index: usize },
    InvalidScore { clause_index: usize },
    StickerStakeMismatch { clause_index: usize, sticker: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownValue { clause_index, field, value } => {
                write!(f, "clause {clause_index}: unknown {field} value {value:?}")
            }
            ConfigError::EmptyAntes { clause_index } => {
                write!(f, "clause {clause_index}: antes list must not be empty")
            }
            ConfigError::ConflictingSources { clause_index, reason } => {
                write!(f, "clause {clause_index}: conflicting sources ({reason})")
            }
            ConfigError::InvalidMin { clause_index } => {
                write!(f, "clause {clause_index}: min must be >= 1")
            }
            ConfigError::InvalidScore { clause_index } => {
                write!(f, "clause {clause_index}: score must be positive")
            }
            ConfigError::StickerStakeMismatch { clause_index, sticker } => {
                write!(f, "clause {clause_index}: sticker {sticker:?} requires a higher stake than declared")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseValue {
    Named(u8),
    Any,
    AnyJoker,
    AnyCommon,
    AnyUncommon,
    AnyRare,
    AnyLegendary,
}

#[derive(Debug, Clone, Copy)]
pub struct CardMatch {
    pub edition: Option<Edition>,
    pub stickers: Option<Stickers>,
    pub suit: Option<Suit>,
    pub rank: Option<Rank>,
    pub enhancement: Option<Enhancement>,
    pub seal: Option<Seal>,
}

#[derive(Debug, Clone)]
pub struct Sources {
    pub shop_slots: Option<Vec<u32>>,
    pub pack_slots: Option<Vec<u32>>,
    /// restrict a joker/consumable/card clause to items granted directly by
    /// a blind tag rather than drawn from the shop or a pack.
    pub tags: Option<bool>,
    pub require_mega: bool,
}

#[derive(Debug, Clone)]
pub struct Clause {
    pub kind: ClauseType,
    pub value: ClauseValue,
    pub antes: Vec<u32>,
    pub score: i32,
    pub min: Option<u32>,
    pub card_match: CardMatch,
    pub sources: Sources,
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub deck: Deck,
    pub stake: Stake,
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

fn lookup_ordinal(kind: ClauseType, value: &str) -> Option<u8> {
    let table: &[&str] = match kind {
        ClauseType::Joker | ClauseType::SoulJoker => return lookup_joker(value),
        ClauseType::TarotCard => tables::TAROTS,
        ClauseType::PlanetCard => tables::PLANETS,
        ClauseType::SpectralCard => tables::SPECTRALS,
        ClauseType::SmallBlindTag | ClauseType::BigBlindTag => tables::TAGS,
        ClauseType::Voucher => tables::VOUCHERS,
        ClauseType::Boss => tables::BOSSES,
        ClauseType::PlayingCard => return None,
    };
    table.iter().position(|&v| v == value).map(|i| i as u8)
}

fn lookup_joker(value: &str) -> Option<u8> {
    for (pool, rarity) in [
        (tables::COMMON_JOKERS, tables::Rarity::Common),
        (tables::UNCOMMON_JOKERS, tables::Rarity::Uncommon),
        (tables::RARE_JOKERS, tables::Rarity::Rare),
        (tables::LEGENDARY_JOKERS, tables::Rarity::Legendary),
    ] {
        if let Some(i) = pool.iter().position(|&v| v == value) {
            return Some(tables::joker_global_ordinal(rarity, i as u8));
        }
    }
    None
}

fn parse_value(kind: ClauseType, raw: &Option<String>, idx: usize) -> Result<ClauseValue, ConfigError> {
    let Some(raw) = raw else {
        return Ok(ClauseValue::Any);
    };
    match raw.as_str() {
        "any" => Ok(ClauseValue::Any),
        "anyjoker" => Ok(ClauseValue::AnyJoker),
        "anycommon" => Ok(ClauseValue::AnyCommon),
        "anyuncommon" => Ok(ClauseValue::AnyUncommon),
        "anyrare" => Ok(ClauseValue::AnyRare),
        "anylegendary" => Ok(ClauseValue::AnyLegendary),
        name => lookup_ordinal(kind, name).map(ClauseValue::Named).ok_or_else(|| {
            ConfigError::UnknownValue { clause_index: idx, field: "value", value: name.to_string() }
        }),
    }
}

fn parse_edition(raw: &Option<String>, idx: usize) -> Result<Option<Edition>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    Ok(Some(match raw.as_str() {
        "none" => Edition::None,
        "foil" => Edition::Foil,
        "holographic" => Edition::Holographic,
        "polychrome" => Edition::Polychrome,
        "negative" => Edition::Negative,
        other => {
            return Err(ConfigError::UnknownValue { clause_index: idx, field: "edition", value: other.to_string() })
        }
    }))
}

fn parse_stickers(raw: &Option<Vec<String>>, idx: usize, stake: Stake) -> Result<Option<Stickers>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    let mut s = Stickers::default();
    for name in raw {
        match name.as_str() {
            "eternal" => {
                if !stake.allows_eternal_perishable() {
                    return Err(ConfigError::StickerStakeMismatch { clause_index: idx, sticker: name.clone() });
                }
                s.eternal = true;
            }
            "perishable" => {
                if !stake.allows_eternal_perishable() {
                    return Err(ConfigError::StickerStakeMismatch { clause_index: idx, sticker: name.clone() });
                }
                s.perishable = true;
            }
            "rental" => {
                if !stake.allows_rental() {
                    return Err(ConfigError::StickerStakeMismatch { clause_index: idx, sticker: name.clone() });
                }
                s.rental = true;
            }
            other => {
                return Err(ConfigError::UnknownValue { clause_index: idx, field: "stickers", value: other.to_string() })
            }
        }
    }
    Ok(Some(s))
}

fn parse_suit(raw: &Option<String>, idx: usize) -> Result<Option<Suit>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    Ok(Some(match raw.as_str() {
        "spades" => Suit::Spades,
        "hearts" => Suit::Hearts,
        "clubs" => Suit::Clubs,
        "diamonds" => Suit::Diamonds,
        other => return Err(ConfigError::UnknownValue { clause_index: idx, field: "suit", value: other.to_string() }),
    }))
}

fn parse_rank(raw: &Option<String>, idx: usize) -> Result<Option<Rank>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    let ranks = [
        ("2", Rank::Two), ("3", Rank::Three), ("4", Rank::Four), ("5", Rank::Five),
        ("6", Rank::Six), ("7", Rank::Seven), ("8", Rank::Eight), ("9", Rank::Nine),
        ("10", Rank::Ten), ("jack", Rank::Jack), ("queen", Rank::Queen), ("king", Rank::King),
        ("ace", Rank::Ace),
    ];
    ranks
        .iter()
        .find(|(name, _)| *name == raw.to_lowercase())
        .map(|(_, r)| *r)
        .map(Some)
        .ok_or_else(|| ConfigError::UnknownValue { clause_index: idx, field: "rank", value: raw.clone() })
}

fn parse_enhancement(raw: &Option<String>, idx: usize) -> Result<Option<Enhancement>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    Ok(Some(match raw.as_str() {
        "none" => Enhancement::None,
        "bonus" => Enhancement::Bonus,
        "mult" => Enhancement::Mult,
        "wild" => Enhancement::Wild,
        "glass" => Enhancement::Glass,
        "steel" => Enhancement::Steel,
        "stone" => Enhancement::Stone,
        "gold" => Enhancement::Gold,
        "lucky" => Enhancement::Lucky,
        other => {
            return Err(ConfigError::UnknownValue { clause_index: idx, field: "enhancement", value: other.to_string() })
        }
    }))
}

fn parse_seal(raw: &Option<String>, idx: usize) -> Result<Option<Seal>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    Ok(Some(match raw.as_str() {
        "none" => Seal::None,
        "gold" => Seal::Gold,
        "red" => Seal::Red,
        "blue" => Seal::Blue,
        "purple" => Seal::Purple,
        other => return Err(ConfigError::UnknownValue { clause_index: idx, field: "seal", value: other.to_string() }),
    }))
}

fn compile_clause(raw: &RawClause, idx: usize, stake: Stake, errors: &mut Vec<ConfigError>) -> Option<Clause> {
    let mut ok = true;

    if raw.antes.is_empty() {
        errors.push(ConfigError::EmptyAntes { clause_index: idx });
        ok = false;
    }
    if raw.score <= 0 {
        errors.push(ConfigError::InvalidScore { clause_index: idx });
        ok = false;
    }
    if let Some(min) = raw.min {
        if min == 0 {
            errors.push(ConfigError::InvalidMin { clause_index: idx });
            ok = false;
        }
    }
    if (raw.sources.shop_slots.is_some() || raw.sources.pack_slots.is_some() || raw.sources.tags.is_some())
        && matches!(raw.kind, ClauseType::Voucher | ClauseType::Boss | ClauseType::SmallBlindTag | ClauseType::BigBlindTag)
    {
        errors.push(ConfigError::ConflictingSources {
            clause_index: idx,
            reason: "voucher/boss/tag clauses do not read shop slots, pack slots, or tags".to_string(),
        });
        ok = false;
    }

    let value = match parse_value(raw.kind, &raw.value, idx) {
        Ok(v) => v,
        Err(e) => {
            errors.push(e);
            ok = false;
            ClauseValue::Any
        }
    };
    let edition = parse_edition(&raw.edition, idx).unwrap_or_else(|e| { errors.push(e); None });
    let stickers = parse_stickers(&raw.stickers, idx, stake).unwrap_or_else(|e| { errors.push(e); None });
    let suit = parse_suit(&raw.suit, idx).unwrap_or_else(|e| { errors.push(e); None });
    let rank = parse_rank(&raw.rank, idx).unwrap_or_else(|e| { errors.push(e); None });
    let enhancement = parse_enhancement(&raw.enhancement, idx).unwrap_or_else(|e| { errors.push(e); None });
    let seal = parse_seal(&raw.seal, idx).unwrap_or_else(|e| { errors.push(e); None });

    if !ok {
        return None;
    }

    Some(Clause {
        kind: raw.kind,
        value,
        antes: raw.antes.clone(),
        score: raw.score,
        min: raw.min,
        card_match: CardMatch { edition, stickers, suit, rank, enhancement, seal },
        sources: Sources {
            shop_slots: raw.sources.shop_slots.clone(),
            pack_slots: raw.sources.pack_slots.clone(),
            tags: raw.sources.tags,
            require_mega: raw.sources.require_mega.unwrap_or(false),
        },
    })
}

/// validates and compiles a raw config. Collects *all* errors before
/// returning, per §7 "surface full list of errors". Per §8 boundary
/// behaviors: an empty `should` list is filled in by duplicating `must` at
/// weight 1, so every accepted seed has a non-zero score vector.
pub fn compile(raw: RawFilterConfig) -> Result<FilterConfig, Vec<ConfigError>> {
    let mut errors = Vec::new();
    let must: Vec<Clause> = raw
        .must
        .iter()
        .enumerate()
        .filter_map(|(i, c)| compile_clause(c, i, raw.stake, &mut errors))
        .collect();
    let offset = raw.must.len();
    let mut should: Vec<Clause> = raw
        .should
        .iter()
        .enumerate()
        .filter_map(|(i, c)| compile_clause(c, offset + i, raw.stake, &mut errors))
        .collect();
    let offset = offset + raw.should.len();
    let must_not: Vec<Clause> = raw
        .must_not
        .iter()
        .enumerate()
        .filter_map(|(i, c)| compile_clause(c, offset + i, raw.stake, &mut errors))
        .collect();

    if !errors.is_empty() {
        return Err(errors);
    }

    if should.is_empty() {
        should = must.clone();
    }

    Ok(FilterConfig { deck: raw.deck, stake: raw.stake, must, should, must_not })
}
