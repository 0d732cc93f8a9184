//! Shop item generation (§4.3 steps 1-2): cumulative category rate table,
//! voucher-driven multipliers, sub-stream dispatch.

use crate::generators::joker::draw_joker;
use crate::generators::playing_card::draw_playing_card;
use crate::generators::roll_edition;
use crate::items::{Category, Item};
use crate::rng::{self, Stream};
use crate::state::RunState;
use crate::streams::StreamSet;
use crate::tables::{self, ShopRates};
use crate::{Deck, Stake};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopCategory {
    Joker,
    Tarot,
    Planet,
    PlayingCard,
    Spectral,
}

/// §4.3 step 1: base rates, Ghost deck adds spectral, active
/// TarotMerchant/TarotTycoon/PlanetMerchant/PlanetTycoon multiply their
/// rate, MagicTrick voucher adds playing-card rate.
pub fn effective_rates(deck: Deck, run: &RunState) -> ShopRates {
    let mut rates = ShopRates::BASE;
    if deck == Deck::Ghost {
        rates.spectral += 2.0;
    }
    if run.is_voucher_active(voucher_ordinal("TarotTycoon")) {
        rates.tarot *= 8.0;
    } else if run.is_voucher_active(voucher_ordinal("TarotMerchant")) {
        rates.tarot *= 2.4;
    }
    if run.is_voucher_active(voucher_ordinal("PlanetTycoon")) {
        rates.planet *= 8.0;
    } else if run.is_voucher_active(voucher_ordinal("PlanetMerchant")) {
        rates.planet *= 2.4;
    }
    if run.is_voucher_active(voucher_ordinal("Magic Trick")) {
        rates.playing_card += 4.0;
    }
    rates
}

fn voucher_ordinal(name: &str) -> u8 {
    tables::VOUCHERS
        .iter()
        .position(|&v| v == name)
        .expect("known voucher name") as u8
}

/// rolls the shop slot's category against the cumulative rate table.
pub fn roll_category(stream: &mut Stream, rates: &ShopRates) -> ShopCategory {
    let total = rates.total();
    let r = rng::next_random(stream) * total;
    let mut acc = 0.0;
    acc += rates.joker;
    if r < acc {
        return ShopCategory::Joker;
    }
    acc += rates.tarot;
    if r < acc {
        return ShopCategory::Tarot;
    }
    acc += rates.planet;
    if r < acc {
        return ShopCategory::Planet;
    }
    acc += rates.playing_card;
    if r < acc {
        return ShopCategory::PlayingCard;
    }
    ShopCategory::Spectral
}

/// produces the shop item at `slot` for `ante`; always advances every
/// sub-stream a real draw of this category would (§4.6 scalar discipline:
/// "shop-item draws advance all sub-streams even when the slot is not of
/// interest").
pub fn draw_shop_item(
    streams: &mut StreamSet,
    run: &mut RunState,
    ante: u32,
    slot: u32,
    deck: Deck,
    stake: Stake,
) -> Item {
    let rates = effective_rates(deck, run);
    let category_key = format!("shop{ante}_{slot}");
    let category = roll_category(streams.get(&category_key), &rates);
    match category {
        ShopCategory::Joker => {
            let base = format!("Joker1shop{ante}_{slot}");
            draw_joker(streams, run, &base, stake, 1.0, None)
        }
        ShopCategory::Tarot => {
            let key = format!("Tarot{ante}_{slot}");
            let ordinal =
                rng::next_random_int(streams.get(&key), 0, tables::TAROTS.len() as i32 - 1) as u8;
            Item::new(Category::Tarot, ordinal)
        }
        ShopCategory::Planet => {
            let key = format!("Planet{ante}_{slot}");
            let ordinal =
                rng::next_random_int(streams.get(&key), 0, tables::PLANETS.len() as i32 - 1) as u8;
            Item::new(Category::Planet, ordinal)
        }
        ShopCategory::PlayingCard => {
            let key = format!("sta{ante}_{slot}");
            draw_playing_card(streams.get(&key), 1.0)
        }
        ShopCategory::Spectral => {
            let key = format!("Spectral{ante}_{slot}");
            let ordinal =
                rng::next_random_int(streams.get(&key), 0, tables::SPECTRALS.len() as i32 - 1)
                    as u8;
            let item = Item::new(Category::Spectral, ordinal);
            let edi_key = format!("{key}edi");
            item.with_edition(roll_edition(streams.get(&edi_key), 1.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn ghost_deck_raises_spectral_rate() {
        let run = RunState::new();
        let red = effective_rates(Deck::Red, &run);
        let ghost = effective_rates(Deck::Ghost, &run);
        assert_eq!(red.spectral, 0.0);
        assert_eq!(ghost.spectral, 2.0);
    }

    #[test]
    fn shop_draw_is_deterministic() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut a = StreamSet::new(seed.as_bytes());
        let mut ra = RunState::new();
        let mut b = StreamSet::new(seed.as_bytes());
        let mut rb = RunState::new();
        let ia = draw_shop_item(&mut a, &mut ra, 1, 0, Deck::Red, Stake::White);
        let ib = draw_shop_item(&mut b, &mut rb, 1, 0, Deck::Red, Stake::White);
        assert_eq!(ia.raw(), ib.raw());
    }
}
