//! Playing-card generation: used by shop slots (Ghost deck / MagicTrick
//! voucher) and Standard packs (§4.3/§4.6 "PlayingCard").

use crate::generators::roll_edition;
use crate::items::{Category, Enhancement, Item, Rank, Seal, Suit};
use crate::rng::{self, Stream};

const RANKS: [Rank; 13] = [
    Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight,
    Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
];
const SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];
const ENHANCEMENTS: [Enhancement; 9] = [
    Enhancement::None, Enhancement::Bonus, Enhancement::Mult, Enhancement::Wild,
    Enhancement::Glass, Enhancement::Steel, Enhancement::Stone, Enhancement::Gold,
    Enhancement::Lucky,
];
const SEALS: [Seal; 5] = [Seal::None, Seal::Gold, Seal::Red, Seal::Blue, Seal::Purple];

pub fn draw_playing_card(stream: &mut Stream, edition_rate: f64) -> Item {
    let rank = RANKS[rng::next_random_int(stream, 0, RANKS.len() as i32 - 1) as usize];
    let suit = SUITS[rng::next_random_int(stream, 0, SUITS.len() as i32 - 1) as usize];
    let enhancement =
        ENHANCEMENTS[rng::next_random_int(stream, 0, ENHANCEMENTS.len() as i32 - 1) as usize];
    let seal = SEALS[rng::next_random_int(stream, 0, SEALS.len() as i32 - 1) as usize];
    let edition = roll_edition(stream, edition_rate);
    Item::new(Category::PlayingCard, 0)
        .with_rank_suit(rank, suit)
        .with_enhancement(enhancement)
        .with_seal(seal)
        .with_edition(edition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn deterministic_across_identical_streams() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut a = Stream::from_key(b"sta1", seed.as_bytes());
        let mut b = Stream::from_key(b"sta1", seed.as_bytes());
        let ia = draw_playing_card(&mut a, 1.0);
        let ib = draw_playing_card(&mut b, 1.0);
        assert_eq!(ia.raw(), ib.raw());
    }
}
