//! Tag generation (§4.3 "Tag" scalar rule): the small-blind/big-blind pair
//! for an ante, drawn from a single per-ante stream.

use crate::items::{Category, Item};
use crate::rng;
use crate::streams::StreamSet;
use crate::tables;

#[derive(Debug, Clone, Copy)]
pub struct TagPair {
    pub small_blind: u8,
    pub big_blind: u8,
}

pub fn draw_tag_pair(streams: &mut StreamSet, ante: u32) -> TagPair {
    let key = format!("Tag{ante}");
    let stream = streams.get(&key);
    let small_blind = rng::next_random_int(stream, 0, tables::TAGS.len() as i32 - 1) as u8;
    let big_blind = rng::next_random_int(stream, 0, tables::TAGS.len() as i32 - 1) as u8;
    TagPair {
        small_blind,
        big_blind,
    }
}

pub fn as_item(ordinal: u8) -> Item {
    Item::new(Category::Tag, ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn tag_pair_is_deterministic() {
        let seed = Seed::from_str_exact("ALEEB").unwrap();
        let mut a = StreamSet::new(seed.as_bytes());
        let mut b = StreamSet::new(seed.as_bytes());
        let pa = draw_tag_pair(&mut a, 1);
        let pb = draw_tag_pair(&mut b, 1);
        assert_eq!(pa.small_blind, pb.small_blind);
        assert_eq!(pa.big_blind, pb.big_blind);
    }
}
