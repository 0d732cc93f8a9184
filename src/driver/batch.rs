//! Sequential batch enumeration (§4.5): a batch index decomposes into the
//! leading `batch_size` characters of every seed in that batch (fixed for
//! the whole batch); the remaining `length - batch_size` trailing
//! characters are enumerated within the batch, `LANES` seeds at a time.

use crate::seed::{self, Seed};
use crate::LANES;

/// total number of batches for a `length`-character search with `batch_size`
/// leading characters fixed per batch: `ALPHABET.len()^batch_size`.
pub fn batch_total(batch_size: u32) -> u64 {
    (seed::ALPHABET.len() as u64).pow(batch_size)
}

/// the `batch_size`-character prefix shared by every seed in `batch_index`.
pub fn batch_prefix(batch_index: u64, batch_size: u32) -> Vec<u8> {
    let radix = seed::ALPHABET.len() as u64;
    let mut idx = batch_index;
    let mut chars = Vec::with_capacity(batch_size as usize);
    for _ in 0..batch_size {
        let digit = (idx % radix) as usize;
        chars.push(seed::ALPHABET[digit]);
        idx /= radix;
    }
    chars.reverse();
    chars
}

/// number of trailing characters a batch enumerates internally.
pub fn suffix_len(length: usize, batch_size: u32) -> usize {
    length - batch_size as usize
}

/// the `n`-th suffix (lexicographic, base-`ALPHABET.len()`) of `suffix_len`
/// characters.
fn suffix_for(n: u64, suffix_len: usize) -> Vec<u8> {
    let radix = seed::ALPHABET.len() as u64;
    let mut idx = n;
    let mut chars = Vec::with_capacity(suffix_len);
    for _ in 0..suffix_len {
        let digit = (idx % radix) as usize;
        chars.push(seed::ALPHABET[digit]);
        idx /= radix;
    }
    chars.reverse();
    chars
}

/// an iterator over every [`Seed`] in `batch_index`, in lexicographic order
/// of the trailing characters.
pub struct BatchSeeds {
    prefix: Vec<u8>,
    suffix_len: usize,
    next: u64,
    total: u64,
}

impl BatchSeeds {
    pub fn new(batch_index: u64, batch_size: u32, length: usize) -> Self {
        let suffix_len = suffix_len(length, batch_size);
        Self {
            prefix: batch_prefix(batch_index, batch_size),
            suffix_len,
            next: 0,
            total: (seed::ALPHABET.len() as u64).pow(suffix_len as u32),
        }
    }
}

impl Iterator for BatchSeeds {
    type Item = Seed;

    fn next(&mut self) -> Option<Seed> {
        if self.next >= self.total {
            return None;
        }
        let suffix = suffix_for(self.next, self.suffix_len);
        self.next += 1;
        let mut bytes = self.prefix.clone();
        bytes.extend_from_slice(&suffix);
        Seed::from_bytes(&bytes)
    }
}

/// groups a batch's seeds into fixed-size chunks of up to [`LANES`] for the
/// SIMD-lane stage (§4.5 "lane-width-8 seed matrix").
pub fn lane_chunks(batch_index: u64, batch_size: u32, length: usize) -> impl Iterator<Item = Vec<Seed>> {
    let mut seeds = BatchSeeds::new(batch_index, batch_size, length);
    std::iter::from_fn(move || {
        let mut chunk = Vec::with_capacity(LANES);
        for _ in 0..LANES {
            match seeds.next() {
                Some(s) => chunk.push(s),
                None => break,
            }
        }
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    })
}

/// a user-provided seed enumeration, for the "provider" mode (§4.5) where
/// seeds come from an external list rather than sequential enumeration.
pub trait SeedProvider: Send {
    fn next_seed(&mut self) -> Option<Seed>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_total_matches_alphabet_power() {
        let radix = seed::ALPHABET.len() as u64;
        assert_eq!(batch_total(1), radix);
        assert_eq!(batch_total(2), radix * radix);
    }

    #[test]
    fn batch_prefix_round_trips_through_digits() {
        let prefix = batch_prefix(0, 2);
        assert_eq!(prefix, vec![b'1', b'1']);
        let last = batch_prefix(batch_total(2) - 1, 2);
        assert_eq!(last, vec![b'Z', b'Z']);
    }

    #[test]
    fn batch_seeds_enumerate_every_suffix_exactly_once() {
        let radix = seed::ALPHABET.len() as u64;
        let seeds: Vec<Seed> = BatchSeeds::new(0, 1, 3).collect();
        assert_eq!(seeds.len() as u64, radix * radix);
        let unique: std::collections::HashSet<String> = seeds.iter().map(|s| s.to_string()).collect();
        assert_eq!(unique.len(), seeds.len());
    }

    #[test]
    fn lane_chunks_group_by_lanes_width() {
        let chunks: Vec<Vec<Seed>> = lane_chunks(0, 1, 3).collect();
        assert!(chunks.iter().take(chunks.len() - 1).all(|c| c.len() == LANES));
        assert!(chunks.last().unwrap().len() <= LANES);
    }
}
