//! Deterministic pseudohash recurrence and the partial-hash cache.
//!
//! Bit-for-bit compatible with the reference game; the constants below are
//! part of the external compatibility surface and must never change.

use crate::LANES;

const MIX: f64 = 1.1239285023;

/// Evaluate the recurrence right-to-left over `chars`, seeded with `num =
/// 1.0`. `chars` is the ASCII byte sequence of `key ∥ seed`.
fn mix(chars: &[u8], mut num: f64) -> f64 {
    for (i, &byte) in chars.iter().enumerate().rev() {
        let c = byte as f64;
        num = ((MIX / num) * c * std::f64::consts::PI + (i as f64 + 1.0) * std::f64::consts::PI)
            % 1.0;
    }
    num
}

/// Full pseudohash of `key ∥ seed`, computed from scratch. Used when no
/// cached tail is available (e.g. outside the hot loop, or for a key length
/// that was never registered with the cache).
pub fn pseudohash(key: &[u8], seed: &[u8]) -> f64 {
    let mut chars = Vec::with_capacity(key.len() + seed.len());
    chars.extend_from_slice(key);
    chars.extend_from_slice(seed);
    mix(&chars, 1.0)
}

/// One cached tail value per (key length, lane). The recurrence at position
/// `i` depends only on `i` and the characters at positions `>= i`, so the
/// tail over `[key_len, total_len)` — i.e. over the seed's characters only,
/// offset by the key length that will eventually precede them — is the same
/// for every key of that length, regardless of the key's actual content.
///
/// Concretely: for a seed of length `S` and a candidate key length `L`, the
/// tail is `mix(seed, 1.0)` evaluated with position indices offset by `L`
/// (since the full string is `key ∥ seed`, the seed occupies positions
/// `[L, L+S)`). We store that offset tail per `L` per lane.
#[derive(Debug, Clone)]
pub struct PartialHashCache {
    /// tails[key_len][lane] = partial `num` after folding in the seed's
    /// characters only, at the position offset implied by `key_len`.
    tails: std::collections::HashMap<usize, [f64; LANES]>,
}

impl PartialHashCache {
    pub fn new() -> Self {
        Self {
            tails: std::collections::HashMap::new(),
        }
    }

    /// Register that streams of key length `key_len` will be requested, and
    /// precompute this batch's `LANES`-wide tail for it. `seeds` holds one
    /// seed (as bytes) per lane; all seeds in a batch share the same
    /// length `S` (sequential mode fixes trailing characters per batch).
    pub fn precompute(&mut self, key_len: usize, seeds: &[&[u8]; LANES]) {
        let mut tail = [0.0f64; LANES];
        for lane in 0..LANES {
            tail[lane] = mix_with_offset(seeds[lane], key_len, 1.0);
        }
        self.tails.insert(key_len, tail);
    }

    /// Finish the recurrence for `key` (length `key_len`) on `lane`, given
    /// the seed bytes on that lane. `key_len` must have been registered via
    /// [`precompute`] with this exact seed. Mixing in the key characters
    /// continues the recurrence leftward from where the cached tail left
    /// off, exactly as a from-scratch evaluation over `key ∥ seed` would.
    pub fn finish(&self, key: &[u8], lane: usize) -> Option<f64> {
        let tail = *self.tails.get(&key.len())?.get(lane)?;
        Some(mix(key, tail))
    }

    pub fn contains(&self, key_len: usize) -> bool {
        self.tails.contains_key(&key_len)
    }
}

impl Default for PartialHashCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold `seed`'s bytes into the recurrence, treating them as occupying
/// positions `[key_len, key_len + seed.len())` of the eventual `key ∥ seed`
/// string (i.e. as if `key_len` placeholder characters preceded them).
fn mix_with_offset(seed: &[u8], key_len: usize, mut num: f64) -> f64 {
    for (j, &byte) in seed.iter().enumerate().rev() {
        let i = key_len + j;
        let c = byte as f64;
        num = ((MIX / num) * c * std::f64::consts::PI + (i as f64 + 1.0) * std::f64::consts::PI)
            % 1.0;
    }
    num
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_from_scratch_recurrence() {
        let seed = b"ALEEB";
        let key = b"Voucher1";
        let direct = pseudohash(key, seed);

        let mut cache = PartialHashCache::new();
        let seeds: [&[u8]; LANES] = [seed, seed, seed, seed, seed, seed, seed, seed];
        cache.precompute(key.len(), &seeds);
        let cached = cache.finish(key, 0).unwrap();

        assert_eq!(direct.to_bits(), cached.to_bits());
    }

    #[test]
    fn cache_is_keyed_by_length_not_content() {
        let seed = b"A1B2C3";
        let key_a = b"Joker1";
        let key_b = b"Tarot1";
        assert_eq!(key_a.len(), key_b.len());

        let mut cache = PartialHashCache::new();
        let seeds: [&[u8]; LANES] = [seed; LANES];
        cache.precompute(key_a.len(), &seeds);

        let via_cache_a = cache.finish(key_a, 3).unwrap();
        let via_cache_b = cache.finish(key_b, 3).unwrap();
        let direct_a = pseudohash(key_a, seed);
        let direct_b = pseudohash(key_b, seed);
        assert_eq!(via_cache_a.to_bits(), direct_a.to_bits());
        assert_eq!(via_cache_b.to_bits(), direct_b.to_bits());
    }

    #[test]
    fn different_keys_give_different_hashes() {
        let seed = b"ALEEB";
        let a = pseudohash(b"Joker1", seed);
        let b = pseudohash(b"Joker2", seed);
        assert_ne!(a.to_bits(), b.to_bits());
    }
}
