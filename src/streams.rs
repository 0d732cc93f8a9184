//! Stream constructors (C2): naming, resample chains, and does-provide
//! flags, grounded on the teacher's `clustering/bottom/producer.rs` shard/
//! key composition style.

use crate::rng::Stream;
use std::collections::HashMap;

/// does-provide flags a filter clause consults before drawing, so that a
/// suppressed draw (e.g. "shop stream excluding spectrals") still advances
/// the same sub-streams the reference game would, keeping RNG alignment
/// (§4.2).
#[derive(Debug, Clone, Copy, Default)]
pub struct Provides {
    pub edition: bool,
    pub stickers: bool,
    pub common: bool,
    pub uncommon: bool,
    pub rare: bool,
    pub legendary: bool,
}

/// Builds a stream key by concatenating a domain prefix with an ante-scoped
/// suffix, e.g. `"Joker1" + source + ante` (§4.2). `source` is an optional
/// extra disambiguator (e.g. a shop-slot-local discriminator); most keys
/// have none.
pub fn stream_key(prefix: &str, source: Option<&str>, ante: u32) -> String {
    match source {
        Some(source) => format!("{prefix}{source}{ante}"),
        None => format!("{prefix}{ante}"),
    }
}

/// A resample chain: the base stream plus lazily-created successors keyed
/// `base_key + "_resample" + (n+1)` for `n >= 1` (§4.2). Drawing resamples
/// never disturbs the base stream.
pub struct ResampleChain<'a> {
    base_key: String,
    seed: &'a [u8],
    successors: HashMap<u32, Stream>,
}

impl<'a> ResampleChain<'a> {
    pub fn new(base_key: String, seed: &'a [u8]) -> Self {
        Self {
            base_key,
            seed,
            successors: HashMap::new(),
        }
    }

    /// the n-th resample stream, `n >= 1`; created lazily and cached.
    pub fn nth(&mut self, n: u32) -> &mut Stream {
        debug_assert!(n >= 1);
        self.successors.entry(n).or_insert_with(|| {
            let key = format!("{}_resample{}", self.base_key, n);
            Stream::from_key(key.as_bytes(), self.seed)
        })
    }
}

/// The per-ante, per-kind stream bundle an item generator draws from. Each
/// field is constructed on demand the first time a generator needs it,
/// mirroring "streams are instantiated on demand" (§2 data flow).
pub struct StreamSet<'a> {
    seed: &'a [u8],
    streams: HashMap<String, Stream>,
    resamples: HashMap<String, ResampleChain<'a>>,
}

impl<'a> StreamSet<'a> {
    pub fn new(seed: &'a [u8]) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
            resamples: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> &mut Stream {
        self.streams
            .entry(key.to_string())
            .or_insert_with(|| Stream::from_key(key.as_bytes(), self.seed))
    }

    /// seeds `key` with an already-computed stream, so a later [`get`] for
    /// the same key returns it instead of recomputing a pseudohash from
    /// scratch — used by the batch prefilter, which derives initial stream
    /// state for many lanes at once via a [`crate::pseudohash::PartialHashCache`].
    pub fn insert(&mut self, key: &str, stream: Stream) {
        self.streams.insert(key.to_string(), stream);
    }

    pub fn resample(&mut self, base_key: &str, n: u32) -> &mut Stream {
        self.resamples
            .entry(base_key.to_string())
            .or_insert_with(|| ResampleChain::new(base_key.to_string(), self.seed))
            .nth(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng;

    #[test]
    fn stream_key_composition() {
        assert_eq!(stream_key("Voucher", None, 3), "Voucher3");
        assert_eq!(stream_key("Joker1", Some("shop"), 2), "Joker1shop2");
    }

    #[test]
    fn resample_chain_preserves_base_alignment() {
        let seed = b"ALEEB";
        let mut set = StreamSet::new(seed);
        let base = set.get("Tarot1").clone();
        let base_after_untouched = set.get("Tarot1").clone();
        assert_eq!(
            base.initial_state().unwrap().to_bits(),
            base_after_untouched.initial_state().unwrap().to_bits()
        );

        let r1 = rng::next_random(set.resample("Tarot1", 1));
        let r1_again = {
            // recompute from scratch to ensure determinism, independent of
            // the cached chain's internal mutation order.
            let mut fresh = StreamSet::new(seed);
            rng::next_random(fresh.resample("Tarot1", 1))
        };
        assert_eq!(r1.to_bits(), r1_again.to_bits());
    }

    #[test]
    fn distinct_resample_indices_diverge() {
        let seed = b"ALEEB";
        let mut set = StreamSet::new(seed);
        let r1 = rng::next_random(set.resample("Tarot1", 1));
        let r2 = rng::next_random(set.resample("Tarot1", 2));
        assert_ne!(r1.to_bits(), r2.to_bits());
    }
}
