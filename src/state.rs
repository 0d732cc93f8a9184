//! Run State (C4): per-seed mutable bundle, owned exclusively by the
//! seed's evaluation (§4.4). The boss lock uses a `u32` bitmask per the
//! §9 redesign note (replacing a `HashSet`-in-`ref struct` the teacher
//! itself doesn't have, but which the redesign describes generically).

use crate::items::{Category, Item, ItemSet};
use crate::tables;

#[derive(Debug, Clone, Default)]
pub struct RunState {
    voucher_bitfield: u32,
    showman_active: bool,
    owned_jokers: ItemSet,
    consumed_soul_packs: u64,
    boss_lock: u32,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// activates voucher `v`; if `v` is odd, also activates its even
    /// predecessor `v - 1` (§3/§4.4 invariant).
    pub fn activate_voucher(&mut self, v: u8) {
        self.voucher_bitfield |= 1 << v;
        if v % 2 == 1 {
            self.voucher_bitfield |= 1 << (v - 1);
        }
    }

    pub fn is_voucher_active(&self, v: u8) -> bool {
        self.voucher_bitfield & (1 << v) != 0
    }

    pub fn voucher_bitfield(&self) -> u32 {
        self.voucher_bitfield
    }

    pub fn activate_showman(&mut self) {
        self.showman_active = true;
    }

    pub fn showman_active(&self) -> bool {
        self.showman_active
    }

    /// true if Showman is active, or `j` is not already owned (§4.4).
    pub fn can_obtain_joker(&self, category: Category, ordinal: u8) -> bool {
        self.showman_active || !self.owned_jokers.contains_same_base(category, ordinal)
    }

    pub fn add_owned_joker(&mut self, item: Item) {
        self.owned_jokers.append(item);
    }

    /// bit `(ante-1)*8 + pack_slot`, per §3.
    fn soul_pack_bit(ante: u32, pack_slot: u32) -> u64 {
        (ante as u64 - 1) * 8 + pack_slot as u64
    }

    /// marks the (ante, pack_slot) Soul pack consumed; returns `true` the
    /// first time (i.e. the caller "wins" exclusivity), `false` if it was
    /// already consumed by an earlier clause (§8 Inv 5).
    pub fn mark_soul_pack_consumed(&mut self, ante: u32, pack_slot: u32) -> bool {
        let bit = Self::soul_pack_bit(ante, pack_slot);
        let mask = 1u64 << bit;
        if self.consumed_soul_packs & mask != 0 {
            false
        } else {
            self.consumed_soul_packs |= mask;
            true
        }
    }

    pub fn is_soul_pack_consumed(&self, ante: u32, pack_slot: u32) -> bool {
        let bit = Self::soul_pack_bit(ante, pack_slot);
        self.consumed_soul_packs & (1u64 << bit) != 0
    }

    /// locks `boss_index` (within [`tables::BOSSES`]) into the boss-lock
    /// pool. Population count of the relevant kind's bitmask hitting the
    /// kind's total size means "pool exhausted, reset" (§4.3/§9).
    pub fn lock_boss(&mut self, boss_index: usize) {
        self.boss_lock |= 1 << boss_index;
    }

    pub fn is_boss_locked(&self, boss_index: usize) -> bool {
        self.boss_lock & (1 << boss_index) != 0
    }

    pub fn reset_boss_pool(&mut self, kind_indices: impl Iterator<Item = usize>) {
        for idx in kind_indices {
            self.boss_lock &= !(1 << idx);
        }
    }

    pub fn is_boss_pool_exhausted(&self, kind_indices: impl Iterator<Item = usize> + Clone) -> bool {
        kind_indices.clone().all(|idx| self.is_boss_locked(idx))
    }
}

/// `ante % 8 == 0` is a finisher ante (glossary).
pub fn is_finisher_ante(ante: u32) -> bool {
    ante % 8 == 0
}

/// indices of the boss kind applicable to `ante`.
pub fn boss_kind_indices(ante: u32) -> Vec<usize> {
    if is_finisher_ante(ante) {
        (tables::FINISHER_BOSS_RANGE.0..tables::FINISHER_BOSS_RANGE.1).collect()
    } else {
        (tables::REGULAR_BOSS_RANGE.0..tables::REGULAR_BOSS_RANGE.1)
            .chain(tables::REGULAR_BOSS_RANGE_2.0..tables::REGULAR_BOSS_RANGE_2.1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_voucher_activates_even_predecessor() {
        let mut s = RunState::new();
        s.activate_voucher(5);
        assert!(s.is_voucher_active(5));
        assert!(s.is_voucher_active(4));
        assert!(!s.is_voucher_active(3));
    }

    #[test]
    fn showman_overrides_duplicate_restriction() {
        let mut s = RunState::new();
        let joker = Item::new(Category::Joker, 3);
        s.add_owned_joker(joker);
        assert!(!s.can_obtain_joker(Category::Joker, 3));
        s.activate_showman();
        assert!(s.can_obtain_joker(Category::Joker, 3));
    }

    #[test]
    fn soul_pack_consumed_exactly_once() {
        let mut s = RunState::new();
        assert!(s.mark_soul_pack_consumed(1, 0));
        assert!(!s.mark_soul_pack_consumed(1, 0));
        assert!(s.is_soul_pack_consumed(1, 0));
        assert!(!s.is_soul_pack_consumed(1, 1));
    }

    #[test]
    fn boss_pool_resets_when_exhausted() {
        let mut s = RunState::new();
        let kind = boss_kind_indices(8); // finisher
        for &idx in &kind {
            s.lock_boss(idx);
        }
        assert!(s.is_boss_pool_exhausted(kind.iter().copied()));
        s.reset_boss_pool(kind.iter().copied());
        assert!(!s.is_boss_pool_exhausted(kind.iter().copied()));
    }
}
