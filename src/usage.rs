//! Per-tier record of already-served question ids.
//!
//! Ids stay excluded from selection until the tier is exhausted, at which
//! point the caller clears the set so the tier cycles through its full pool
//! again instead of starving.

use std::collections::{HashMap, HashSet};

use crate::progression::Tier;

#[derive(Clone, Debug, Default)]
pub struct UsageTracker {
    used: HashMap<Tier, HashSet<u32>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to a tier's used-set, creating it on first touch.
    /// The selector marks served ids through this handle.
    pub fn used_mut(&mut self, tier: Tier) -> &mut HashSet<u32> {
        self.used.entry(tier).or_default()
    }

    pub fn mark_used(&mut self, tier: Tier, ids: impl IntoIterator<Item = u32>) {
        self.used_mut(tier).extend(ids);
    }

    pub fn used_count(&self, tier: Tier) -> usize {
        self.used.get(&tier).map(HashSet::len).unwrap_or(0)
    }

    pub fn is_used(&self, tier: Tier, id: u32) -> bool {
        self.used.get(&tier).is_some_and(|set| set.contains(&id))
    }

    /// True when fewer unused questions remain for the tier than one batch
    /// needs. The caller must `reset` before re-selecting.
    pub fn exhausted(&self, tier: Tier, tier_pool_size: usize, batch_size: usize) -> bool {
        tier_pool_size.saturating_sub(self.used_count(tier)) < batch_size
    }

    pub fn reset(&mut self, tier: Tier) {
        if let Some(set) = self.used.get_mut(&tier) {
            set.clear();
        }
    }

    /// Drop every tier's used-set. Called when a new pool replaces the old one.
    pub fn clear(&mut self) {
        self.used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_and_counts_per_tier() {
        let mut tracker = UsageTracker::new();
        tracker.mark_used(Tier::Easy, [1, 2, 3]);
        tracker.mark_used(Tier::Moderate, [1]);

        assert_eq!(tracker.used_count(Tier::Easy), 3);
        assert_eq!(tracker.used_count(Tier::Moderate), 1);
        assert_eq!(tracker.used_count(Tier::Difficult), 0);
        assert!(tracker.is_used(Tier::Easy, 2));
        assert!(!tracker.is_used(Tier::Difficult, 2));
    }

    #[test]
    fn exhaustion_triggers_below_one_batch() {
        let mut tracker = UsageTracker::new();
        // 15-question tier, batch of 10: fine until 6+ are used.
        assert!(!tracker.exhausted(Tier::Easy, 15, 10));
        tracker.mark_used(Tier::Easy, 1..=5);
        assert!(!tracker.exhausted(Tier::Easy, 15, 10));
        tracker.mark_used(Tier::Easy, 6..=6);
        assert!(tracker.exhausted(Tier::Easy, 15, 10));

        tracker.reset(Tier::Easy);
        assert_eq!(tracker.used_count(Tier::Easy), 0);
        assert!(!tracker.exhausted(Tier::Easy, 15, 10));
    }

    #[test]
    fn undersized_tier_is_exhausted_from_the_start() {
        let tracker = UsageTracker::new();
        assert!(tracker.exhausted(Tier::Easy, 7, 10));
        assert!(!tracker.exhausted(Tier::Easy, 10, 10));
    }
}
