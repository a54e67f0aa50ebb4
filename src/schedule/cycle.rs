//! Full backup rotation
//!
//! One cycle visits every tier-1 slot twice and every tier-2 slot once:
//! tier 1 in its natural order first, then tier 2 interleaved with a second
//! pass over tier 1. With `a` for tier 1 and `b` for tier 2:
//!
//! ```text
//! a1, a2, a3, b1, a1, b2, a2, b3, a3 | a1, a2, ...
//! ```
//!
//! When the tiers differ in length the leftover slots of the longer tier are
//! appended after the interleaved region, tier 1's before tier 2's. An empty
//! tier 2 therefore yields tier 1 twice in a row. The cycle length is always
//! `2 * len(tier1) + len(tier2)`.

use serde::Serialize;

use crate::config::BackupConfig;
use crate::models::{Slot, Tier};

/// One full-backup turn of the cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleTurn {
    /// Tier the slot comes from
    pub tier: Tier,
    /// Sets receiving a full backup on this turn
    pub slot: Slot,
}

/// Immutable full-backup rotation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Cycle {
    turns: Vec<CycleTurn>,
}

impl Cycle {
    /// Build the rotation from both tiers' slots
    pub fn build(tier1: &[Slot], tier2: &[Slot]) -> Self {
        let turn = |tier: Tier, slot: &Slot| CycleTurn {
            tier,
            slot: slot.clone(),
        };

        let mut turns: Vec<CycleTurn> = tier1.iter().map(|s| turn(Tier::Tier1, s)).collect();

        for (t2, t1) in tier2.iter().zip(tier1) {
            turns.push(turn(Tier::Tier2, t2));
            turns.push(turn(Tier::Tier1, t1));
        }

        let zipped = tier1.len().min(tier2.len());
        turns.extend(tier1[zipped..].iter().map(|s| turn(Tier::Tier1, s)));
        turns.extend(tier2[zipped..].iter().map(|s| turn(Tier::Tier2, s)));

        Self { turns }
    }

    /// Build the rotation of a configuration
    pub fn from_config(config: &BackupConfig) -> Self {
        Self::build(config.slots(Tier::Tier1), config.slots(Tier::Tier2))
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turn at a cycle index
    pub fn get(&self, index: usize) -> Option<&CycleTurn> {
        self.turns.get(index)
    }

    /// Slot at a cycle index
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.get(index).map(|t| &t.slot)
    }

    pub fn turns(&self) -> &[CycleTurn] {
        &self.turns
    }

    /// Slots in rotation order
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.turns.iter().map(|t| &t.slot)
    }

    /// Longest run of days between two full backups of `name`
    ///
    /// Measured around the wrap of the cycle. Returns `None` when the set
    /// never gets a full backup.
    pub fn max_full_interval(&self, name: &str) -> Option<usize> {
        let positions: Vec<usize> = self
            .turns
            .iter()
            .enumerate()
            .filter(|(_, t)| t.slot.contains(name))
            .map(|(i, _)| i)
            .collect();

        let first = *positions.first()?;
        let last = *positions.last()?;
        let wrap = first + self.len() - last;

        let max_inner = positions.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0);
        Some(max_inner.max(wrap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(names: &[&[&str]]) -> Vec<Slot> {
        names.iter().map(|s| Slot::new(s.iter().copied())).collect()
    }

    fn names(cycle: &Cycle) -> Vec<String> {
        cycle.slots().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_documented_example() {
        let tier1 = slots(&[&["A", "B"], &["C"]]);
        let tier2 = slots(&[&["D"]]);
        let cycle = Cycle::build(&tier1, &tier2);

        assert_eq!(names(&cycle), vec!["[A, B]", "[C]", "[D]", "[A, B]", "[C]"]);
        assert_eq!(cycle.get(2).unwrap().tier, Tier::Tier2);
        assert_eq!(cycle.get(3).unwrap().tier, Tier::Tier1);
    }

    #[test]
    fn test_equal_length_tiers_interleave() {
        let tier1 = slots(&[&["a1"], &["a2"], &["a3"]]);
        let tier2 = slots(&[&["b1"], &["b2"], &["b3"]]);
        let cycle = Cycle::build(&tier1, &tier2);

        assert_eq!(
            names(&cycle),
            vec!["[a1]", "[a2]", "[a3]", "[b1]", "[a1]", "[b2]", "[a2]", "[b3]", "[a3]"]
        );
    }

    #[test]
    fn test_empty_tier2_repeats_tier1() {
        let tier1 = slots(&[&["A"], &["B"]]);
        let cycle = Cycle::build(&tier1, &[]);

        assert_eq!(names(&cycle), vec!["[A]", "[B]", "[A]", "[B]"]);
    }

    #[test]
    fn test_empty_tier1_is_tier2_only() {
        let tier2 = slots(&[&["X"], &["Y"]]);
        let cycle = Cycle::build(&[], &tier2);

        assert_eq!(names(&cycle), vec!["[X]", "[Y]"]);
    }

    #[test]
    fn test_longer_tier2_appends_remainder() {
        let tier1 = slots(&[&["A"]]);
        let tier2 = slots(&[&["X"], &["Y"], &["Z"]]);
        let cycle = Cycle::build(&tier1, &tier2);

        assert_eq!(names(&cycle), vec!["[A]", "[X]", "[A]", "[Y]", "[Z]"]);
    }

    #[test]
    fn test_length_formula() {
        let pool: Vec<Slot> = (0..6).map(|i| Slot::new([format!("s{}", i)])).collect();
        for n1 in 0..4 {
            for n2 in 0..4 {
                let tier1 = &pool[..n1];
                let tier2 = &pool[3..3 + n2.min(3)];
                let cycle = Cycle::build(tier1, tier2);
                assert_eq!(
                    cycle.len(),
                    2 * tier1.len() + tier2.len(),
                    "tier1={} tier2={}",
                    tier1.len(),
                    tier2.len()
                );
            }
        }
    }

    #[test]
    fn test_max_full_interval() {
        let tier1 = slots(&[&["A", "B"], &["C"]]);
        let tier2 = slots(&[&["D"]]);
        let cycle = Cycle::build(&tier1, &tier2);

        // [A,B] at 0 and 3 of 5
        assert_eq!(cycle.max_full_interval("A"), Some(3));
        // [C] at 1 and 4
        assert_eq!(cycle.max_full_interval("C"), Some(3));
        // D once per cycle
        assert_eq!(cycle.max_full_interval("D"), Some(5));
        assert_eq!(cycle.max_full_interval("Z"), None);
    }
}
