//! Daily backup selection
//!
//! Maps a cycle position to the set receiving today's full backup and the
//! sets receiving an incremental backup.

use chrono::NaiveDate;
use serde::Serialize;

use super::clock::{cycle_index, day_index, DateClock};
use super::cycle::Cycle;
use crate::config::BackupConfig;
use crate::error::{BackupError, BackupResult};
use crate::models::{flatten, Slot, Tier};

/// Sets to back up on one cycle turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Tier of today's full slot
    pub full_tier: Tier,
    /// Sets receiving a full backup
    pub full: Vec<String>,
    /// Sets receiving an incremental backup, never overlapping `full`
    pub incremental: Vec<String>,
}

/// Compute the full and incremental sets of a cycle turn
///
/// Each tier's sets are due for an incremental backup when `cycle_index` is a
/// multiple of that tier's frequency. Sets in today's full slot are then
/// dropped from the incremental list.
pub fn select(
    cycle: &Cycle,
    cycle_index: usize,
    tier1: &[Slot],
    tier2: &[Slot],
    tier1_inc_freq: u32,
    tier2_inc_freq: u32,
) -> BackupResult<Selection> {
    if tier1_inc_freq == 0 || tier2_inc_freq == 0 {
        return Err(BackupError::Config(
            "incremental_backup_frequency must be a positive number of days".into(),
        ));
    }

    let full_turn = cycle.get(cycle_index).ok_or_else(|| {
        BackupError::Config(format!(
            "cycle index {} is outside a cycle of {} turns",
            cycle_index,
            cycle.len()
        ))
    })?;

    let mut incremental = Vec::new();
    if cycle_index % tier1_inc_freq as usize == 0 {
        incremental.extend(flatten(tier1));
    }
    if cycle_index % tier2_inc_freq as usize == 0 {
        incremental.extend(flatten(tier2));
    }
    incremental.retain(|name| !full_turn.slot.contains(name));

    Ok(Selection {
        full_tier: full_turn.tier,
        full: full_turn.slot.names().to_vec(),
        incremental,
    })
}

/// Schedule of one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPlan {
    /// Day the plan is for
    pub date: NaiveDate,
    /// Whole days since 1970-01-01
    pub day_index: i64,
    /// Position in the cycle
    pub cycle_index: usize,
    /// Number of turns in the cycle
    pub cycle_len: usize,
    /// Tier of today's full slot
    pub full_tier: Tier,
    /// Sets receiving a full backup
    pub full: Vec<String>,
    /// Sets receiving an incremental backup
    pub incremental: Vec<String>,
}

impl DailyPlan {
    /// Check whether nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.full.is_empty() && self.incremental.is_empty()
    }
}

/// Computes daily plans for a configuration
pub struct ScheduleSelector<'a> {
    config: &'a BackupConfig,
    cycle: Cycle,
}

impl<'a> ScheduleSelector<'a> {
    /// Build the cycle of a configuration
    pub fn new(config: &'a BackupConfig) -> Self {
        Self {
            config,
            cycle: Cycle::from_config(config),
        }
    }

    /// The full backup rotation
    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    /// Plan for the clock's current date
    pub fn plan_today(&self, clock: &dyn DateClock) -> BackupResult<DailyPlan> {
        self.plan_for(clock.today())
    }

    /// Plan for a specific date
    pub fn plan_for(&self, date: NaiveDate) -> BackupResult<DailyPlan> {
        let index = cycle_index(date, self.cycle.len())
            .ok_or_else(|| BackupError::Config("backup cycle is empty".into()))?;

        let selection = select(
            &self.cycle,
            index,
            self.config.slots(Tier::Tier1),
            self.config.slots(Tier::Tier2),
            self.config.incremental_frequency(Tier::Tier1),
            self.config.incremental_frequency(Tier::Tier2),
        )?;

        Ok(DailyPlan {
            date,
            day_index: day_index(date),
            cycle_index: index,
            cycle_len: self.cycle.len(),
            full_tier: selection.full_tier,
            full: selection.full,
            incremental: selection.incremental,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::SAMPLE;
    use crate::schedule::clock::FixedClock;
    use std::collections::HashSet;

    fn slots(names: &[&[&str]]) -> Vec<Slot> {
        names.iter().map(|s| Slot::new(s.iter().copied())).collect()
    }

    fn fixture() -> (Vec<Slot>, Vec<Slot>, Cycle) {
        let tier1 = slots(&[&["A", "B"], &["C"]]);
        let tier2 = slots(&[&["D"], &["E"]]);
        let cycle = Cycle::build(&tier1, &tier2);
        (tier1, tier2, cycle)
    }

    #[test]
    fn test_full_set_is_cycle_slot() {
        let (tier1, tier2, cycle) = fixture();
        for i in 0..cycle.len() {
            let selection = select(&cycle, i, &tier1, &tier2, 1, 3).unwrap();
            assert_eq!(selection.full, cycle.slot(i).unwrap().names());
            assert_eq!(selection.full_tier, cycle.get(i).unwrap().tier);
        }
    }

    #[test]
    fn test_full_and_incremental_disjoint() {
        let (tier1, tier2, cycle) = fixture();
        for (f1, f2) in [(1, 1), (1, 3), (2, 2), (3, 1)] {
            for i in 0..cycle.len() {
                let selection = select(&cycle, i, &tier1, &tier2, f1, f2).unwrap();
                let full: HashSet<_> = selection.full.iter().collect();
                assert!(selection.incremental.iter().all(|n| !full.contains(n)));
            }
        }
    }

    #[test]
    fn test_frequency_property() {
        let (tier1, tier2, cycle) = fixture();
        let (f1, f2) = (2, 3);
        for i in 0..cycle.len() {
            let selection = select(&cycle, i, &tier1, &tier2, f1, f2).unwrap();
            let mut scheduled: HashSet<String> = selection.incremental.iter().cloned().collect();
            scheduled.extend(selection.full.iter().cloned());

            let tier1_due = flatten(&tier1).iter().all(|n| scheduled.contains(n));
            let tier2_due = flatten(&tier2).iter().all(|n| scheduled.contains(n));
            let tier1_inc = flatten(&tier1)
                .iter()
                .any(|n| selection.incremental.contains(n));
            let tier2_inc = flatten(&tier2)
                .iter()
                .any(|n| selection.incremental.contains(n));

            if i % f1 as usize == 0 {
                assert!(tier1_due, "index {}", i);
            } else {
                assert!(!tier1_inc, "index {}", i);
            }
            if i % f2 as usize == 0 {
                assert!(tier2_due, "index {}", i);
            } else {
                assert!(!tier2_inc, "index {}", i);
            }
        }
    }

    #[test]
    fn test_index_zero_triggers_both_tiers() {
        let (tier1, tier2, cycle) = fixture();
        let selection = select(&cycle, 0, &tier1, &tier2, 1, 3).unwrap();

        // 0 is a multiple of every frequency; [A, B] is today's full slot
        assert_eq!(selection.full, vec!["A", "B"]);
        assert_eq!(selection.incremental, vec!["C", "D", "E"]);
    }

    #[test]
    fn test_off_cadence_day_only_tier1() {
        let (tier1, tier2, cycle) = fixture();
        // cycle = [A,B],[C],[D],[A,B],[E],[C]
        let selection = select(&cycle, 1, &tier1, &tier2, 1, 3).unwrap();
        assert_eq!(selection.full, vec!["C"]);
        assert_eq!(selection.incremental, vec!["A", "B"]);
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let (tier1, tier2, cycle) = fixture();
        let err = select(&cycle, 0, &tier1, &tier2, 0, 3).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let (tier1, tier2, cycle) = fixture();
        assert!(select(&cycle, cycle.len(), &tier1, &tier2, 1, 1).is_err());
    }

    #[test]
    fn test_plan_is_stable_for_a_day() {
        let config = BackupConfig::from_yaml_str(SAMPLE).unwrap();
        let selector = ScheduleSelector::new(&config);
        let date = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();

        let first = selector.plan_today(&FixedClock(date)).unwrap();
        let second = ScheduleSelector::new(&config).plan_for(date).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_plan_for_date() {
        let config = BackupConfig::from_yaml_str(SAMPLE).unwrap();
        let selector = ScheduleSelector::new(&config);
        // cycle = [A,B],[C],[D],[A,B],[C]; 2000-01-04 is day 10960 = 0 mod 5
        let date = NaiveDate::from_ymd_opt(2000, 1, 4).unwrap();

        let plan = selector.plan_for(date).unwrap();
        assert_eq!(plan.cycle_len, 5);
        assert_eq!(plan.cycle_index, 0);
        assert_eq!(plan.full_tier, Tier::Tier1);
        assert_eq!(plan.full, vec!["A", "B"]);
        assert_eq!(plan.incremental, vec!["C", "D"]);

        let next = selector.plan_for(date.succ_opt().unwrap()).unwrap();
        assert_eq!(next.cycle_index, 1);
        assert_eq!(next.full, vec!["C"]);
        assert_eq!(next.incremental, vec!["A", "B"]);

        let tier2_day = selector.plan_for(date + chrono::Duration::days(2)).unwrap();
        assert_eq!(tier2_day.full_tier, Tier::Tier2);
        assert_eq!(tier2_day.full, vec!["D"]);
        assert_eq!(tier2_day.incremental, vec!["A", "B", "C"]);
    }
}
