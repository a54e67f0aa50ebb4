//! Schedule display formatting
//!
//! Formats daily plans and the backup cycle for terminal output.

use crate::config::BackupConfig;
use crate::models::flatten;
use crate::schedule::{Cycle, DailyPlan};

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Format a day's plan
pub fn format_plan(plan: &DailyPlan) -> String {
    let mut output = String::new();
    output.push_str(&format!("Backup plan for {}\n", plan.date));
    output.push_str(&format!(
        "Cycle position:     {}/{} (day {})\n",
        plan.cycle_index + 1,
        plan.cycle_len,
        plan.day_index
    ));
    output.push_str(&format!(
        "Full backup:        {} ({})\n",
        join_or_none(&plan.full),
        plan.full_tier
    ));
    output.push_str(&format!(
        "Incremental backup: {}\n",
        join_or_none(&plan.incremental)
    ));
    output
}

/// Format the whole cycle as a table, marking the turn at `today`
pub fn format_cycle(cycle: &Cycle, today: Option<usize>) -> String {
    if cycle.is_empty() {
        return "Backup cycle is empty.".to_string();
    }

    let slot_width = cycle
        .slots()
        .map(|s| s.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "  {:>4}  {:<5}  {:<slot_width$}\n",
        "Turn",
        "Tier",
        "Sets",
        slot_width = slot_width,
    ));
    output.push_str(&format!(
        "  {:->4}  {:-<5}  {:-<slot_width$}\n",
        "",
        "",
        "",
        slot_width = slot_width,
    ));

    for (i, turn) in cycle.turns().iter().enumerate() {
        let marker = if Some(i) == today { ">" } else { " " };
        output.push_str(&format!(
            "{} {:>4}  {:<5}  {}\n",
            marker,
            i,
            turn.tier.to_string(),
            turn.slot,
        ));
    }

    output
}

/// Worst-case days between full backups for every set
pub fn format_full_intervals(config: &BackupConfig, cycle: &Cycle) -> String {
    let mut names = flatten(&config.backup_tiers.tier1);
    names.extend(flatten(&config.backup_tiers.tier2));

    let name_width = names.iter().map(|n| n.len()).max().unwrap_or(3).max(3);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<5}  {:>16}\n",
        "Set",
        "Tier",
        "Max days to full",
        name_width = name_width,
    ));
    for name in &names {
        let tier = config
            .tier_of(name)
            .map(|t| t.to_string())
            .unwrap_or_default();
        let interval = cycle
            .max_full_interval(name)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<name_width$}  {:<5}  {:>16}\n",
            name,
            tier,
            interval,
            name_width = name_width,
        ));
    }
    output
}
