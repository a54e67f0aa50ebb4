//! Schedule CLI commands
//!
//! Read-only views of the schedule: today's plan and the whole cycle.

use chrono::NaiveDate;

use crate::config::BackupConfig;
use crate::display::{format_cycle, format_full_intervals, format_plan};
use crate::error::{BackupError, BackupResult};
use crate::models::parse_snapshot_date;
use crate::schedule::{cycle_index, DateClock, ScheduleSelector};

/// Parse a `YYYY-MM-DD` command line date
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_snapshot_date(s.trim()).ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

/// Print the plan of the clock's day
pub fn handle_plan_command(
    config: &BackupConfig,
    clock: &dyn DateClock,
    json: bool,
) -> BackupResult<()> {
    let plan = ScheduleSelector::new(config).plan_today(clock)?;

    if json {
        let text = serde_json::to_string_pretty(&plan)
            .map_err(|e| BackupError::Io(format!("Failed to serialize plan: {}", e)))?;
        println!("{}", text);
    } else {
        print!("{}", format_plan(&plan));
    }

    Ok(())
}

/// Print the backup cycle with the clock's day marked
pub fn handle_cycle_command(config: &BackupConfig, clock: &dyn DateClock) -> BackupResult<()> {
    let selector = ScheduleSelector::new(config);
    let cycle = selector.cycle();
    let today = cycle_index(clock.today(), cycle.len());

    println!("Backup Cycle ({} turns)", cycle.len());
    println!("============");
    print!("{}", format_cycle(cycle, today));
    println!();
    print!("{}", format_full_intervals(config, cycle));

    Ok(())
}
