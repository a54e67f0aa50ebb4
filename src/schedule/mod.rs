//! Deterministic backup scheduling
//!
//! Nothing is persisted between invocations: the schedule of a day is a pure
//! function of the configuration and the calendar date.
//!
//! - `clock`: the injected date and the day counter derived from it
//! - `cycle`: the full-backup rotation over both tiers
//! - `selector`: today's full and incremental sets
//!
//! # Example
//!
//! ```rust,ignore
//! use flexbackup::config::BackupConfig;
//! use flexbackup::schedule::{ScheduleSelector, SystemClock};
//!
//! let config = BackupConfig::load(path)?;
//! let plan = ScheduleSelector::new(&config).plan_today(&SystemClock)?;
//! println!("full: {:?}, incremental: {:?}", plan.full, plan.incremental);
//! ```

pub mod clock;
pub mod cycle;
pub mod selector;

pub use clock::{cycle_index, day_index, DateClock, FixedClock, SystemClock};
pub use cycle::{Cycle, CycleTurn};
pub use selector::{select, DailyPlan, ScheduleSelector, Selection};
