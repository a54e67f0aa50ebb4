//! Display formatting for terminal output
//!
//! Provides utilities for formatting plans, the backup cycle and run
//! reports as plain-text tables.

pub mod report;
pub mod schedule;

pub use report::{format_gc_preview, format_run_report};
pub use schedule::{format_cycle, format_full_intervals, format_plan};
