//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the scheduler.

pub mod backup;
pub mod schedule;

pub use backup::{handle_gc_command, handle_run_command};
pub use schedule::{handle_cycle_command, handle_plan_command, parse_date_arg};
