//! Core data models for flexbackup-manager
//!
//! This module contains the data structures of the scheduling domain:
//! tiers and their slots, backup levels, and dated snapshots.

pub mod level;
pub mod snapshot;
pub mod tier;

pub use level::BackupLevel;
pub use snapshot::{format_snapshot_date, parse_snapshot_date, Snapshot, SNAPSHOT_DATE_FORMAT};
pub use tier::{flatten, Slot, Tier};
