//! flexbackup-manager - Tiered backup scheduler
//!
//! This library decides, for each calendar day, which backup sets receive
//! a full backup and which an incremental one, drives the external
//! `flexbackup` archiver to produce them, and prunes old snapshots
//! according to a per-tier retention policy.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration file loading, validation and path resolution
//! - `error`: Custom error types
//! - `models`: Tiers, slots, backup levels and snapshots
//! - `schedule`: Cycle construction, the date clock and daily selection
//! - `storage`: The on-disk snapshot tree
//! - `runner`: Driving the external archiver
//! - `backup`: Retention garbage collection and the daily run
//! - `display`: Plain-text formatting of plans and reports
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use flexbackup::config::BackupConfig;
//! use flexbackup::schedule::{ScheduleSelector, SystemClock};
//!
//! let config = BackupConfig::load(Path::new("home-backup-list.yaml"))?;
//! let plan = ScheduleSelector::new(&config).plan_today(&SystemClock)?;
//! println!("full: {:?}, incremental: {:?}", plan.full, plan.incremental);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod runner;
pub mod schedule;
pub mod storage;

pub use error::BackupError;
