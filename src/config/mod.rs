//! Configuration module for flexbackup-manager
//!
//! This module provides:
//! - Configuration file resolution
//! - The YAML backup configuration and its validation

pub mod paths;
pub mod settings;

pub use paths::ConfigPaths;
pub use settings::{BackupConfig, RetentionPolicy};
