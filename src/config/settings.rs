//! Backup configuration for flexbackup-manager
//!
//! The configuration is a YAML document naming the tiers, their slots, the
//! incremental cadence of each tier and where data lives:
//!
//! ```yaml
//! root_directory: "/e"
//! dest_directory: "/backup/nfs"
//! subdirectory_expansions:
//!   A: true
//!   B: true
//!   C: false
//! exclude_patterns:
//!   - '\.cache'
//! incremental_backup_frequency:
//!   tier1: 1
//!   tier2: 3
//! backup_tiers:
//!   tier1:
//!     - - A
//!       - B
//!   tier2:
//!     - - C
//! ```
//!
//! The parsed value is immutable and handed to every component explicitly.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};
use crate::models::{flatten, Slot, Tier};

/// Default name of the archiver configuration template
pub const DEFAULT_TEMPLATE_FILE: &str = "flexbackup.conf.tmpl";

/// Default archiver executable
pub const DEFAULT_ARCHIVER: &str = "flexbackup";

/// Incremental backup cadence per tier, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalFrequency {
    pub tier1: u32,
    pub tier2: u32,
}

/// Slots of each tier, in rotation order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackupTiers {
    #[serde(default)]
    pub tier1: Vec<Slot>,
    #[serde(default)]
    pub tier2: Vec<Slot>,
}

/// Number of most recent snapshots kept per backup set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    #[serde(default = "default_tier1_retention")]
    pub tier1: u32,
    #[serde(default = "default_tier2_retention")]
    pub tier2: u32,
}

fn default_tier1_retention() -> u32 {
    2
}

fn default_tier2_retention() -> u32 {
    1
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            tier1: default_tier1_retention(),
            tier2: default_tier2_retention(),
        }
    }
}

impl RetentionPolicy {
    /// Retention count for a tier
    pub fn for_tier(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Tier1 => self.tier1,
            Tier::Tier2 => self.tier2,
        }
    }
}

/// External archiver invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiverSettings {
    /// Program to execute
    #[serde(default = "default_archiver")]
    pub program: String,

    /// Extra arguments appended to every invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_archiver() -> String {
    DEFAULT_ARCHIVER.to_string()
}

impl Default for ArchiverSettings {
    fn default() -> Self {
        Self {
            program: default_archiver(),
            extra_args: Vec::new(),
        }
    }
}

fn default_template_file() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE_FILE)
}

/// Complete backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory holding the original data, one subdirectory per backup set
    pub root_directory: PathBuf,

    /// Directory receiving backups, one subdirectory per backup set
    pub dest_directory: PathBuf,

    /// Whether a set's first-level subdirectories are archived separately
    #[serde(default)]
    pub subdirectory_expansions: BTreeMap<String, bool>,

    /// Archiver exclude expressions
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Incremental cadence per tier
    pub incremental_backup_frequency: IncrementalFrequency,

    /// Tier membership
    pub backup_tiers: BackupTiers,

    /// Snapshot retention per tier
    #[serde(default)]
    pub retention: RetentionPolicy,

    /// Archiver configuration template
    #[serde(default = "default_template_file")]
    pub template_file: PathBuf,

    /// Archiver invocation
    #[serde(default)]
    pub archiver: ArchiverSettings,
}

impl BackupConfig {
    /// Load, parse and validate a configuration file
    ///
    /// A relative `template_file` is resolved against the configuration
    /// file's directory.
    pub fn load(path: &Path) -> BackupResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_yaml_str(&contents).map_err(|e| match e {
            BackupError::Config(msg) => {
                BackupError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        if config.template_file.is_relative() {
            if let Some(parent) = path.parent() {
                config.template_file = parent.join(&config.template_file);
            }
        }

        Ok(config)
    }

    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> BackupResult<Self> {
        let config: BackupConfig = serde_yaml::from_str(yaml)
            .map_err(|e| BackupError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the scheduler relies on
    pub fn validate(&self) -> BackupResult<()> {
        let freq = self.incremental_backup_frequency;
        if freq.tier1 == 0 || freq.tier2 == 0 {
            return Err(BackupError::Config(
                "incremental_backup_frequency must be a positive number of days".into(),
            ));
        }

        if self.retention.tier1 == 0 || self.retention.tier2 == 0 {
            return Err(BackupError::Config(
                "retention must keep at least one snapshot per backup set".into(),
            ));
        }

        if self.backup_tiers.tier1.is_empty() && self.backup_tiers.tier2.is_empty() {
            return Err(BackupError::Config(
                "backup_tiers must name at least one backup set".into(),
            ));
        }

        let mut seen = HashSet::new();
        for tier in Tier::ALL {
            for (i, slot) in self.slots(tier).iter().enumerate() {
                if slot.is_empty() {
                    return Err(BackupError::Config(format!(
                        "backup_tiers.{}[{}] is an empty slot",
                        tier, i
                    )));
                }
                for name in slot {
                    if name.trim().is_empty() {
                        return Err(BackupError::Config(format!(
                            "backup_tiers.{}[{}] contains an empty set name",
                            tier, i
                        )));
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(BackupError::Config(format!(
                            "backup set '{}' appears more than once in backup_tiers",
                            name
                        )));
                    }
                    if !self.subdirectory_expansions.contains_key(name) {
                        return Err(BackupError::Config(format!(
                            "Missing field 'subdirectory_expansions.{}' in configuration file",
                            name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Slots of a tier in rotation order
    pub fn slots(&self, tier: Tier) -> &[Slot] {
        match tier {
            Tier::Tier1 => &self.backup_tiers.tier1,
            Tier::Tier2 => &self.backup_tiers.tier2,
        }
    }

    /// All set names of a tier
    pub fn sets(&self, tier: Tier) -> Vec<String> {
        flatten(self.slots(tier))
    }

    /// Tier a backup set belongs to
    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| self.slots(*tier).iter().any(|slot| slot.contains(name)))
    }

    /// Incremental cadence of a tier, in days
    pub fn incremental_frequency(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Tier1 => self.incremental_backup_frequency.tier1,
            Tier::Tier2 => self.incremental_backup_frequency.tier2,
        }
    }

    /// Whether a set's subdirectories are archived separately
    pub fn expands_subdirectories(&self, name: &str) -> BackupResult<bool> {
        self.subdirectory_expansions
            .get(name)
            .copied()
            .ok_or_else(|| BackupError::set_not_found(name))
    }

    /// Directory holding the original data of a set
    pub fn source_dir(&self, name: &str) -> PathBuf {
        self.root_directory.join(name)
    }
}
