//! Backup tiers and slots
//!
//! A tier is an ordered list of slots; a slot is a group of backup set names
//! that get their full backup on the same cycle turn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SLA class of a backup set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Higher SLA: more frequent full and incremental backups, longer retention
    Tier1,
    /// Lower SLA
    Tier2,
}

impl Tier {
    /// Both tiers, highest SLA first
    pub const ALL: [Tier; 2] = [Tier::Tier1, Tier::Tier2];

    /// Ordinal of the tier (1 or 2)
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier{}", self.ordinal())
    }
}

/// A group of backup set names backed up together on one cycle turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(Vec<String>);

impl Slot {
    /// Create a slot from set names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Set names in configuration order
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Check whether a set belongs to this slot
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl<'a> IntoIterator for &'a Slot {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Flatten slots into their set names, preserving order
pub fn flatten(slots: &[Slot]) -> Vec<String> {
    slots.iter().flat_map(|s| s.iter().cloned()).collect()
}
