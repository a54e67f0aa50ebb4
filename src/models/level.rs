//! Backup level passed to the archiver

use serde::{Deserialize, Serialize};
use std::fmt;

/// Level of a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupLevel {
    /// Complete archive of the set's contents
    Full,
    /// Only changes since the previous run
    Incremental,
}

impl BackupLevel {
    /// Name understood by the archiver's `-level` flag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Incremental => "incremental",
        }
    }
}

impl fmt::Display for BackupLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
