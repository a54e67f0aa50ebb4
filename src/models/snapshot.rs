//! Dated snapshot directories
//!
//! Every full backup creates a directory named after the day it ran
//! (`YYYY-MM-DD`) under the backup set's store directory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// strftime format of snapshot directory names
pub const SNAPSHOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A retained snapshot directory of a backup set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full path to the snapshot directory
    pub path: PathBuf,
    /// Day the snapshot was taken, parsed from the directory name
    pub date: NaiveDate,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            path: path.into(),
            date,
        }
    }

    /// Directory name of the snapshot
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format_snapshot_date(self.date))
    }
}

/// Parse a snapshot directory name, returning `None` for anything that is not a date
pub fn parse_snapshot_date(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name, SNAPSHOT_DATE_FORMAT).ok()
}

/// Directory name for a snapshot taken on `date`
pub fn format_snapshot_date(date: NaiveDate) -> String {
    date.format(SNAPSHOT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_date() {
        let date = parse_snapshot_date("2023-01-03").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
    }

    #[test]
    fn test_parse_rejects_non_dates() {
        assert!(parse_snapshot_date("current").is_none());
        assert!(parse_snapshot_date("2023-13-01").is_none());
        assert!(parse_snapshot_date("").is_none());
    }

    #[test]
    fn test_format_snapshot_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(format_snapshot_date(date), "2024-02-09");
    }

    #[test]
    fn test_snapshot_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        let snapshot = Snapshot::new("/backup/photos/2024-02-09", date);
        assert_eq!(snapshot.name(), "2024-02-09");
    }
}
