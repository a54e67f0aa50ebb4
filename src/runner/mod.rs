//! Archiver collaborator
//!
//! The scheduler only knows how to ask for "run backup of set X at level L".
//! [`BackupRunner`] is that seam; [`FlexbackupRunner`] implements it with
//! the flexbackup program, rendering a configuration file per set from a
//! template first.

pub mod flexbackup;
pub mod template;
pub mod wrappers;

pub use flexbackup::FlexbackupRunner;
pub use template::{render, ArchiverTemplate};
pub use wrappers::WrapperScripts;

use crate::error::BackupResult;
use crate::models::BackupLevel;

/// Executes one archiver run to completion
pub trait BackupRunner {
    fn run(&self, set: &str, level: BackupLevel) -> BackupResult<()>;
}
