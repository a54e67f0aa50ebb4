//! Archiver configuration templating
//!
//! flexbackup reads its settings from a Perl configuration file. A template
//! with `@@KEY@@` placeholders is filled in for each backup set before the
//! archiver runs. Supported keys:
//!
//! - `SET_NAME`: the backup set
//! - `SET_CONTENT`: space separated directories to archive
//! - `BACKUP_STORE_DIR`: the set's `current` snapshot directory
//! - `BACKUP_EXCLUDE_PATTERN`: `$exclude_expr[i] = '...';` lines
//! - `GZIP`, `TAR`: wrapper scripts for the compressor and tar

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BackupConfig;
use crate::error::{BackupError, BackupResult};

/// Subdirectories never archived on their own
pub const SUBDIR_EXCLUDE_LIST: &[&str] = &["lost+found"];

/// Replace every `@@KEY@@` placeholder with its value
pub fn render(template: &str, substitutions: &[(&str, String)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("@@{}@@", key), value)
        })
}

/// Exclude expressions in flexbackup's configuration syntax
pub fn exclude_pattern_lines(patterns: &[String]) -> String {
    patterns
        .iter()
        .enumerate()
        .map(|(i, pat)| format!("$exclude_expr[{}] = '{}';\n", i, pat))
        .collect()
}

/// Directories archived for a backup set
///
/// With subdirectory expansion on, each first-level subdirectory of the set
/// is listed separately so restores can find them faster.
pub fn directory_listing(config: &BackupConfig, set: &str) -> BackupResult<Vec<PathBuf>> {
    let expand = config.expands_subdirectories(set)?;

    let path = config.source_dir(set);
    if !path.is_dir() {
        return Err(BackupError::directory_not_found(path.display().to_string()));
    }

    if !expand {
        return Ok(vec![path]);
    }

    let mut listing = Vec::new();
    for entry in fs::read_dir(&path)? {
        let entry = entry?;
        let name = entry.file_name();
        if SUBDIR_EXCLUDE_LIST.iter().any(|ex| name == *ex) {
            continue;
        }
        let sub = entry.path();
        if sub.is_dir() {
            listing.push(sub);
        }
    }
    listing.sort();
    Ok(listing)
}

/// Template for per-set archiver configuration files
#[derive(Debug, Clone)]
pub struct ArchiverTemplate {
    text: String,
}

impl ArchiverTemplate {
    /// Read the template file
    pub fn load(path: &Path) -> BackupResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            BackupError::Template(format!("Error opening file {}: {}", path.display(), e))
        })?;
        Ok(Self { text })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Fill in the template for one backup set
    pub fn render_for(
        &self,
        config: &BackupConfig,
        set: &str,
        store_dir: &Path,
        gzip: &Path,
        tar: &Path,
    ) -> BackupResult<String> {
        let content = directory_listing(config, set)?
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let substitutions = [
            ("SET_NAME", set.to_string()),
            ("SET_CONTENT", content),
            ("BACKUP_STORE_DIR", store_dir.display().to_string()),
            (
                "BACKUP_EXCLUDE_PATTERN",
                exclude_pattern_lines(&config.exclude_patterns),
            ),
            ("GZIP", gzip.display().to_string()),
            ("TAR", tar.display().to_string()),
        ];

        Ok(render(&self.text, &substitutions))
    }
}
