//! Configuration file resolution for flexbackup-manager
//!
//! ## Resolution Order
//!
//! 1. An explicit path given on the command line
//! 2. `FLEXBACKUP_CONFIG` environment variable (if set)
//! 3. `home-backup-list.yaml` in the working directory, when it exists
//! 4. The platform configuration directory, e.g.
//!    `~/.config/flexbackup-manager/home-backup-list.yaml`

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::BackupError;

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV_VAR: &str = "FLEXBACKUP_CONFIG";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "home-backup-list.yaml";

/// Resolved location of the configuration file
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    config_file: PathBuf,
}

impl ConfigPaths {
    /// Resolve the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if no explicit path is given and the platform
    /// configuration directory cannot be determined.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, BackupError> {
        if let Some(path) = explicit {
            return Ok(Self::with_config_file(path.to_path_buf()));
        }

        if let Ok(custom) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(Self::with_config_file(PathBuf::from(custom)));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(Self::with_config_file(local));
        }

        let dirs = ProjectDirs::from("", "", "flexbackup-manager").ok_or_else(|| {
            BackupError::Config("Could not determine the configuration directory".into())
        })?;
        Ok(Self::with_config_file(dirs.config_dir().join(CONFIG_FILE_NAME)))
    }

    /// Use a specific configuration file (useful for testing)
    pub fn with_config_file(config_file: PathBuf) -> Self {
        Self { config_file }
    }

    /// Path to the configuration file
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Directory containing the configuration file
    pub fn config_dir(&self) -> PathBuf {
        self.config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Check whether the configuration file exists
    pub fn exists(&self) -> bool {
        self.config_file.exists()
    }
}
