//! Compressor and tar wrapper scripts
//!
//! flexbackup takes the paths of its `gzip` and `tar` programs from its
//! configuration. Small wrapper scripts pass the extra flags we want: pigz
//! limited to part of the CPUs, and tar run under `nocache` so a backup does
//! not evict the page cache. The scripts and the rendered configuration live
//! in one temporary directory removed when the wrappers are dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{BackupError, BackupResult};
use crate::storage::write_executable;

/// Prefix of every temporary file and directory we create
pub const TEMPFILE_PREFIX: &str = "flexbackup-";

const GZIP_WRAPPER: &str = "exec /usr/bin/env pigz -p 10 -f \"$@\"";
const TAR_WRAPPER: &str = "exec /usr/bin/env nocache -n 2 /bin/tar --numeric-owner \"$@\"";

/// Generated wrapper scripts in a private temporary directory
#[derive(Debug)]
pub struct WrapperScripts {
    dir: TempDir,
    gzip: PathBuf,
    tar: PathBuf,
}

impl WrapperScripts {
    /// Write the wrappers into a fresh temporary directory
    pub fn create() -> BackupResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(TEMPFILE_PREFIX)
            .tempdir()
            .map_err(|e| BackupError::Io(format!("Failed to create temporary directory: {}", e)))?;

        let gzip = dir.path().join("gzip");
        let tar = dir.path().join("tar");
        write_executable(&gzip, &script(GZIP_WRAPPER))?;
        write_executable(&tar, &script(TAR_WRAPPER))?;

        Ok(Self { dir, gzip, tar })
    }

    /// Directory holding the generated files
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn gzip(&self) -> &Path {
        &self.gzip
    }

    pub fn tar(&self) -> &Path {
        &self.tar
    }

    /// Path of the rendered archiver configuration
    pub fn conf_file(&self) -> PathBuf {
        self.dir.path().join("flexbackup.conf")
    }
}

fn script(body: &str) -> String {
    format!("#!/bin/sh\n{}\n", body)
}
