//! File I/O utilities with atomic updates
//!
//! Provides safe file operations that won't leave half-written files or
//! dangling pointers behind on failure.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::BackupError;

/// Write text to a file atomically (write to temp, then rename)
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), BackupError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BackupError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path)
        .map_err(|e| BackupError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|e| BackupError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    writer
        .flush()
        .map_err(|e| BackupError::Io(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| BackupError::Io(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BackupError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Write a shell script and mark it executable
pub fn write_executable<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), BackupError> {
    let path = path.as_ref();
    write_atomic(path, contents)?;
    set_executable(path)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), BackupError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o775)).map_err(|e| {
        BackupError::Io(format!(
            "Failed to make {} executable: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), BackupError> {
    Ok(())
}

/// Point `link` at `target`, replacing any existing symlink atomically
///
/// A temporary link is created next to `link` and renamed over it, so
/// readers always see either the old or the new target.
#[cfg(unix)]
pub fn replace_symlink_atomic(target: &Path, link: &Path) -> Result<(), BackupError> {
    let file_name = link
        .file_name()
        .ok_or_else(|| BackupError::Io(format!("Invalid symlink path: {}", link.display())))?;
    let temp_link = link.with_file_name(format!(
        ".{}.tmp-{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let _ = fs::remove_file(&temp_link);
    std::os::unix::fs::symlink(target, &temp_link).map_err(|e| {
        BackupError::Io(format!(
            "Failed creating symlink: {} -> {}: {}",
            link.display(),
            target.display(),
            e
        ))
    })?;

    fs::rename(&temp_link, link).map_err(|e| {
        let _ = fs::remove_file(&temp_link);
        BackupError::Io(format!(
            "Failed creating symlink: {} -> {}: {}",
            link.display(),
            target.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
pub fn replace_symlink_atomic(target: &Path, link: &Path) -> Result<(), BackupError> {
    Err(BackupError::Io(format!(
        "Symlinks are not supported on this platform: {} -> {}",
        link.display(),
        target.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flexbackup.conf");

        write_atomic(&path, "$set{'A'} = '/e/A';\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "$set{'A'} = '/e/A';\n");
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flexbackup.conf");

        write_atomic(&path, "x").unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("flexbackup.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("x.conf");

        write_atomic(&path, "x").unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gzip");

        write_executable(&path, "#!/bin/sh\nexec pigz \"$@\"\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_symlink_creates_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("2023-01-01")).unwrap();
        fs::create_dir(temp_dir.path().join("2023-01-02")).unwrap();
        let link = temp_dir.path().join("current");

        replace_symlink_atomic(Path::new("2023-01-01"), &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("2023-01-01"));

        replace_symlink_atomic(Path::new("2023-01-02"), &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("2023-01-02"));
        assert!(link.is_dir());

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
