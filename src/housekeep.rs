//! External cleanup of lock markers left behind by holders that never
//! released them. Nothing here runs implicitly: a lock never removes a
//! marker it did not create.

use crate::error::{LockfileError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    Unlocked,
    Locked {
        kind: MarkerKind,
        modified: Option<SystemTime>,
    },
}

impl LockStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockStatus::Locked { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleanConfig {
    /// Explicit marker paths to consider.
    pub targets: Vec<PathBuf>,
    /// Also consider every `*.lock` entry directly inside this directory.
    pub scan_dir: Option<PathBuf>,
    /// Only remove markers older than this. `None` removes all.
    pub older_than: Option<Duration>,
    pub dry_run: bool,
}

/// Report whether a marker exists at `path`, without following symlinks.
pub fn inspect(path: &Path) -> Result<LockStatus> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockStatus::Unlocked),
        Err(e) => return Err(LockfileError::filesystem(path, e)),
    };

    let kind = if metadata.is_dir() {
        MarkerKind::Directory
    } else {
        MarkerKind::File
    };

    Ok(LockStatus::Locked {
        kind,
        modified: metadata.modified().ok(),
    })
}

/// Remove stale lock markers
pub fn clean_stale(config: &CleanConfig) -> Result<Vec<PathBuf>> {
    let mut candidates = config.targets.clone();
    if let Some(dir) = &config.scan_dir {
        candidates.extend(collect_lock_entries(dir)?);
    }

    let mut cleaned = Vec::new();

    for path in candidates {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No marker at {}, skipping", path.display());
                continue;
            }
            Err(e) => return Err(LockfileError::filesystem(&path, e)),
        };

        if metadata.file_type().is_symlink() {
            debug!("Skipping symlink: {}", path.display());
            continue;
        }

        if !is_old_enough(&metadata, config.older_than) {
            debug!("Lock marker too recent, skipping: {}", path.display());
            continue;
        }

        if config.dry_run {
            debug!("Would remove lock marker: {}", path.display());
            cleaned.push(path);
            continue;
        }

        let removed = if metadata.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };

        match removed {
            Ok(()) => {
                debug!("Removed stale lock marker: {}", path.display());
                cleaned.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Released by its holder since we looked
                debug!("Lock marker already removed: {}", path.display());
            }
            Err(_) if metadata.is_dir() && !is_empty_dir(&path) => {
                debug!("Directory has contents, not a lock marker: {}", path.display());
            }
            Err(e) => return Err(LockfileError::filesystem(&path, e)),
        }
    }

    Ok(cleaned)
}

fn collect_lock_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| LockfileError::filesystem(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(LockfileError::Io)?.path();
        if is_lock_marker_name(&path) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn is_lock_marker_name(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("lock")
}

fn is_old_enough(metadata: &fs::Metadata, older_than: Option<Duration>) -> bool {
    let Some(max_age) = older_than else {
        return true;
    };

    match metadata.modified().map(|mtime| SystemTime::now().duration_since(mtime)) {
        Ok(Ok(age)) => age >= max_age,
        // mtime in the future or unavailable: not provably stale
        _ => false,
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
