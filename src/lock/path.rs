use crate::error::{LockfileError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Directory that holds the lock resource at `lock_path`.
///
/// A bare relative name such as `app.lock` lives in the current directory.
pub fn lock_parent_dir(lock_path: &Path) -> PathBuf {
    match lock_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check that `dir` exists and accepts new entries by creating and removing
/// a scratch file in it.
///
/// The result is only a snapshot: the directory may change before the lock
/// is first acquired.
pub fn probe_writable_dir(dir: &Path) -> Result<()> {
    let probe = tempfile::Builder::new()
        .prefix(".lockfile-probe")
        .tempfile_in(dir)
        .map_err(|e| LockfileError::DirectoryUnwritable {
            dir: dir.to_path_buf(),
            source: e,
        })?;

    trace!("Probe created: {}", probe.path().display());

    probe.close().map_err(|e| LockfileError::DirectoryUnwritable {
        dir: dir.to_path_buf(),
        source: e,
    })
}

/// Resolve a named lock to `<cache dir>/locks/<name>.lock`.
pub fn named_lock_path(name: &str) -> Result<PathBuf> {
    validate_lock_name(name)?;
    Ok(get_lock_cache_dir()?.join(format!("{}.lock", name)))
}

fn validate_lock_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| LockfileError::InvalidLockName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(invalid("name must not contain path separators"));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("name must be a plain file name")),
    }
}

/// Get the platform-specific cache directory for named locks.
///
/// Returns an error if the cache directory cannot be determined
/// (e.g., on systems without a home directory).
pub fn get_lock_cache_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "lockfile").ok_or_else(|| {
        LockfileError::Other(
            "Failed to determine lock cache directory. \
                 Pass an explicit lock path instead of --name."
                .to_string(),
        )
    })?;

    let cache_dir = proj_dirs.cache_dir().join("locks");

    if !cache_dir.exists() {
        fs::create_dir_all(&cache_dir).map_err(|e| LockfileError::CacheDirectoryFailed {
            path: cache_dir.clone(),
            source: e,
        })?;
    }

    Ok(cache_dir)
}
