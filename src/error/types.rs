use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockfileError {
    #[error("Directory {dir} is not writable: {source}")]
    DirectoryUnwritable { dir: PathBuf, source: io::Error },

    #[error("Failed to acquire lock on {path}: timeout after {duration:?}")]
    Timeout { path: PathBuf, duration: Duration },

    #[error("Lock {0} is already held by this instance")]
    AlreadyLocked(PathBuf),

    #[error("Lock {0} is not held by this instance")]
    NotLocked(PathBuf),

    #[error("Filesystem error on lock {path}: {source}")]
    Filesystem { path: PathBuf, source: io::Error },

    #[error("Invalid duration format '{input}': {message}")]
    InvalidDuration { input: String, message: String },

    #[error("Invalid file permissions '{input}': must be octal (e.g., 0600)")]
    InvalidPermissions { input: String },

    #[error("Invalid lock name '{name}': {reason}")]
    InvalidLockName { name: String, reason: String },

    #[error("Failed to create lock cache directory {path}: {source}")]
    CacheDirectoryFailed { path: PathBuf, source: io::Error },

    #[error("Failed to run command '{program}': {source}")]
    CommandFailed { program: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

impl LockfileError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LockfileError::Timeout { .. } | LockfileError::AlreadyLocked(_) => 2,
            LockfileError::Filesystem { source, .. } | LockfileError::Io(source)
                if source.kind() == io::ErrorKind::Interrupted =>
            {
                3
            }
            _ => 1,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LockfileError::Timeout { .. })
    }

    pub fn is_already_locked(&self) -> bool {
        matches!(self, LockfileError::AlreadyLocked(_))
    }

    pub fn is_not_locked(&self) -> bool {
        matches!(self, LockfileError::NotLocked(_))
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LockfileError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LockfileError>;
