use crate::error::{LockfileError, Result};
use crate::lock::path::{lock_parent_dir, probe_writable_dir};
use crate::lock::release::{PlatformRelease, ReleaseOrder};
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Filesystem primitive used to claim the lock resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockStrategy {
    /// Create a file with `O_CREAT | O_EXCL` and keep its handle while held.
    #[default]
    ExclusiveFile,
    /// Create a directory; its presence alone marks the lock as held.
    ///
    /// No handle is kept, so nothing ties the directory to this instance.
    /// If another party deletes it while waiters are polling, two waiters
    /// can each recreate it and both believe they won. Stale directories
    /// need an external tie-breaker before they are cleaned up.
    ExclusiveDirectory,
}

#[derive(Debug, Clone)]
pub struct LockOptions {
    pub strategy: LockStrategy,
    pub poll_interval: Duration,
    /// Permission bits for the created marker (Unix only).
    pub mode: Option<u32>,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            strategy: LockStrategy::ExclusiveFile,
            poll_interval: DEFAULT_POLL_INTERVAL,
            mode: None,
        }
    }
}

impl LockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: LockStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Marker permissions: owner read/write for files, owner-only for directories.
    pub fn effective_mode(&self) -> u32 {
        self.mode.unwrap_or(match self.strategy {
            LockStrategy::ExclusiveFile => 0o600,
            LockStrategy::ExclusiveDirectory => 0o700,
        })
    }
}

/// What this instance holds while locked.
#[derive(Debug)]
enum Held {
    File(File),
    Directory,
}

/// A filesystem-backed mutex shared between processes.
///
/// The lock resource on disk is the only state other processes see; the
/// held flag kept here only records what this instance last did. Every
/// error is returned to the caller, and a caller that ignores one may go on
/// without actually holding the lock.
///
/// Dropping a `FileLock` does not release the resource. Call
/// [`FileLock::unlock`], or the marker stays on disk until someone removes it.
/// A holder that crashes leaves a stale marker behind for the same reason.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    options: LockOptions,
    held: Mutex<Option<Held>>,
}

impl FileLock {
    /// Bind a lock to `path` with default options.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, LockOptions::default())
    }

    /// Bind a lock to `path`.
    ///
    /// Fails with [`LockfileError::DirectoryUnwritable`] when the parent
    /// directory cannot take new entries. Neither creates nor inspects the
    /// lock resource itself.
    pub fn with_options(path: impl AsRef<Path>, mut options: LockOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        probe_writable_dir(&lock_parent_dir(&path))?;

        if options.poll_interval.is_zero() {
            options.poll_interval = DEFAULT_POLL_INTERVAL;
        }

        Ok(FileLock {
            path,
            options,
            held: Mutex::new(None),
        })
    }

    /// Get the lock resource path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strategy(&self) -> LockStrategy {
        self.options.strategy
    }

    pub fn poll_interval(&self) -> Duration {
        self.options.poll_interval
    }

    /// Set the delay between acquisition attempts. Zero restores the default.
    pub fn set_poll_interval(&mut self, poll_interval: Duration) {
        self.options.poll_interval = if poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };
    }

    /// Whether this instance currently believes it holds the lock.
    pub fn is_locked(&self) -> bool {
        self.state().is_some()
    }

    /// Acquire the lock, polling until `timeout` elapses.
    ///
    /// Returns [`LockfileError::AlreadyLocked`] at once if this instance
    /// already holds it, [`LockfileError::Timeout`] if another holder kept it
    /// past the deadline, and [`LockfileError::Filesystem`] without retrying
    /// for any failure other than "already exists".
    pub fn lock(&self, timeout: Duration) -> Result<()> {
        debug!(
            "Acquiring lock: {} (strategy: {:?}, timeout: {:?})",
            self.path.display(),
            self.options.strategy,
            timeout
        );

        // None when the deadline is beyond what Instant can represent
        let deadline = Instant::now().checked_add(timeout);

        loop {
            match self.try_claim() {
                Ok(()) => {
                    debug!("Lock acquired: {}", self.path.display());
                    return Ok(());
                }
                Err(ClaimError::Contended) => {
                    if deadline.map_or(true, |d| Instant::now() < d) {
                        trace!("Lock busy, retrying: {}", self.path.display());
                        std::thread::sleep(self.options.poll_interval);
                        continue;
                    }
                    return Err(LockfileError::Timeout {
                        path: self.path.clone(),
                        duration: timeout,
                    });
                }
                Err(ClaimError::Fatal(e)) => return Err(e),
            }
        }
    }

    /// Single acquisition attempt.
    pub fn try_lock(&self) -> Result<()> {
        self.lock(Duration::ZERO)
    }

    /// Release the lock held by this instance.
    ///
    /// The held state is cleared even when removing the resource fails. A
    /// [`LockfileError::Filesystem`] here means the resource was tampered with
    /// while held; it says nothing about whether the lock is free.
    pub fn unlock(&self) -> Result<()> {
        let mut state = self.state();

        let held = state
            .take()
            .ok_or_else(|| LockfileError::NotLocked(self.path.clone()))?;

        let removed = match held {
            Held::File(handle) => PlatformRelease::release(&self.path, handle),
            Held::Directory => fs::remove_dir(&self.path),
        };

        removed.map_err(|e| LockfileError::filesystem(&self.path, e))?;

        debug!("Lock released: {}", self.path.display());
        Ok(())
    }

    /// Check local state, create the resource, record ownership, all under
    /// the state mutex. The mutex is not held while polling.
    fn try_claim(&self) -> std::result::Result<(), ClaimError> {
        let mut state = self.state();

        if state.is_some() {
            return Err(ClaimError::Fatal(LockfileError::AlreadyLocked(
                self.path.clone(),
            )));
        }

        let created = match self.options.strategy {
            LockStrategy::ExclusiveFile => self.create_file().map(Held::File),
            LockStrategy::ExclusiveDirectory => self.create_dir().map(|()| Held::Directory),
        };

        match created {
            Ok(held) => {
                *state = Some(held);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ClaimError::Contended),
            Err(e) => Err(ClaimError::Fatal(LockfileError::filesystem(&self.path, e))),
        }
    }

    fn create_file(&self) -> io::Result<File> {
        let mut opts = OpenOptions::new();
        opts.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(self.options.effective_mode());
            opts.custom_flags(libc::O_NOFOLLOW);
        }

        opts.open(&self.path)
    }

    fn create_dir(&self) -> io::Result<()> {
        let mut builder = DirBuilder::new();

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.options.effective_mode());
        }

        builder.create(&self.path)
    }

    fn state(&self) -> MutexGuard<'_, Option<Held>> {
        // Held state stays consistent even if another caller panicked
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

enum ClaimError {
    Contended,
    Fatal(LockfileError),
}
