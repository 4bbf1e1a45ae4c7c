//! Inter-process mutual exclusion using the filesystem as the coordination medium.
//!
//! A lock is a file (or directory) created only if absent. Whoever creates it
//! holds the lock until they remove it. Every operation returns its errors to
//! the caller and none are retried beyond the acquisition poll loop, so
//! callers must check each result before touching the guarded resource.

pub mod error;
pub mod housekeep;
pub mod lock;
pub mod utils;

pub use error::{LockfileError, Result};
pub use housekeep::{LockStatus, MarkerKind};
pub use lock::{FileLock, LockOptions, LockStrategy};
