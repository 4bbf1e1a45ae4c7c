mod acquisition;
mod path;
mod release;

pub use acquisition::{FileLock, LockOptions, LockStrategy, DEFAULT_POLL_INTERVAL};
pub use path::{get_lock_cache_dir, lock_parent_dir, named_lock_path, probe_writable_dir};
pub use release::{CloseThenRemove, PlatformRelease, ReleaseOrder, RemoveThenClose};
