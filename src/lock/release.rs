use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Order in which a held lock file is unlinked and its handle closed.
///
/// Platforms that allow unlinking an open file remove first, so the marker
/// disappears while the handle still pins it. Platforms that refuse to
/// delete an open file must close first.
pub trait ReleaseOrder {
    fn release(path: &Path, handle: File) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct RemoveThenClose;

impl ReleaseOrder for RemoveThenClose {
    fn release(path: &Path, handle: File) -> io::Result<()> {
        let removed = fs::remove_file(path);
        // Handle is closed whether or not the unlink succeeded.
        drop(handle);
        removed
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CloseThenRemove;

impl ReleaseOrder for CloseThenRemove {
    fn release(path: &Path, handle: File) -> io::Result<()> {
        drop(handle);
        fs::remove_file(path)
    }
}

#[cfg(not(windows))]
pub type PlatformRelease = RemoveThenClose;

#[cfg(windows)]
pub type PlatformRelease = CloseThenRemove;
