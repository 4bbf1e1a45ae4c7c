use lockfile::lock::{FileLock, LockOptions, LockStrategy};
use lockfile::LockfileError;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn fast(strategy: LockStrategy) -> LockOptions {
    LockOptions::new()
        .with_strategy(strategy)
        .with_poll_interval(Duration::from_millis(10))
}

#[test]
fn test_lock_acquire_and_release() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("test.lock");

    let lock = FileLock::new(&lock_path).unwrap();
    assert!(!lock_path.exists(), "Construction must not create the lock");

    lock.lock(Duration::from_secs(1)).unwrap();
    assert!(lock_path.is_file());
    assert!(lock.is_locked());
    assert_eq!(fs::metadata(&lock_path).unwrap().len(), 0);

    lock.unlock().unwrap();
    assert!(!lock_path.exists());
    assert!(!lock.is_locked());
}

#[test]
fn test_directory_strategy_round_trip() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("test.lock");

    let lock = FileLock::with_options(&lock_path, fast(LockStrategy::ExclusiveDirectory)).unwrap();
    assert_eq!(lock.strategy(), LockStrategy::ExclusiveDirectory);

    lock.lock(Duration::from_secs(1)).unwrap();
    assert!(lock_path.is_dir());
    assert_eq!(fs::read_dir(&lock_path).unwrap().count(), 0);

    lock.unlock().unwrap();
    assert!(!lock_path.exists());
}

#[test]
fn test_lock_is_reusable() {
    let temp = TempDir::new().unwrap();
    let lock = FileLock::new(temp.path().join("test.lock")).unwrap();

    for _ in 0..5 {
        lock.lock(Duration::from_secs(1)).unwrap();
        lock.unlock().unwrap();
    }
}

#[test]
fn test_lock_timeout() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("test.lock");

    let holder = FileLock::new(&lock_path).unwrap();
    let waiter = FileLock::new(&lock_path).unwrap();
    holder.lock(Duration::from_secs(1)).unwrap();

    let start = Instant::now();
    let err = waiter.lock(Duration::from_millis(500)).unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_timeout(), "Expected timeout, got: {}", err);
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(1500));
    assert!(!waiter.is_locked());

    holder.unlock().unwrap();
}

#[test]
fn test_try_lock_single_attempt() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("test.lock");

    let holder = FileLock::new(&lock_path).unwrap();
    let waiter = FileLock::new(&lock_path).unwrap();
    holder.try_lock().unwrap();

    let start = Instant::now();
    let err = waiter.try_lock().unwrap_err();
    assert!(err.is_timeout());
    assert!(start.elapsed() < Duration::from_millis(500));

    holder.unlock().unwrap();
    waiter.try_lock().unwrap();
    waiter.unlock().unwrap();
}

#[test]
fn test_lock_twice_returns_already_locked() {
    let temp = TempDir::new().unwrap();
    let lock = FileLock::new(temp.path().join("test.lock")).unwrap();

    lock.lock(Duration::from_secs(1)).unwrap();

    let start = Instant::now();
    let err = lock.lock(Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, LockfileError::AlreadyLocked(_)));
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(lock.is_locked());

    lock.unlock().unwrap();
}

#[test]
fn test_unlock_when_unlocked() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("test.lock");
    let lock = FileLock::new(&lock_path).unwrap();

    // A marker owned by someone else must survive a stray unlock
    fs::write(&lock_path, b"").unwrap();

    let err = lock.unlock().unwrap_err();
    assert!(matches!(err, LockfileError::NotLocked(_)));
    assert!(lock_path.exists());
}

#[test]
fn test_unlock_after_external_removal() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("test.lock");
    let lock = FileLock::new(&lock_path).unwrap();

    lock.lock(Duration::from_secs(1)).unwrap();
    fs::remove_file(&lock_path).unwrap();

    let err = lock.unlock().unwrap_err();
    assert!(matches!(err, LockfileError::Filesystem { .. }));
    assert!(!lock.is_locked(), "Held state is cleared even on failure");

    assert!(lock.unlock().unwrap_err().is_not_locked());
    lock.lock(Duration::from_secs(1)).unwrap();
    lock.unlock().unwrap();
}

#[test]
fn test_filesystem_error_is_not_retried() {
    let temp = TempDir::new().unwrap();
    let subdir = temp.path().join("sub");
    fs::create_dir(&subdir).unwrap();

    let lock = FileLock::new(subdir.join("test.lock")).unwrap();
    fs::remove_dir(&subdir).unwrap();

    let start = Instant::now();
    let err = lock.lock(Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, LockfileError::Filesystem { .. }), "got: {}", err);
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!lock.is_locked());
}

#[test]
fn test_huge_timeout_still_acquires() {
    let temp = TempDir::new().unwrap();
    let lock = FileLock::new(temp.path().join("test.lock")).unwrap();

    lock.lock(Duration::MAX).unwrap();
    lock.unlock().unwrap();
}

#[test]
fn test_relative_lock_path() {
    // Probe and lock both resolve against the current directory
    let name = format!("lockfile-relative-{}.lock", std::process::id());
    let lock = FileLock::new(&name).unwrap();

    lock.lock(Duration::from_secs(1)).unwrap();
    assert!(std::path::Path::new(&name).exists());
    lock.unlock().unwrap();
    assert!(!std::path::Path::new(&name).exists());
}

#[cfg(unix)]
#[test]
fn test_marker_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("file.lock");
    let dir_path = temp.path().join("dir.lock");

    let file_lock = FileLock::new(&file_path).unwrap();
    let dir_lock =
        FileLock::with_options(&dir_path, fast(LockStrategy::ExclusiveDirectory)).unwrap();

    file_lock.lock(Duration::from_secs(1)).unwrap();
    dir_lock.lock(Duration::from_secs(1)).unwrap();

    let file_mode = fs::metadata(&file_path).unwrap().permissions().mode() & 0o777;
    let dir_mode = fs::metadata(&dir_path).unwrap().permissions().mode() & 0o777;
    assert_eq!(file_mode & 0o077, 0, "File marker must be owner-only");
    assert_eq!(dir_mode & 0o077, 0, "Directory marker must be owner-only");

    file_lock.unlock().unwrap();
    dir_lock.unlock().unwrap();
}

#[cfg(unix)]
#[test]
fn test_symlink_at_lock_path_is_contention() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    let lock_path = temp.path().join("test.lock");
    std::os::unix::fs::symlink(&target, &lock_path).unwrap();

    let lock = FileLock::with_options(&lock_path, fast(LockStrategy::ExclusiveFile)).unwrap();
    let err = lock.try_lock().unwrap_err();
    assert!(err.is_timeout(), "got: {}", err);
    assert!(!target.exists(), "Symlink target must not be created");
}
