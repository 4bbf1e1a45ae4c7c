use crate::cli::{ExitStatus, LockTarget};
use chrono::{DateTime, Local};
use lockfile::housekeep::inspect;
use lockfile::{LockStatus, MarkerKind, Result};

pub fn execute_status(target: &LockTarget) -> Result<ExitStatus> {
    let lock_path = target.resolve()?;

    match inspect(&lock_path)? {
        LockStatus::Unlocked => println!("unlocked"),
        LockStatus::Locked { kind, modified } => {
            let kind = match kind {
                MarkerKind::File => "file",
                MarkerKind::Directory => "directory",
            };
            match modified {
                Some(mtime) => {
                    let since: DateTime<Local> = mtime.into();
                    println!("locked ({}) since {}", kind, since.to_rfc3339());
                }
                None => println!("locked ({})", kind),
            }
        }
    }

    Ok(0)
}
