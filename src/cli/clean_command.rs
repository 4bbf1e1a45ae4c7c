use crate::cli::{Command, ExitStatus};
use lockfile::housekeep::{clean_stale, CleanConfig};
use lockfile::lock::get_lock_cache_dir;
use lockfile::utils::parse_duration;
use lockfile::{LockfileError, Result};

pub fn execute_clean(cmd: Command, verbose: bool) -> Result<ExitStatus> {
    let Command::Clean {
        locks,
        named,
        older_than,
        dry_run,
    } = cmd
    else {
        return Err(LockfileError::Other(
            "Internal error: expected Clean command".to_string(),
        ));
    };

    if locks.is_empty() && !named {
        return Err(LockfileError::Other(
            "Must provide LOCK paths or --named".to_string(),
        ));
    }

    let older_than = match &older_than {
        Some(s) => Some(parse_duration(s)?),
        None => None,
    };

    let scan_dir = if named {
        Some(get_lock_cache_dir()?)
    } else {
        None
    };

    let config = CleanConfig {
        targets: locks,
        scan_dir,
        older_than,
        dry_run,
    };

    let cleaned = clean_stale(&config)?;

    for path in &cleaned {
        println!(
            "{}{}",
            if dry_run {
                "[DRY RUN] Would delete: "
            } else {
                "Deleted: "
            },
            path.display()
        );
    }

    if verbose || dry_run {
        eprintln!("Cleaned {} lock marker(s)", cleaned.len());
    }

    Ok(0)
}
