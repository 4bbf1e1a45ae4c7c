mod args;
mod clean_command;
mod run_command;
mod status_command;

use lockfile::lock::named_lock_path;
use lockfile::Result;
use std::path::PathBuf;

pub use args::{Args, Command, LockTarget};

/// Exit status the process should finish with.
pub type ExitStatus = i32;

pub fn run(args: Args) -> Result<ExitStatus> {
    match args.command {
        cmd @ Command::Run { .. } => run_command::execute_run(cmd),
        Command::Status { target } => status_command::execute_status(&target),
        cmd @ Command::Clean { .. } => clean_command::execute_clean(cmd, args.verbose > 0),
    }
}

impl LockTarget {
    pub fn resolve(&self) -> Result<PathBuf> {
        match (&self.lock, &self.name) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(name)) => named_lock_path(name),
            (None, None) => Err(lockfile::LockfileError::Other(
                "Lock path or --name required".to_string(),
            )),
        }
    }
}
