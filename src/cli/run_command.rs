use crate::cli::{Command, ExitStatus};
use lockfile::utils::{parse_duration, parse_mode};
use lockfile::{FileLock, LockOptions, LockStrategy, LockfileError, Result};
use std::process;
use std::time::Duration;
use tracing::debug;

pub fn execute_run(cmd: Command) -> Result<ExitStatus> {
    let Command::Run {
        target,
        timeout,
        poll,
        directory,
        mode,
        command,
    } = cmd
    else {
        return Err(LockfileError::Other(
            "Internal error: expected Run command".to_string(),
        ));
    };

    let (program, program_args) = command
        .split_first()
        .ok_or_else(|| LockfileError::Other("Command required after '--'".to_string()))?;

    let timeout = match &timeout {
        Some(s) => parse_duration(s)?,
        None => Duration::ZERO,
    };

    let strategy = if directory {
        LockStrategy::ExclusiveDirectory
    } else {
        LockStrategy::ExclusiveFile
    };

    let mut options = LockOptions::new()
        .with_strategy(strategy)
        .with_poll_interval(parse_duration(&poll)?);
    if let Some(mode) = &mode {
        options = options.with_mode(parse_mode(mode)?);
    }

    let lock_path = target.resolve()?;
    let lock = FileLock::with_options(&lock_path, options)?;
    lock.lock(timeout)?;

    debug!("Running {:?} under lock {}", command, lock_path.display());
    let status = process::Command::new(program).args(program_args).status();

    // Release before reporting anything about the child
    let released = lock.unlock();

    let status = status.map_err(|e| LockfileError::CommandFailed {
        program: program.clone(),
        source: e,
    })?;
    released?;

    Ok(exit_status_code(status))
}

fn exit_status_code(status: process::ExitStatus) -> ExitStatus {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
