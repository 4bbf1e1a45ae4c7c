use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lockfile",
    version,
    about = "Inter-process mutual exclusion through lock files and directories",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Where the lock lives: an explicit path or a name in the lock cache directory.
#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct LockTarget {
    /// Lock file or directory path
    #[arg(value_name = "LOCK")]
    pub lock: Option<PathBuf>,

    /// Named lock stored in the user cache directory
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire the lock, run a command, then release the lock
    Run {
        #[command(flatten)]
        target: LockTarget,

        /// How long to keep retrying (e.g. "500ms", "30s", "5m"); default is a single attempt
        #[arg(short = 't', long, value_name = "DURATION")]
        timeout: Option<String>,

        /// Delay between attempts
        #[arg(long, value_name = "DURATION", default_value = "100ms")]
        poll: String,

        /// Use a directory instead of a file as the lock marker
        #[arg(long)]
        directory: bool,

        /// Permissions of the created marker (octal, e.g., 0600)
        #[arg(short = 'm', long, value_name = "OCTAL")]
        mode: Option<String>,

        /// Command to run while holding the lock
        #[arg(last = true, value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Show whether a lock marker is present
    Status {
        #[command(flatten)]
        target: LockTarget,
    },

    /// Remove lock markers left behind by holders that never released them
    Clean {
        /// Lock markers to remove
        #[arg(value_name = "LOCK")]
        locks: Vec<PathBuf>,

        /// Also scan the named lock directory
        #[arg(long)]
        named: bool,

        /// Only remove markers older than this (e.g., "2h")
        #[arg(long, value_name = "DURATION")]
        older_than: Option<String>,

        /// Show what would be removed without removing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}
