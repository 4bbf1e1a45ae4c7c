use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() {
    let args = cli::Args::parse();

    // RUST_LOG overrides; -v raises the default level
    let default_level = if args.verbose > 0 { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}
