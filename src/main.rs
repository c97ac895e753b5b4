use anyhow::Context;
use clap::Parser;
use tracing::error;

use waitfor::cli::Cli;
use waitfor::error::EXIT_FAILURE;
use waitfor::{logging, wait_for};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version go to stdout and are not failures
            let code = if e.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = logging::init(cli.quiet, cli.verbose) {
        eprintln!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }

    std::process::exit(run(cli));
}

/// Single top-level handler: every fatal error is logged here and mapped to
/// an exit code.
fn run(cli: Cli) -> i32 {
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return e.exit_code();
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    match runtime.block_on(wait_for::dispatch(&config)) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}
