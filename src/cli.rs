//! Command-line surface
//!
//! `-h` is taken by `--host`, so help lives on `-?`/`--help`.

use crate::config::{default_timeout, Configuration, Mode};
use crate::error::WaitError;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "waitfor")]
#[command(
    about = "Wait until a host or port is up (or down), then run a follow-up command",
    after_help = "Examples:\n  waitfor -h db:5432 -t 60 -- ./server --migrate\n  waitfor -m wait-for-down -h old-primary -- ./promote.sh"
)]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    /// Print help
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Target to wait for: host:port in wait-for-up mode, host in wait-for-down mode
    #[arg(short = 'h', long = "host", value_name = "HOST")]
    pub host: String,

    /// Give up after this many seconds (one probe per second)
    #[arg(short, long, value_name = "SECONDS", default_value_t = default_timeout())]
    pub timeout: u64,

    /// wait-for-up or wait-for-down
    #[arg(short, long, value_name = "MODE", default_value = "wait-for-up")]
    pub mode: String,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a trace line for every probe attempt
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to run once the wait succeeds
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Validate the parsed arguments into an immutable [`Configuration`].
    pub fn into_config(self) -> Result<Configuration, WaitError> {
        let mode: Mode = self.mode.parse()?;
        Configuration::new(
            self.host,
            self.timeout,
            mode,
            self.quiet,
            self.verbose,
            self.command,
        )
    }
}
