//! Wait for a dependency, then hand off
//!
//! The mode picks both how the target is checked and when the wait is over:
//!
//! | mode            | target      | probe        | done when      |
//! |-----------------|-------------|--------------|----------------|
//! | `wait-for-up`   | `host:port` | TCP connect  | connect works  |
//! | `wait-for-down` | `host`      | ICMP echo    | no echo reply  |
//!
//! ```text
//! waitfor -h db:5432 -t 60 -- ./server --migrate
//! ```

pub mod poll;
pub mod probe;


pub use poll::{Expectation, PollLoop, PollReport, POLL_INTERVAL};
pub use probe::{IcmpEchoProbe, Probe, ProbeOutcome, TcpConnectProbe, PROBE_TIMEOUT};

use crate::config::{Configuration, Mode};
use crate::error::WaitError;
use crate::handoff::handoff;
use tracing::info;

/// What to probe, derived from the raw target string and the mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// TCP endpoint for `wait-for-up`
    Endpoint { host: String, port: String },
    /// Bare host for `wait-for-down`
    Host(String),
}

impl Target {
    /// Split `raw` the way `mode` expects.
    ///
    /// Endpoints split on the first colon; a missing colon yields an empty
    /// port, which is left for the probe to fail on. `[addr]:port` is
    /// accepted for IPv6 literals.
    pub fn parse(mode: Mode, raw: &str) -> Self {
        match mode {
            Mode::WaitForUp => {
                let (host, port) = split_endpoint(raw);
                Target::Endpoint {
                    host: host.to_string(),
                    port: port.to_string(),
                }
            }
            Mode::WaitForDown => Target::Host(raw.to_string()),
        }
    }
}

fn split_endpoint(raw: &str) -> (&str, &str) {
    if let Some(rest) = raw.strip_prefix('[') {
        if let Some((host, port)) = rest.split_once("]:") {
            return (host, port);
        }
    }
    raw.split_once(':').unwrap_or((raw, ""))
}

/// Probe and termination condition for one configuration
pub struct Plan {
    pub probe: Box<dyn Probe>,
    pub expectation: Expectation,
}

/// Select the probe strategy for the configured mode.
pub fn plan(config: &Configuration) -> Plan {
    match Target::parse(config.mode(), config.target()) {
        Target::Endpoint { host, port } => Plan {
            probe: Box::new(TcpConnectProbe::new(host, port)),
            expectation: Expectation::Reachable,
        },
        Target::Host(host) => Plan {
            probe: Box::new(IcmpEchoProbe::new(host)),
            expectation: Expectation::Unreachable,
        },
    }
}

/// Block until the target is in the desired state or the timeout expires.
pub async fn wait(config: &Configuration) -> Result<PollReport, WaitError> {
    let plan = plan(config);
    run_plan(&plan, config.timeout_secs()).await
}

async fn run_plan(plan: &Plan, timeout_secs: u64) -> Result<PollReport, WaitError> {
    let target = plan.probe.describe();
    info!(
        "Waiting up to {} seconds for {} to be {}",
        timeout_secs,
        target,
        plan.expectation.describe()
    );

    let report = PollLoop::new(timeout_secs)
        .run(plan.probe.as_ref(), plan.expectation)
        .await?;

    info!(
        "{} is {} after {} attempts ({} seconds)",
        target,
        plan.expectation.describe(),
        report.attempts,
        report.elapsed.as_secs()
    );
    Ok(report)
}

/// Wait, then replace this process with the follow-up command.
///
/// Returns `Ok(())` only when the wait succeeded and there is no command to
/// run; the caller should then exit 0. With a command this does not return
/// unless launching it fails.
pub async fn dispatch(config: &Configuration) -> Result<(), WaitError> {
    wait(config).await?;
    handoff(config.command())
}
