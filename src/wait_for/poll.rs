//! Fixed-cadence retry loop
//!
//! One probe per second, so the attempt budget is the timeout in seconds.

use super::probe::{Probe, ProbeOutcome};
use crate::error::WaitError;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Delay between two probes
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Reachability a wait is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Reachable,
    Unreachable,
}

impl Expectation {
    /// Whether `outcome` is the state being waited for. Never true when the
    /// probe's tool is missing or could not start.
    pub fn is_met(&self, outcome: &ProbeOutcome) -> bool {
        matches!(
            (self, outcome),
            (Expectation::Reachable, ProbeOutcome::Success)
                | (Expectation::Unreachable, ProbeOutcome::Failure(_))
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Expectation::Reachable => "available",
            Expectation::Unreachable => "unavailable",
        }
    }
}

/// Attempt bookkeeping for one loop
#[derive(Debug, Clone, Copy)]
struct PollState {
    attempts_made: u64,
    max_attempts: u64,
}

impl PollState {
    fn new(max_attempts: u64) -> Self {
        Self {
            attempts_made: 0,
            max_attempts,
        }
    }

    /// Start the next attempt, returning its 1-based number.
    fn advance(&mut self) -> Option<u64> {
        if self.deadline_reached() {
            return None;
        }
        self.attempts_made += 1;
        Some(self.attempts_made)
    }

    fn deadline_reached(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }
}

/// Summary of a wait that ended in the expected state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Drives a probe until the expectation holds or attempts run out.
#[derive(Debug, Clone)]
pub struct PollLoop {
    max_attempts: u64,
    interval: Duration,
}

impl PollLoop {
    pub fn new(max_attempts: u64) -> Self {
        Self {
            max_attempts,
            interval: POLL_INTERVAL,
        }
    }

    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    pub async fn run(
        &self,
        probe: &dyn Probe,
        expectation: Expectation,
    ) -> Result<PollReport, WaitError> {
        let started = Instant::now();
        let target = probe.describe();
        let mut state = PollState::new(self.max_attempts);

        while let Some(attempt) = state.advance() {
            let outcome = probe.probe().await;
            trace!(
                "attempt {}/{}: {} -> {}",
                attempt,
                self.max_attempts,
                target,
                outcome
            );

            match outcome {
                ProbeOutcome::ToolMissing(tool) => return Err(WaitError::ToolMissing { tool }),
                ProbeOutcome::ToolFailed { tool, reason } => {
                    return Err(WaitError::ToolFailed { tool, reason })
                }
                _ => {}
            }

            if expectation.is_met(&outcome) {
                return Ok(PollReport {
                    attempts: attempt,
                    elapsed: started.elapsed(),
                });
            }

            if !state.deadline_reached() {
                sleep(self.interval).await;
            }
        }

        Err(WaitError::Timeout {
            target,
            seconds: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fails until attempt `succeed_on`, then reports `then`.
    struct ScriptedProbe {
        calls: AtomicU64,
        succeed_on: Option<u64>,
        then: ProbeOutcome,
    }

    impl ScriptedProbe {
        fn never() -> Self {
            Self {
                calls: AtomicU64::new(0),
                succeed_on: None,
                then: ProbeOutcome::Success,
            }
        }

        fn on_attempt(k: u64, then: ProbeOutcome) -> Self {
            Self {
                calls: AtomicU64::new(0),
                succeed_on: Some(k),
                then,
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        async fn probe(&self) -> ProbeOutcome {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some(k) if n >= k => self.then.clone(),
                _ => ProbeOutcome::Failure("refused".to_string()),
            }
        }

        fn describe(&self) -> String {
            "scripted:1".to_string()
        }
    }

    /// Paused-clock timers fire on millisecond boundaries.
    fn assert_secs(elapsed: Duration, secs: u64) {
        let expected = Duration::from_secs(secs);
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "expected ~{}s, got {:?}",
            secs,
            elapsed
        );
    }

    #[test]
    fn test_expectation_matching() {
        assert!(Expectation::Reachable.is_met(&ProbeOutcome::Success));
        let refused = ProbeOutcome::Failure("refused".to_string());
        assert!(!Expectation::Reachable.is_met(&refused));
        assert!(Expectation::Unreachable.is_met(&refused));
        assert!(!Expectation::Unreachable.is_met(&ProbeOutcome::Success));

        let missing = ProbeOutcome::ToolMissing("ping".to_string());
        assert!(!Expectation::Reachable.is_met(&missing));
        assert!(!Expectation::Unreachable.is_met(&missing));

        let unstartable = ProbeOutcome::ToolFailed {
            tool: "ping".to_string(),
            reason: "Permission denied".to_string(),
        };
        assert!(!Expectation::Unreachable.is_met(&unstartable));
    }

    #[test]
    fn test_poll_state_counts_to_deadline() {
        let mut state = PollState::new(3);
        assert_eq!(state.advance(), Some(1));
        assert_eq!(state.advance(), Some(2));
        assert!(!state.deadline_reached());
        assert_eq!(state.advance(), Some(3));
        assert!(state.deadline_reached());
        assert_eq!(state.advance(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_exactly_n_attempts() {
        let probe = ScriptedProbe::never();
        let started = Instant::now();

        let poll = PollLoop::new(5);
        assert_eq!(poll.max_attempts(), 5);

        let result = poll.run(&probe, Expectation::Reachable).await;

        assert!(matches!(
            result,
            Err(WaitError::Timeout { ref target, seconds: 5 }) if target == "scripted:1"
        ));
        assert_eq!(probe.calls(), 5);
        // no sleep after the last attempt
        assert_secs(started.elapsed(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_stops_immediately() {
        let probe = ScriptedProbe::on_attempt(3, ProbeOutcome::Success);
        let started = Instant::now();

        let report = PollLoop::new(10)
            .run(&probe, Expectation::Reachable)
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        assert_eq!(probe.calls(), 3);
        assert_secs(started.elapsed(), 2);
        assert_secs(report.elapsed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_final_attempt() {
        let probe = ScriptedProbe::on_attempt(4, ProbeOutcome::Success);

        let report = PollLoop::new(4)
            .run(&probe, Expectation::Reachable)
            .await
            .unwrap();

        assert_eq!(report.attempts, 4);
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_unreachable_succeeds_on_first_failure() {
        let probe = ScriptedProbe::never();

        let report = PollLoop::new(10)
            .run(&probe, Expectation::Unreachable)
            .await
            .unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(report.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_missing_is_not_retried() {
        let probe = ScriptedProbe::on_attempt(2, ProbeOutcome::ToolMissing("ping".to_string()));
        let started = Instant::now();

        let result = PollLoop::new(10).run(&probe, Expectation::Reachable).await;

        assert!(matches!(result, Err(WaitError::ToolMissing { ref tool }) if tool == "ping"));
        assert_eq!(probe.calls(), 2);
        assert_secs(started.elapsed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unstartable_tool_is_fatal_in_down_mode() {
        let probe = ScriptedProbe::on_attempt(
            1,
            ProbeOutcome::ToolFailed {
                tool: "ping".to_string(),
                reason: "Permission denied".to_string(),
            },
        );

        let result = PollLoop::new(10).run(&probe, Expectation::Unreachable).await;

        assert!(matches!(result, Err(WaitError::ToolFailed { ref tool, .. }) if tool == "ping"));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_budget_never_sleeps() {
        let probe = ScriptedProbe::never();
        let started = Instant::now();

        let result = PollLoop::new(1).run(&probe, Expectation::Reachable).await;

        assert!(matches!(result, Err(WaitError::Timeout { seconds: 1, .. })));
        assert_eq!(probe.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
