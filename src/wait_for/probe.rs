//! Single-shot reachability checks

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;

/// Upper bound for one TCP connect or one echo reply
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered
    Success,
    /// The target did not answer, with the reason
    Failure(String),
    /// The executable behind the probe does not exist
    ToolMissing(String),
    /// The executable exists but could not be started
    ToolFailed { tool: String, reason: String },
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Success => f.write_str("success"),
            ProbeOutcome::Failure(reason) => write!(f, "failure ({})", reason),
            ProbeOutcome::ToolMissing(tool) => write!(f, "{} not found", tool),
            ProbeOutcome::ToolFailed { tool, reason } => {
                write!(f, "{} could not be started ({})", tool, reason)
            }
        }
    }
}

/// One reachability check against a fixed target.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;

    /// Human-readable target, used in log lines and errors
    fn describe(&self) -> String;
}

/// Checks that a TCP port accepts connections.
#[derive(Debug, Clone)]
pub struct TcpConnectProbe {
    host: String,
    port: String,
    connect_timeout: Duration,
}

impl TcpConnectProbe {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            connect_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Address in a form `ToSocketAddrs` understands; IPv6 literals get brackets.
    fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    async fn probe(&self) -> ProbeOutcome {
        let address = self.address();
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(address.as_str())).await
        {
            Ok(Ok(_stream)) => ProbeOutcome::Success,
            Ok(Err(e)) => ProbeOutcome::Failure(e.to_string()),
            Err(_) => ProbeOutcome::Failure("connect timed out".to_string()),
        }
    }

    fn describe(&self) -> String {
        self.address()
    }
}

/// Sends one ICMP echo request through the system `ping`.
#[derive(Debug, Clone)]
pub struct IcmpEchoProbe {
    host: String,
    program: String,
}

impl IcmpEchoProbe {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            program: "ping".to_string(),
        }
    }

    /// Use a different echo executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args(&self) -> Vec<String> {
        let wait = PROBE_TIMEOUT.as_secs().to_string();
        // BSD ping's -W is in milliseconds; -t is the overall deadline in seconds
        let wait_flag = if cfg!(target_os = "macos") { "-t" } else { "-W" };
        vec![
            "-c".to_string(),
            "1".to_string(),
            wait_flag.to_string(),
            wait,
            self.host.clone(),
        ]
    }
}

#[async_trait]
impl Probe for IcmpEchoProbe {
    async fn probe(&self) -> ProbeOutcome {
        let status = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => ProbeOutcome::Success,
            Ok(status) => ProbeOutcome::Failure(format!("{} {}", self.program, status)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ProbeOutcome::ToolMissing(self.program.clone())
            }
            // says nothing about the host
            Err(e) => ProbeOutcome::ToolFailed {
                tool: self.program.clone(),
                reason: e.to_string(),
            },
        }
    }

    fn describe(&self) -> String {
        self.host.clone()
    }
}
