//! Command transports.
//!
//! A target is addressed by a `<scheme>:<address>` spec, e.g. `ssh:10.0.0.5`
//! or `local:`. Running a command reports three statuses: the local side
//! (could the command be launched and finish in time), the remote side (did
//! the transport reach the target) and the command's own exit code.

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Status reported for a command that could not be launched.
pub const LAUNCH_FAILED: i32 = 1;
/// Status reported for a command that ran into its timeout.
pub const TIMED_OUT: i32 = 110;
/// Exit code `ssh` uses for its own failures.
pub const SSH_ERROR: i32 = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Invalid target spec {0:?}: expected <scheme>:<address>")]
    InvalidSpec(String),

    #[error("Unsupported transport {0:?}")]
    Unsupported(String),

    #[error("Target spec {0:?} has no address")]
    MissingAddress(String),
}

/// Parsed target spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// Remote host reached through `ssh`.
    Ssh { host: String },
    /// Commands run through the local shell.
    Local,
}

impl FromStr for TargetSpec {
    type Err = TransportError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (scheme, address) = spec
            .split_once(':')
            .ok_or_else(|| TransportError::InvalidSpec(spec.to_string()))?;
        let address = address.trim();

        match scheme {
            "ssh" if address.is_empty() => Err(TransportError::MissingAddress(spec.to_string())),
            "ssh" => Ok(Self::Ssh {
                host: address.to_string(),
            }),
            "local" => Ok(Self::Local),
            "virtio" | "serial" => Err(TransportError::Unsupported(scheme.to_string())),
            _ => Err(TransportError::InvalidSpec(spec.to_string())),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh { host } => write!(f, "ssh:{host}"),
            Self::Local => f.write_str("local:"),
        }
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecStatus {
    pub local: i32,
    pub remote: i32,
    pub command: i32,
    /// Captured stdout followed by stderr.
    pub output: Vec<u8>,
}

impl ExecStatus {
    /// Whether all three statuses are zero.
    pub fn succeeded(&self) -> bool {
        self.local == 0 && self.remote == 0 && self.command == 0
    }

    fn local_failure(code: i32) -> Self {
        Self {
            local: code,
            ..Self::default()
        }
    }
}

/// Something commands can be run on.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Human readable target, used as hostname in logs.
    fn describe(&self) -> String;

    /// Run `command` as `user`, giving up after `timeout`.
    async fn execute(&self, command: &str, user: &str, timeout: Duration) -> ExecStatus;
}

/// Build the transport for a parsed spec.
pub fn connect(spec: &TargetSpec) -> Arc<dyn CommandTransport> {
    match spec {
        TargetSpec::Ssh { host } => Arc::new(SshTransport::new(host.clone())),
        TargetSpec::Local => Arc::new(LocalTransport),
    }
}

async fn run_process(mut command: Command, timeout: Duration, ssh: bool) -> ExecStatus {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Err(_) => {
            warn!(?timeout, "Command timed out");
            return ExecStatus::local_failure(TIMED_OUT);
        }
        Ok(Err(error)) => {
            warn!(%error, "Command could not be launched");
            return ExecStatus::local_failure(LAUNCH_FAILED);
        }
        Ok(Ok(output)) => output,
    };

    let mut captured = output.stdout;
    captured.extend_from_slice(&output.stderr);

    // A signal-terminated child has no exit code.
    let code = output.status.code().unwrap_or(LAUNCH_FAILED);
    let (remote, command) = if ssh && code == SSH_ERROR {
        (SSH_ERROR, 0)
    } else {
        (0, code)
    };
    debug!(remote, command, "Command finished");

    ExecStatus {
        local: 0,
        remote,
        command,
        output: captured,
    }
}

/// Runs commands on a remote host with `ssh`.
#[derive(Debug, Clone)]
pub struct SshTransport {
    host: String,
}

impl SshTransport {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    fn command(&self, command: &str, user: &str) -> Command {
        let mut ssh = Command::new("ssh");
        ssh.args(["-o", "BatchMode=yes", "-o", "StrictHostKeyChecking=no"])
            .arg(format!("{user}@{}", self.host))
            .arg("--")
            .arg(command);
        ssh
    }
}

#[async_trait]
impl CommandTransport for SshTransport {
    fn describe(&self) -> String {
        self.host.clone()
    }

    async fn execute(&self, command: &str, user: &str, timeout: Duration) -> ExecStatus {
        debug!(host = %self.host, user, command, "Running remote command");
        run_process(self.command(command, user), timeout, true).await
    }
}

/// Runs commands through the local `sh` under the invoking account.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

#[async_trait]
impl CommandTransport for LocalTransport {
    fn describe(&self) -> String {
        "localhost".to_string()
    }

    async fn execute(&self, command: &str, user: &str, timeout: Duration) -> ExecStatus {
        debug!(user, command, "Running local command");
        let mut sh = Command::new("sh");
        sh.arg("-c").arg(command);
        run_process(sh, timeout, false).await
    }
}
