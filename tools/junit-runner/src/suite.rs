//! Suite execution.

use cm_telemetry::{metric_inc, RUNNER_TESTCASES};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::marker::{Keyword, Marker, MarkerWriter};
use crate::transport::{connect, CommandTransport, TargetSpec, TransportError};

/// Suite run when no other is configured.
pub const DEFAULT_GROUP: &str = "INIT_SERVER FOR SUSE_MANAGER!";
/// Server initialization script.
pub const SERVER_INIT: &str = "/var/lib/slenkins/tests-suma-cucumber/tests-server/bin/suma_init.sh";
/// Testcase name of the server initialization.
pub const SERVER_INIT_CASE: &str = "INIT_SERVER";
/// Timeout of the server initialization.
pub const SERVER_INIT_TIMEOUT: Duration = Duration::from_secs(1000);
/// Timeout of a testcase unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Account commands run as.
pub const DEFAULT_USER: &str = "root";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("No target configured for the {0} role")]
    MissingTarget(Role),

    #[error("Invalid {role} target: {source}")]
    Target {
        role: Role,
        #[source]
        source: TransportError,
    },

    #[error("Failed to write markers: {0}")]
    Io(#[from] io::Error),
}

/// Machine roles of the test environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Role {
    Client,
    Server,
    Minion,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
            Self::Minion => "minion",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transports per role; roles without a spec stay unset.
#[derive(Default, Clone)]
pub struct Targets {
    client: Option<Arc<dyn CommandTransport>>,
    server: Option<Arc<dyn CommandTransport>>,
    minion: Option<Arc<dyn CommandTransport>>,
}

impl Targets {
    /// Parse and connect the given specs.
    pub fn from_specs(
        client: Option<&str>,
        server: Option<&str>,
        minion: Option<&str>,
    ) -> Result<Self, RunnerError> {
        let parse = |role: Role, spec: Option<&str>| -> Result<_, RunnerError> {
            spec.map(|spec| {
                spec.parse::<TargetSpec>()
                    .map(|spec| connect(&spec))
                    .map_err(|source| RunnerError::Target { role, source })
            })
            .transpose()
        };

        Ok(Self {
            client: parse(Role::Client, client)?,
            server: parse(Role::Server, server)?,
            minion: parse(Role::Minion, minion)?,
        })
    }

    /// Set the transport of one role.
    #[must_use]
    pub fn with(mut self, role: Role, transport: Arc<dyn CommandTransport>) -> Self {
        *self.slot(role) = Some(transport);
        self
    }

    fn slot(&mut self, role: Role) -> &mut Option<Arc<dyn CommandTransport>> {
        match role {
            Role::Client => &mut self.client,
            Role::Server => &mut self.server,
            Role::Minion => &mut self.minion,
        }
    }

    /// Transport of `role`.
    pub fn get(&self, role: Role) -> Result<&Arc<dyn CommandTransport>, RunnerError> {
        let transport = match role {
            Role::Client => &self.client,
            Role::Server => &self.server,
            Role::Minion => &self.minion,
        };
        transport.as_ref().ok_or(RunnerError::MissingTarget(role))
    }
}

/// One suite of a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    pub group: String,
    pub role: Role,
    pub command: String,
    pub case: String,
    pub timeout: Duration,
    pub user: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
            role: Role::Server,
            command: SERVER_INIT.to_string(),
            case: SERVER_INIT_CASE.to_string(),
            timeout: SERVER_INIT_TIMEOUT,
            user: DEFAULT_USER.to_string(),
        }
    }
}

/// Passed and failed testcase counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
}

impl SuiteSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Emits suite and testcase markers around commands.
pub struct SuiteRunner<W: Write> {
    markers: MarkerWriter<W>,
    user: String,
    summary: SuiteSummary,
}

impl<W: Write + Send> SuiteRunner<W> {
    pub fn new(sink: W) -> Self {
        Self {
            markers: MarkerWriter::new(sink),
            user: DEFAULT_USER.to_string(),
            summary: SuiteSummary::default(),
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Open a suite named `group`.
    pub fn testsuite(&mut self, group: &str) -> Result<(), RunnerError> {
        info!(group, "Starting suite");
        self.markers
            .emit(&Marker::now(Keyword::Testsuite).id(group).text(group))?;
        Ok(())
    }

    /// Close the open suite.
    pub fn endsuite(&mut self) -> Result<(), RunnerError> {
        info!(
            passed = self.summary.passed,
            failed = self.summary.failed,
            "Suite finished"
        );
        self.markers.emit(&Marker::now(Keyword::Endsuite))?;
        Ok(())
    }

    /// Run `command` on `target` as a testcase named `message`.
    ///
    /// Returns whether the testcase passed.
    pub async fn run_command(
        &mut self,
        target: &dyn CommandTransport,
        command: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<bool, RunnerError> {
        self.markers
            .emit(&Marker::now(Keyword::Testcase).text(message))?;

        let host = target.describe();
        info!(host = %host, testcase = message, ?timeout, "Running testcase");
        let status = target.execute(command, &self.user, timeout).await;
        self.markers.passthrough(&status.output)?;

        let passed = status.succeeded();
        if passed {
            self.summary.passed += 1;
            metric_inc!(RUNNER_TESTCASES, &["success"]);
            self.markers.emit(&Marker::now(Keyword::Success))?;
        } else {
            self.summary.failed += 1;
            metric_inc!(RUNNER_TESTCASES, &["failure"]);
            warn!(
                host = %host,
                testcase = message,
                local = status.local,
                remote = status.remote,
                command = status.command,
                "Testcase failed"
            );
            self.markers.emit(&Marker::now(Keyword::Failure))?;
        }
        Ok(passed)
    }

    /// Run a configured single-command suite.
    pub async fn run_suite(
        &mut self,
        config: &SuiteConfig,
        targets: &Targets,
    ) -> Result<SuiteSummary, RunnerError> {
        let target = Arc::clone(targets.get(config.role)?);
        self.user.clone_from(&config.user);
        self.testsuite(&config.group)?;
        self.run_command(target.as_ref(), &config.command, &config.case, config.timeout)
            .await?;
        self.endsuite()?;
        Ok(self.summary)
    }

    pub fn summary(&self) -> SuiteSummary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.markers.into_inner()
    }
}
