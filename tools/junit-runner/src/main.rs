//! JUnit Runner: drives the server-init suite and prints JUnit markers.

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use cm_telemetry::{init_telemetry, TelemetryConfig};
use junit_runner::suite::{DEFAULT_GROUP, SERVER_INIT, SERVER_INIT_CASE, DEFAULT_USER};
use junit_runner::{Role, SuiteConfig, SuiteRunner, Targets};

/// JUnit Runner: remote test driver emitting JUnit markers
#[derive(Parser, Debug)]
#[command(name = "junit-runner")]
#[command(about = "Run a test suite on the test bed machines and print JUnit markers")]
struct Args {
    /// Client target spec (ssh:<host> or local:)
    #[arg(long, env = "TARGET_CLIENT")]
    client: Option<String>,

    /// Server target spec
    #[arg(long, env = "TARGET_SERVER")]
    server: Option<String>,

    /// Minion target spec
    #[arg(long, env = "TARGET_MINION")]
    minion: Option<String>,

    /// Internal IP address of the client
    #[arg(long, env = "INTERNAL_IP_CLIENT")]
    client_ip: Option<String>,

    /// Distribution family of the client (e.g. sles-12-sp2)
    #[arg(long, env = "FAMILY_CLIENT")]
    client_family: Option<String>,

    /// Suite name
    #[arg(long, default_value = DEFAULT_GROUP)]
    group: String,

    /// Machine the command runs on
    #[arg(long, value_enum, default_value_t = Role::Server)]
    role: Role,

    /// Command to run
    #[arg(long, default_value = SERVER_INIT)]
    command: String,

    /// Testcase name
    #[arg(long, default_value = SERVER_INIT_CASE)]
    case: String,

    /// Command timeout in seconds
    #[arg(long, default_value_t = 1000)]
    timeout: u64,

    /// Account the command runs as
    #[arg(long, default_value = DEFAULT_USER)]
    user: String,
}

impl Args {
    fn suite(&self) -> SuiteConfig {
        SuiteConfig {
            group: self.group.clone(),
            role: self.role,
            command: self.command.clone(),
            case: self.case.clone(),
            timeout: Duration::from_secs(self.timeout),
            user: self.user.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let _telemetry = init_telemetry(&TelemetryConfig::for_component("junit-runner"))
        .context("initializing telemetry")?;

    info!(
        client = args.client.as_deref().unwrap_or("-"),
        server = args.server.as_deref().unwrap_or("-"),
        minion = args.minion.as_deref().unwrap_or("-"),
        client_ip = args.client_ip.as_deref().unwrap_or("-"),
        client_family = args.client_family.as_deref().unwrap_or("-"),
        "Test environment"
    );

    let targets = Targets::from_specs(
        args.client.as_deref(),
        args.server.as_deref(),
        args.minion.as_deref(),
    )
    .context("resolving targets")?;

    let mut runner = SuiteRunner::new(io::stdout());
    let summary = runner
        .run_suite(&args.suite(), &targets)
        .await
        .context("running suite")?;

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
