//! JUnit Runner: remote test driver for the content-management test bed.
//!
//! Runs commands on the machines of a test environment (client, server,
//! minion) and frames them with `###junit` markers on stdout, from which the
//! CI job builds its JUnit report. Diagnostics go to stderr through
//! `tracing` so they never mix with the markers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  run_command   ┌──────────────────┐  execute  ┌──────────┐
//! │ SuiteRunner │ ─────────────→ │ CommandTransport │ ────────→ │  target  │
//! └─────────────┘                └──────────────────┘           └──────────┘
//!        │ emit
//!        ▼
//! ┌──────────────┐
//! │ MarkerWriter │ ──→ stdout
//! └──────────────┘
//! ```
//!
//! | Target spec | Transport |
//! |-------------|-----------|
//! | `ssh:<host>` | `SshTransport` |
//! | `local:` | `LocalTransport` |
//! | `virtio:…`, `serial:…` | rejected |

pub mod marker;
pub mod suite;
pub mod transport;

pub use marker::{Keyword, Marker, MarkerWriter, SEPARATOR};
pub use suite::{Role, RunnerError, SuiteConfig, SuiteRunner, SuiteSummary, Targets};
pub use transport::{CommandTransport, ExecStatus, TargetSpec, TransportError};
