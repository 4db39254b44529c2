//! JUnit markers.
//!
//! The CI job scans the driver's stdout for marker blocks and assembles a
//! JUnit report from them:
//!
//! ```text
//! ==================================================
//! ###junit testcase time="2024-05-02T09:30:00Z" text="INIT_SERVER"
//! ==================================================
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::io::{self, Write};

/// Line framing every marker.
pub const SEPARATOR: &str = "==================================================";

/// Prefix of the marker line.
pub const MARKER_PREFIX: &str = "###junit";

/// Marker keywords understood by the report builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Opens a suite.
    Testsuite,
    /// Opens a testcase.
    Testcase,
    /// Closes the open testcase as passed.
    Success,
    /// Closes the open testcase as failed.
    Failure,
    /// Closes the open suite.
    Endsuite,
}

impl Keyword {
    /// Keyword as written in the marker line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Testsuite => "testsuite",
            Self::Testcase => "testcase",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Endsuite => "endsuite",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One marker block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub keyword: Keyword,
    pub time: DateTime<Utc>,
    pub id: Option<String>,
    pub text: Option<String>,
    pub hostname: Option<String>,
    pub kind: Option<String>,
}

impl Marker {
    /// Marker stamped with the current time.
    pub fn now(keyword: Keyword) -> Self {
        Self::at(keyword, Utc::now())
    }

    /// Marker stamped with `time`.
    pub fn at(keyword: Keyword, time: DateTime<Utc>) -> Self {
        Self {
            keyword,
            time,
            id: None,
            text: None,
            hostname: None,
            kind: None,
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the `type` attribute.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// The `###junit` line without framing.
    pub fn line(&self) -> String {
        let mut line = format!(
            "{MARKER_PREFIX} {} time=\"{}\"",
            self.keyword,
            self.time.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let attributes = [
            ("id", &self.id),
            ("text", &self.text),
            ("hostname", &self.hostname),
            ("type", &self.kind),
        ];
        for (name, value) in attributes {
            if let Some(value) = value {
                line.push_str(&format!(" {name}=\"{value}\""));
            }
        }
        line
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{SEPARATOR}")?;
        writeln!(f, "{}", self.line())?;
        writeln!(f, "{SEPARATOR}")
    }
}

/// Writes markers to a sink, flushing after each one so they interleave
/// correctly with command output.
pub struct MarkerWriter<W: Write> {
    sink: W,
}

impl<W: Write> MarkerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write one marker block and flush.
    pub fn emit(&mut self, marker: &Marker) -> io::Result<()> {
        write!(self.sink, "{marker}")?;
        self.sink.flush()
    }

    /// Write raw command output between markers.
    pub fn passthrough(&mut self, output: &[u8]) -> io::Result<()> {
        self.sink.write_all(output)?;
        self.sink.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
