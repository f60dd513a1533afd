//! Transform diagnostic reporting.
//!
//! A reporter receives warning/error/fatal-error notifications from a transform
//! engine, finds the most specific source location in the cause chain, writes a
//! single `<id>: <message>` line to its sink and tells the engine whether to go on.
//!
//! Two variants share the formatting and differ in policy:
//! - [`StrictReporter`] aborts on every severity. Sink write failures are discarded.
//! - [`LoggingReporter`] continues on warnings and errors and aborts on fatal errors.
//!   Sink write failures are returned as [`DiagnosticsError::Reporting`].

use std::io::{self, Stderr, Write};

use crate::cause::{Cause, SourceLocator};
use crate::cli::VerbosityLevel;
use crate::diagnostic::{Action, Severity};
use crate::error::{DiagnosticsError, Result};
use crate::href::HRef;

/// Identifier used when a locator has neither a public nor a system id
pub const SYSTEM_ID_UNKNOWN: &str = "SystemId Unknown";

/// Identifier used when no locator was found in the cause chain
pub const LOCATION_UNKNOWN: &str = "Location of error unknown";

/// Receives diagnostics from a transform engine
pub trait DiagnosticListener {
    /// Handle one diagnostic and decide whether processing continues
    fn report(&mut self, severity: Severity, cause: &Cause) -> Result<Action>;

    fn warning(&mut self, cause: &Cause) -> Result<Action> {
        self.report(Severity::Warning, cause)
    }

    fn error(&mut self, cause: &Cause) -> Result<Action> {
        self.report(Severity::Error, cause)
    }

    fn fatal_error(&mut self, cause: &Cause) -> Result<Action> {
        self.report(Severity::FatalError, cause)
    }
}

/// Find the locator closest to the deepest cause: the last one seen walking
/// from `cause` down the chain.
pub fn resolve_locator(cause: &Cause) -> Option<&SourceLocator> {
    let mut found = None;
    for link in cause.chain() {
        if let Some(locator) = link.locator() {
            tracing::trace!(kind = ?link.kind(), "locator found in cause chain");
            found = Some(locator);
        }
    }
    found
}

/// Short display name for the location of `cause`
pub fn identify(cause: &Cause) -> String {
    let Some(locator) = resolve_locator(cause) else {
        return format!("({LOCATION_UNKNOWN})");
    };

    let mut href = HRef::empty();
    for id in [&locator.public_id, &locator.system_id] {
        href.parse(id.as_deref());
        if let Some(name) = href.name().filter(|name| !name.is_empty()) {
            return name;
        }
    }
    SYSTEM_ID_UNKNOWN.to_string()
}

/// Format the report for `cause` without trailing newline
pub fn format_report(cause: &Cause, verbosity: VerbosityLevel) -> String {
    let mut output = format!("{}: {}", identify(cause), cause.message());

    if verbosity == VerbosityLevel::Debug {
        output.push_str("\nCause chain:");
        for (level, link) in cause.chain().skip(1).enumerate() {
            output.push_str(&format!("\n  {}: {}", level + 1, link.message()));
        }
    }

    output
}

fn write_report<W: Write>(sink: &mut W, cause: &Cause, verbosity: VerbosityLevel) -> io::Result<()> {
    writeln!(sink, "{}", format_report(cause, verbosity))?;
    sink.flush()
}

/// Reporter that aborts processing on any diagnostic
pub struct StrictReporter<W: Write> {
    sink: W,
    verbosity: VerbosityLevel,
}

impl StrictReporter<Stderr> {
    /// Strict reporter writing to the process error stream
    pub fn console() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> StrictReporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            verbosity: VerbosityLevel::Normal,
        }
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> DiagnosticListener for StrictReporter<W> {
    fn report(&mut self, severity: Severity, cause: &Cause) -> Result<Action> {
        tracing::debug!(%severity, message = cause.message(), "strict reporter abort");

        if let Err(e) = write_report(&mut self.sink, cause, self.verbosity) {
            tracing::warn!(error = %e, "discarding failed diagnostic write");
        }
        Ok(Action::Abort)
    }
}

/// Reporter that keeps going on warnings and errors
pub struct LoggingReporter<W: Write> {
    sink: W,
    verbosity: VerbosityLevel,
}

impl<W: Write> LoggingReporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            verbosity: VerbosityLevel::Normal,
        }
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> DiagnosticListener for LoggingReporter<W> {
    fn report(&mut self, severity: Severity, cause: &Cause) -> Result<Action> {
        tracing::debug!(%severity, message = cause.message(), "logging reporter");

        write_report(&mut self.sink, cause, self.verbosity).map_err(DiagnosticsError::Reporting)?;

        match severity {
            Severity::Warning | Severity::Error => Ok(Action::Continue),
            Severity::FatalError => Ok(Action::Abort),
        }
    }
}
