//! Diagnostic severities, events and the continue/abort decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cause::{Cause, SourceLocator};
use crate::error::{DiagnosticsError, Result};

/// Severity of a diagnostic, ordered by increasing required response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, processing continues
    Warning,
    /// Recoverable, but the result is compromised
    Error,
    /// Processing must stop
    FatalError,
}

impl Severity {
    /// `true` for [`Error`](Severity::Error) and [`FatalError`](Severity::FatalError)
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::FatalError => write!(f, "fatal error"),
        }
    }
}

/// What the caller should do after a diagnostic was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Abort,
}

impl Action {
    pub fn is_abort(self) -> bool {
        self == Action::Abort
    }

    /// Translate into the caller's error propagation: `Abort` becomes
    /// [`DiagnosticsError::Aborted`] carrying `cause`.
    pub fn into_result(self, cause: &Cause) -> Result<()> {
        match self {
            Action::Continue => Ok(()),
            Action::Abort => Err(DiagnosticsError::Aborted(cause.clone())),
        }
    }
}

/// A single diagnostic notification from a validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    pub severity: Severity,
    pub message: String,
    pub locator: Option<SourceLocator>,
}

impl DiagnosticEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            locator: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::FatalError, message)
    }

    pub fn with_locator(mut self, locator: SourceLocator) -> Self {
        self.locator = Some(locator);
        self
    }
}
