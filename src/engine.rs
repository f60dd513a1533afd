//! Seams to the XSLT and schema engines.
//!
//! The crate does not ship an XSLT processor or a schema validator. Engines plug in
//! through [`XsltProcessor`] and [`DocumentValidator`]; this module wires them to the
//! reporters and keeps the compiled stylesheet around between transforms.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cause::Cause;
use crate::cli::VerbosityLevel;
use crate::error::{DiagnosticsError, Result};
use crate::node::Node;
use crate::reporter::{DiagnosticListener, LoggingReporter, StrictReporter};
use crate::validation::{ValidationAggregator, ValidationHandler};

/// An XSLT engine
pub trait XsltProcessor {
    /// Engine specific compiled form of a stylesheet
    type Compiled;

    /// Compile stylesheet source. `system_id` names the stylesheet in diagnostics.
    fn compile(&self, source: &[u8], system_id: &str) -> std::result::Result<Self::Compiled, Cause>;

    /// Run a compiled stylesheet over `input`, writing the serialized result to
    /// `output`. Diagnostics raised while transforming go to `listener`, and an
    /// [`Action::Abort`](crate::diagnostic::Action::Abort) answer must end the
    /// transform with an error.
    fn transform(
        &self,
        compiled: &Self::Compiled,
        input: &Node,
        parameters: &Parameters,
        output: &mut dyn Write,
        listener: &mut dyn DiagnosticListener,
    ) -> Result<()>;
}

/// A schema aware validator that reports through a [`ValidationHandler`]
pub trait DocumentValidator {
    /// Validate and normalize `document` in place
    fn validate(&self, document: &mut Node, handler: &mut dyn ValidationHandler);
}

/// Stylesheet parameters in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, returning the value it replaces
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        for (key, value) in iter {
            parameters.set(key, value);
        }
        parameters
    }
}

/// A stylesheet file, compiled on first use and reused afterwards.
pub struct Stylesheet<P: XsltProcessor> {
    path: PathBuf,
    processor: P,
    compiled: Option<P::Compiled>,
    verbosity: VerbosityLevel,
}

impl<P: XsltProcessor> Stylesheet<P> {
    pub fn new(path: impl Into<PathBuf>, processor: P) -> Self {
        Self {
            path: path.into(),
            processor,
            compiled: None,
            verbosity: VerbosityLevel::Normal,
        }
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// The compiled stylesheet, compiling it if this is the first request.
    ///
    /// Fails with [`DiagnosticsError::StylesheetNotFound`] when the file does not
    /// exist and with [`DiagnosticsError::Aborted`] when it does not compile.
    pub fn compiled(&mut self) -> Result<&P::Compiled> {
        self.prepare().map(|(_, compiled)| compiled)
    }

    /// Transform `input` into `output`.
    ///
    /// With a `log` sink, diagnostics are appended to it and only fatal errors
    /// stop the transform. Without one, diagnostics go to stderr and the first
    /// one stops the transform.
    pub fn transform(
        &mut self,
        input: &Node,
        parameters: &Parameters,
        output: &mut dyn Write,
        log: Option<&mut dyn Write>,
    ) -> Result<()> {
        let verbosity = self.verbosity;
        match log {
            Some(log) => {
                let mut reporter = LoggingReporter::new(log).with_verbosity(verbosity);
                self.transform_with(input, parameters, output, &mut reporter)
            }
            None => {
                let mut reporter = StrictReporter::console().with_verbosity(verbosity);
                self.transform_with(input, parameters, output, &mut reporter)
            }
        }
    }

    /// Transform `input` into `output`, delivering diagnostics to `listener`.
    pub fn transform_with(
        &mut self,
        input: &Node,
        parameters: &Parameters,
        output: &mut dyn Write,
        listener: &mut dyn DiagnosticListener,
    ) -> Result<()> {
        let (processor, compiled) = self.prepare()?;
        processor.transform(compiled, input, parameters, output, listener)
    }

    /// Transform `input` with the strict reporter and return the result as text
    pub fn transform_to_string(&mut self, input: &Node, parameters: &Parameters) -> Result<String> {
        let mut output = Vec::new();
        self.transform(input, parameters, &mut output, None)?;
        String::from_utf8(output)
            .map_err(|e| DiagnosticsError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn prepare(&mut self) -> Result<(&P, &P::Compiled)> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => self.load()?,
        };
        let compiled: &P::Compiled = self.compiled.insert(compiled);
        Ok((&self.processor, compiled))
    }

    fn load(&self) -> Result<P::Compiled> {
        if !self.path.is_file() {
            return Err(DiagnosticsError::StylesheetNotFound {
                path: self.path.clone(),
            });
        }

        tracing::debug!(path = %self.path.display(), "compiling stylesheet");
        let source = std::fs::read(&self.path)?;
        let system_id = self.path.to_string_lossy();
        self.processor
            .compile(&source, &system_id)
            .map_err(DiagnosticsError::Aborted)
    }
}

/// Run one validation pass over `document`, reporting into `sink`.
///
/// Returns `true` when no error or fatal error was reported.
pub fn validate_document<V, W>(validator: &V, document: &mut Node, sink: W) -> bool
where
    V: DocumentValidator + ?Sized,
    W: Write,
{
    let mut aggregator = ValidationAggregator::new(sink);
    validator.validate(document, &mut aggregator);

    let summary = aggregator.summary();
    tracing::debug!(
        warnings = summary.warnings,
        errors = summary.errors,
        fatal_errors = summary.fatal_errors,
        "validation pass finished"
    );
    aggregator.is_valid()
}
