//! Structural validation error aggregation.
//!
//! A [`ValidationAggregator`] is handed to a document validator for one pass. It
//! writes a block per diagnostic, remembers whether any error was seen, and tells
//! the validator to keep scanning unless the error was fatal.

use std::io::{self, Write};

use crate::diagnostic::{Action, DiagnosticEvent, Severity};
use crate::node::Node;
use crate::node_writer::{compact_whitespace, write_node};

/// Receives diagnostics from a document validator
pub trait ValidationHandler {
    fn handle_error(&mut self, event: &DiagnosticEvent) -> Action;
}

/// Counts of what a validation pass reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub warnings: usize,
    pub errors: usize,
    pub fatal_errors: usize,
}

impl ValidationSummary {
    pub fn total(&self) -> usize {
        self.warnings + self.errors + self.fatal_errors
    }
}

/// Collects and formats the diagnostics of a single validation pass.
///
/// Create one per pass; validity never resets to `true`.
pub struct ValidationAggregator<W: Write> {
    sink: W,
    has_error: bool,
    summary: ValidationSummary,
}

impl<W: Write> ValidationAggregator<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            has_error: false,
            summary: ValidationSummary::default(),
        }
    }

    /// `true` unless an error or fatal error has been observed
    pub fn is_valid(&self) -> bool {
        !self.has_error
    }

    pub fn summary(&self) -> ValidationSummary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_event(&mut self, event: &DiagnosticEvent) -> io::Result<()> {
        self.sink.write_all(format_event(event).as_bytes())?;
        self.sink.flush()
    }
}

impl<W: Write> ValidationAggregator<W> {
    /// Record `event` and write its report. The returned decision does not
    /// depend on whether the write succeeded.
    pub fn record(&mut self, event: &DiagnosticEvent) -> (Action, io::Result<()>) {
        let action = match event.severity {
            Severity::Warning => {
                self.summary.warnings += 1;
                Action::Continue
            }
            Severity::Error => {
                self.summary.errors += 1;
                self.has_error = true;
                Action::Continue
            }
            Severity::FatalError => {
                self.summary.fatal_errors += 1;
                self.has_error = true;
                Action::Abort
            }
        };
        tracing::debug!(severity = %event.severity, ?action, "validation diagnostic");

        (action, self.write_event(event))
    }
}

impl<W: Write> ValidationHandler for ValidationAggregator<W> {
    fn handle_error(&mut self, event: &DiagnosticEvent) -> Action {
        let (action, written) = self.record(event);
        if let Err(e) = written {
            tracing::warn!(error = %e, "discarding failed validation report");
            eprintln!("{e}");
        }
        action
    }
}

/// Format one diagnostic as a report block, ending with a blank line.
pub fn format_event(event: &DiagnosticEvent) -> String {
    let prefix = match event.severity {
        Severity::Warning => "Warning",
        Severity::Error => "Error",
        Severity::FatalError => "Fatal",
    };

    let mut output = format!("{prefix}: {}\nLocation:\n", event.message);
    if let Some(locator) = &event.locator {
        if let Some(line) = locator.line {
            output.push_str(&format!("- Line: {line}\n"));
        }
        if let Some(column) = locator.column {
            output.push_str(&format!("- Column: {column}\n"));
        }
        if let Some(node) = &locator.node {
            output.push_str(&format!("- Node: {}\n", render_node(node)));
        }
        if let Some(uri) = &locator.system_id {
            output.push_str(&format!("- URI: {uri}\n"));
        }
    }
    output.push('\n');
    output
}

/// Compact one-line rendering of the offending node
pub fn render_node(node: &Node) -> String {
    match node {
        Node::Attribute(attribute) => format!("{} {}", attribute.name, attribute.value),
        _ => compact_whitespace(&write_node(node)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cause::SourceLocator;
    use crate::node::Attribute;

    #[test]
    fn test_no_events_is_valid() {
        let aggregator = ValidationAggregator::new(Vec::new());
        assert!(aggregator.is_valid());
        assert_eq!(aggregator.summary().total(), 0);
    }

    #[test]
    fn test_warning_keeps_validity() {
        let mut aggregator = ValidationAggregator::new(Vec::new());
        let action = aggregator.handle_error(&DiagnosticEvent::warning("deprecated attribute"));
        assert_eq!(action, Action::Continue);
        assert!(aggregator.is_valid());

        let written = String::from_utf8(aggregator.into_inner()).unwrap();
        assert_eq!(written, "Warning: deprecated attribute\nLocation:\n\n");
    }

    #[test]
    fn test_error_invalidates_and_continues() {
        let mut aggregator = ValidationAggregator::new(Vec::new());
        assert_eq!(
            aggregator.handle_error(&DiagnosticEvent::error("cvc-complex-type.2.4.a")),
            Action::Continue
        );
        assert!(!aggregator.is_valid());

        // Stays invalid after later warnings
        aggregator.handle_error(&DiagnosticEvent::warning("w"));
        assert!(!aggregator.is_valid());
        assert_eq!(
            aggregator.summary(),
            ValidationSummary {
                warnings: 1,
                errors: 1,
                fatal_errors: 0
            }
        );
    }

    #[test]
    fn test_fatal_error_stops() {
        let mut aggregator = ValidationAggregator::new(Vec::new());
        assert_eq!(
            aggregator.handle_error(&DiagnosticEvent::fatal("premature end of file")),
            Action::Abort
        );
        assert!(!aggregator.is_valid());
    }

    #[test]
    fn test_full_location_block() {
        let node = Node::element("item")
            .with_attribute("id", "x")
            .with_child(Node::text("\n    some   text\n"));
        let event = DiagnosticEvent::error("cvc-datatype-valid.1.2.1: 'x' is not a valid value")
            .with_locator(
                SourceLocator::new()
                    .with_system_id("file:///data/order.xml")
                    .with_position(12, 5)
                    .with_node(node),
            );

        assert_eq!(
            format_event(&event),
            "Error: cvc-datatype-valid.1.2.1: 'x' is not a valid value\n\
             Location:\n\
             - Line: 12\n\
             - Column: 5\n\
             - Node: <item id=\"x\"> some text </item>\n\
             - URI: file:///data/order.xml\n\n"
        );
    }

    #[test]
    fn test_attribute_node_rendering() {
        let node = Node::Attribute(Attribute::new("currency", "EU R"));
        assert_eq!(render_node(&node), "currency EU R");
    }

    #[test]
    fn test_partial_location() {
        let event = DiagnosticEvent::fatal("bad").with_locator(SourceLocator {
            column: Some(0),
            ..Default::default()
        });
        assert_eq!(format_event(&event), "Fatal: bad\nLocation:\n- Column: 0\n\n");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "log unavailable"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_exposes_write_failure() {
        let mut aggregator = ValidationAggregator::new(FailingWriter);
        let (action, written) = aggregator.record(&DiagnosticEvent::warning("w"));
        assert_eq!(action, Action::Continue);
        assert_eq!(written.unwrap_err().kind(), io::ErrorKind::Other);
        assert!(aggregator.is_valid());
    }

    #[test]
    fn test_write_failure_does_not_change_decision() {
        let mut aggregator = ValidationAggregator::new(FailingWriter);
        assert_eq!(aggregator.handle_error(&DiagnosticEvent::error("e")), Action::Continue);
        assert_eq!(aggregator.handle_error(&DiagnosticEvent::fatal("f")), Action::Abort);
        assert!(!aggregator.is_valid());
    }
}
