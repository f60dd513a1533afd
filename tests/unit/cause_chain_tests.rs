use bulk_transform::reporter::{format_report, identify, resolve_locator};
use bulk_transform::{
    Action, Cause, DiagnosticListener, LoggingReporter, SourceLocator, StrictReporter,
    VerbosityLevel, parse_document,
};

/// A transform failure wrapping the parse error of an included document
fn include_failure() -> Cause {
    let parse_error = parse_document(
        "<catalogue>\n  <item>\n</catalogue>",
        Some("file:///data/in%20box/catalogue.xml"),
    )
    .unwrap_err();

    Cause::transform("document() could not load included source")
        .with_locator(SourceLocator::new().with_system_id("file:///styles/merge.xsl"))
        .caused_by(Cause::wrapped("I/O error reading include", parse_error))
}

#[test]
fn test_parse_error_location_wins_over_stylesheet() {
    let cause = include_failure();
    let locator = resolve_locator(&cause).unwrap();

    assert_eq!(
        locator.system_id.as_deref(),
        Some("file:///data/in%20box/catalogue.xml")
    );
    assert!(locator.line.is_some());
    assert_eq!(identify(&cause), "catalogue.xml");
}

#[test]
fn test_first_locator_is_used_when_deeper_causes_have_none() {
    let cause = Cause::transform("xsl:call-template: template not found")
        .with_locator(SourceLocator::new().with_system_id("styles/render%20page.xsl"))
        .caused_by(Cause::other("lookup failed"));

    assert_eq!(
        format_report(&cause, VerbosityLevel::Normal),
        "render page.xsl: xsl:call-template: template not found"
    );
}

#[test]
fn test_debug_report_lists_whole_chain() {
    let cause = include_failure();
    let report = format_report(&cause, VerbosityLevel::Debug);
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(
        lines[0],
        "catalogue.xml: document() could not load included source"
    );
    assert_eq!(lines[1], "Cause chain:");
    assert_eq!(lines[2], "  1: I/O error reading include");
    assert!(lines[3].starts_with("  2: "));
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_reporters_write_same_line_with_different_decisions() {
    let cause = include_failure();

    let mut strict = StrictReporter::new(Vec::new());
    let mut logging = LoggingReporter::new(Vec::new());
    assert_eq!(strict.error(&cause).unwrap(), Action::Abort);
    assert_eq!(logging.error(&cause).unwrap(), Action::Continue);

    assert_eq!(strict.into_inner(), logging.into_inner());
}
