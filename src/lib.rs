//! # bulk-transform Library
//!
//! Diagnostics support for batch XML/XSLT conversion: resource references that
//! decompose into path, name and anchor, reporters that turn engine errors into
//! one-line located messages, and aggregation of schema validation errors.

pub mod cause;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod dom_builder;
pub mod engine;
pub mod error;
pub mod href;
pub mod node;
pub mod node_writer;
pub mod reporter;
pub mod resource;
pub mod validation;

pub use cause::{Cause, CauseKind, SourceLocator};
pub use cli::{Cli, Command, VerbosityLevel};
pub use config::{Config, ConfigManager, NetworkConfig, ReportingConfig};
pub use diagnostic::{Action, DiagnosticEvent, Severity};
pub use dom_builder::{parse_document, parse_string};
pub use engine::{DocumentValidator, Parameters, Stylesheet, XsltProcessor, validate_document};
pub use error::{DiagnosticsError, Result};
pub use href::{HRef, unescape_url_path};
pub use node::{Attribute, DocumentType, Node};
pub use reporter::{DiagnosticListener, LoggingReporter, StrictReporter};
pub use resource::{HttpClientConfig, ResourceClient};
pub use validation::{ValidationAggregator, ValidationHandler, ValidationSummary};
