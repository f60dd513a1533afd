//! Cause chains and source locators.
//!
//! Errors raised by the external parse/transform engines are adapted once, at the
//! boundary, into a [`Cause`]: a message, an optional [`SourceLocator`], and an
//! optional nested cause. Everything downstream walks this uniform chain.

use std::fmt;

use crate::node::Node;

/// Structured pointer to a place in a source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceLocator {
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    /// Line number, `None` when unknown
    pub line: Option<u32>,
    /// Column number, `None` when unknown
    pub column: Option<u32>,
    /// Offending node, only present for validation events
    pub node: Option<Node>,
}

impl SourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.node = Some(node);
        self
    }
}

/// Which kind of engine error a [`Cause`] was adapted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CauseKind {
    /// Well-formedness or parse error; always carries a locator
    Parse,
    /// Stylesheet compile or transform error; may carry a locator
    Transform,
    /// Error wrapping another error without adding location
    Wrapped,
    /// Any other error (I/O, engine internals, ...)
    Other,
}

/// One link in a cause chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Cause {
    kind: CauseKind,
    message: String,
    locator: Option<SourceLocator>,
    next: Option<Box<Cause>>,
}

impl Cause {
    /// A parse error located at `locator`
    pub fn parse(message: impl Into<String>, locator: SourceLocator) -> Self {
        Self {
            kind: CauseKind::Parse,
            message: message.into(),
            locator: Some(locator),
            next: None,
        }
    }

    /// A transform error, located with [`with_locator`](Self::with_locator) when known
    pub fn transform(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Transform,
            message: message.into(),
            locator: None,
            next: None,
        }
    }

    /// An error that only wraps `inner`
    pub fn wrapped(message: impl Into<String>, inner: Cause) -> Self {
        Self {
            kind: CauseKind::Wrapped,
            message: message.into(),
            locator: None,
            next: Some(Box::new(inner)),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Other,
            message: message.into(),
            locator: None,
            next: None,
        }
    }

    /// Adapt a Rust error and its `source()` chain. Links carry no locator.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(source) = current {
            messages.push(source.to_string());
            current = source.source();
        }

        let mut cause: Option<Cause> = None;
        for message in messages.into_iter().rev() {
            let mut link = Cause::other(message);
            link.next = cause.map(Box::new);
            cause = Some(link);
        }
        cause.unwrap_or_else(|| Cause::other(error.to_string()))
    }

    pub fn with_locator(mut self, locator: SourceLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Set the nested cause, replacing any existing one
    pub fn caused_by(mut self, next: Cause) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn kind(&self) -> CauseKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locator(&self) -> Option<&SourceLocator> {
        self.locator.as_ref()
    }

    pub fn next(&self) -> Option<&Cause> {
        self.next.as_deref()
    }

    /// Iterate from this cause down to the deepest one
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            current: Some(self),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Cause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.next
            .as_deref()
            .map(|next| next as &(dyn std::error::Error + 'static))
    }
}

/// Iterator over a cause chain, root first
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    current: Option<&'a Cause>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Cause;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.next();
        Some(current)
    }
}
