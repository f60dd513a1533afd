use std::io::Write;
use std::sync::{Arc, Mutex};

use bulk_transform::node_writer::{compact_text_nodes, write_node};
use bulk_transform::{
    Action, Cause, DiagnosticEvent, DiagnosticListener, DocumentValidator, Node, Parameters,
    Result, Severity, ValidationHandler, XsltProcessor,
};

/// Compiled form produced by [`MockXsltProcessor`]
#[derive(Debug, Clone, PartialEq)]
pub struct MockCompiled {
    pub system_id: String,
    pub source: String,
}

/// XSLT processor stand-in: wraps the serialized input in `<out>` and raises
/// scripted diagnostics before writing anything.
#[derive(Clone, Default)]
pub struct MockXsltProcessor {
    diagnostics: Vec<(Severity, Cause)>,
    compile_error: Option<Cause>,
    compile_log: Arc<Mutex<Vec<String>>>,
}

impl MockXsltProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostic(mut self, severity: Severity, cause: Cause) -> Self {
        self.diagnostics.push((severity, cause));
        self
    }

    pub fn failing_compile(mut self, cause: Cause) -> Self {
        self.compile_error = Some(cause);
        self
    }

    /// System ids of every compilation, shared with clones
    pub fn compile_log(&self) -> Vec<String> {
        self.compile_log.lock().unwrap().clone()
    }
}

impl XsltProcessor for MockXsltProcessor {
    type Compiled = MockCompiled;

    fn compile(&self, source: &[u8], system_id: &str) -> std::result::Result<MockCompiled, Cause> {
        self.compile_log.lock().unwrap().push(system_id.to_string());
        if let Some(cause) = &self.compile_error {
            return Err(cause.clone());
        }
        Ok(MockCompiled {
            system_id: system_id.to_string(),
            source: String::from_utf8_lossy(source).into_owned(),
        })
    }

    fn transform(
        &self,
        _compiled: &MockCompiled,
        input: &Node,
        parameters: &Parameters,
        output: &mut dyn Write,
        listener: &mut dyn DiagnosticListener,
    ) -> Result<()> {
        for (severity, cause) in &self.diagnostics {
            listener.report(*severity, cause)?.into_result(cause)?;
        }

        let mut out = Node::element("out");
        for (key, value) in parameters.iter() {
            out = out.with_attribute(key, value);
        }
        if let Some(root) = input.document_element() {
            out = out.with_child(root.clone());
        }
        output.write_all(write_node(&out).as_bytes())?;
        Ok(())
    }
}

/// Validator stand-in that replays scripted events and normalizes text nodes
#[derive(Clone, Default)]
pub struct MockValidator {
    events: Vec<DiagnosticEvent>,
    delivered: Arc<Mutex<usize>>,
}

impl MockValidator {
    pub fn new(events: Vec<DiagnosticEvent>) -> Self {
        Self {
            events,
            delivered: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of events the handler saw in the last pass
    pub fn delivered(&self) -> usize {
        *self.delivered.lock().unwrap()
    }
}

impl DocumentValidator for MockValidator {
    fn validate(&self, document: &mut Node, handler: &mut dyn ValidationHandler) {
        let mut delivered = 0;
        for event in &self.events {
            delivered += 1;
            if handler.handle_error(event) == Action::Abort {
                break;
            }
        }
        *self.delivered.lock().unwrap() = delivered;
        compact_text_nodes(document);
    }
}

/// Listener recording every call and answering with a fixed action
pub struct RecordingListener {
    pub answer: Action,
    pub received: Vec<(Severity, String)>,
}

impl RecordingListener {
    pub fn new(answer: Action) -> Self {
        Self {
            answer,
            received: Vec::new(),
        }
    }
}

impl DiagnosticListener for RecordingListener {
    fn report(&mut self, severity: Severity, cause: &Cause) -> Result<Action> {
        self.received.push((severity, cause.message().to_string()));
        Ok(self.answer)
    }
}
