//! Document parsing.
//!
//! Builds a [`Node::Document`] from XML text with `quick-xml`. Well-formedness
//! failures are adapted into a located parse [`Cause`] so they flow through the
//! same reporters as transform diagnostics.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::cause::{Cause, SourceLocator};
use crate::node::{Attribute, DocumentType, Node};

/// Parse `text` into a document tree. `system_id` identifies the source in
/// diagnostics.
pub fn parse_document(text: &str, system_id: Option<&str>) -> Result<Node, Cause> {
    let mut builder = Builder {
        text,
        system_id,
        stack: vec![Node::Document {
            children: Vec::new(),
        }],
    };
    builder.run()?;

    let document = builder.stack.pop().unwrap_or(Node::Document {
        children: Vec::new(),
    });
    if document.document_element().is_none() {
        return Err(builder.error_at("Premature end of file.", text.len()));
    }
    Ok(document)
}

/// Parse a string as in-memory document with no system id
pub fn parse_string(text: &str) -> Result<Node, Cause> {
    parse_document(text, None)
}

struct Builder<'a> {
    text: &'a str,
    system_id: Option<&'a str>,
    /// Open nodes, document at the bottom
    stack: Vec<Node>,
}

impl Builder<'_> {
    fn run(&mut self) -> Result<(), Cause> {
        let mut reader = Reader::from_str(self.text);

        loop {
            let pos = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| self.error_at(e.to_string(), reader.buffer_position() as usize))?;

            match event {
                Event::Start(e) => {
                    let element = self.element(&e, pos)?;
                    self.stack.push(element);
                }
                Event::Empty(e) => {
                    let element = self.element(&e, pos)?;
                    self.append(element);
                }
                Event::End(_) => {
                    if self.stack.len() < 2 {
                        return Err(self.error_at("Unexpected end tag.", pos));
                    }
                    if let Some(element) = self.stack.pop() {
                        self.append(element);
                    }
                }
                Event::Text(e) => {
                    let raw = self.utf8(&e, pos)?;
                    let value = unescape(&raw).map_err(|err| self.error_at(err.to_string(), pos))?;
                    if self.stack.len() > 1 {
                        self.append(Node::Text(value.into_owned()));
                    } else if !value.trim().is_empty() {
                        let message = if self.stack[0].document_element().is_some() {
                            "Content is not allowed in trailing section."
                        } else {
                            "Content is not allowed in prolog."
                        };
                        return Err(self.error_at(message, pos));
                    }
                }
                Event::CData(e) => {
                    let data = self.utf8(&e, pos)?.into_owned();
                    self.append(Node::CData(data));
                }
                Event::Comment(e) => {
                    let comment = self.utf8(&e, pos)?.into_owned();
                    self.append(Node::Comment(comment));
                }
                Event::PI(e) => {
                    let raw = self.utf8(&e, pos)?;
                    let (target, data) = split_pi(&raw);
                    self.append(Node::ProcessingInstruction { target, data });
                }
                Event::DocType(e) => {
                    let raw = self.utf8(&e, pos)?;
                    self.append(Node::DocumentType(parse_doctype(&raw)));
                }
                Event::Eof => {
                    if self.stack.len() > 1 {
                        let name = self.stack.last().map(Node::name).unwrap_or_default();
                        return Err(self.error_at(
                            format!("The end-tag for element type \"{name}\" is missing."),
                            self.text.len(),
                        ));
                    }
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn element(&self, start: &BytesStart<'_>, pos: usize) -> Result<Node, Cause> {
        let name = self.utf8(start.name().as_ref(), pos)?.into_owned();

        if self.stack.len() == 1 && self.stack[0].document_element().is_some() {
            return Err(self.error_at(
                "The markup in the document following the root element must be well-formed.",
                pos,
            ));
        }

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| self.error_at(e.to_string(), pos))?;
            let key = self.utf8(attribute.key.as_ref(), pos)?.into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| self.error_at(e.to_string(), pos))?
                .into_owned();
            attributes.push(Attribute::new(key, value));
        }

        Ok(Node::Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn append(&mut self, node: Node) {
        if let Some(children) = self.stack.last_mut().and_then(Node::children_mut) {
            children.push(node);
        }
    }

    fn utf8<'b>(&self, bytes: &'b [u8], pos: usize) -> Result<Cow<'b, str>, Cause> {
        std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| self.error_at(format!("Invalid byte sequence: {e}"), pos))
    }

    fn error_at(&self, message: impl Into<String>, offset: usize) -> Cause {
        let (line, column) = line_column(self.text, offset);
        let mut locator = SourceLocator::new().with_position(line, column);
        if let Some(system_id) = self.system_id {
            locator = locator.with_system_id(system_id);
        }
        Cause::parse(message, locator)
    }
}

/// 1-based line and column of a byte offset
fn line_column(text: &str, offset: usize) -> (u32, u32) {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = &text[..end];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before, |newline| &before[newline + 1..])
        .chars()
        .count()
        + 1;
    (
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}

fn split_pi(raw: &str) -> (String, String) {
    match raw.split_once(|c: char| c.is_ascii_whitespace()) {
        Some((target, data)) => (target.to_string(), data.trim_start().to_string()),
        None => (raw.to_string(), String::new()),
    }
}

/// Parse the inside of `<!DOCTYPE ...>`: name, external id and internal subset.
fn parse_doctype(raw: &str) -> DocumentType {
    let raw = raw.trim();
    let (head, internal_subset) = match (raw.find('['), raw.rfind(']')) {
        (Some(open), Some(close)) if close > open => {
            (&raw[..open], Some(raw[open + 1..close].to_string()))
        }
        _ => (raw, None),
    };

    let mut tokens = Tokens { rest: head };
    let name = tokens.word().unwrap_or_default();
    let mut doctype = DocumentType {
        name,
        internal_subset,
        ..Default::default()
    };

    match tokens.word().as_deref() {
        Some("PUBLIC") => {
            doctype.public_id = tokens.literal();
            doctype.system_id = tokens.literal();
        }
        Some("SYSTEM") => doctype.system_id = tokens.literal(),
        _ => {}
    }
    doctype
}

struct Tokens<'a> {
    rest: &'a str,
}

impl Tokens<'_> {
    fn word(&mut self) -> Option<String> {
        let trimmed = self.rest.trim_start();
        let end = trimmed
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return None;
        }
        self.rest = &trimmed[end..];
        Some(trimmed[..end].to_string())
    }

    fn literal(&mut self) -> Option<String> {
        let trimmed = self.rest.trim_start();
        let quote = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let body = &trimmed[1..];
        let close = body.find(quote)?;
        self.rest = &body[close + 1..];
        Some(body[..close].to_string())
    }
}
