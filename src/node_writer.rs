//! Structural node serialization.
//!
//! Renders a [`Node`] tree as markup for inclusion in diagnostic reports. The
//! escaping is chosen so the rendering reparses to the same content: carriage
//! returns and control characters always become numeric references.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{DocumentType, Node};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\x0B\x0C\r]+").expect("whitespace pattern is valid"));

/// Writes out the content of a node tree as a string.
pub fn write_node(node: &Node) -> String {
    let mut out = String::new();
    write(&mut out, node);
    out
}

/// Writes out the children of a node as a string.
pub fn write_child_nodes(node: &Node) -> String {
    let mut out = String::new();
    for child in node.children() {
        write(&mut out, child);
    }
    out
}

/// Collapse every run of whitespace into a single space.
pub fn compact_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value, " ").into_owned()
}

/// Compact whitespace in all descendant text nodes, in place.
pub fn compact_text_nodes(node: &mut Node) {
    match node {
        Node::Text(text) => *text = compact_whitespace(text),
        Node::Document { children } | Node::Element { children, .. } => {
            children.iter_mut().for_each(compact_text_nodes);
        }
        _ => {}
    }
}

fn write(out: &mut String, node: &Node) {
    match node {
        Node::Document { .. } => {
            if let Some(element) = node.document_element() {
                write(out, element);
            }
        }
        Node::DocumentType(doctype) => write_doctype(out, doctype),
        Node::Element {
            name,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for attribute in attributes {
                out.push(' ');
                out.push_str(&attribute.name);
                out.push_str("=\"");
                normalize_and_write(out, &attribute.value, true);
                out.push('"');
            }
            if children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write(out, child);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        // A detached attribute renders as its value only
        Node::Attribute(attribute) => normalize_and_write(out, &attribute.value, true),
        Node::EntityReference(name) => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::Text(text) => normalize_and_write(out, text, false),
        Node::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

fn write_doctype(out: &mut String, doctype: &DocumentType) {
    out.push_str("<!DOCTYPE ");
    out.push_str(&doctype.name);
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public_id), system_id) => {
            out.push_str(" PUBLIC '");
            out.push_str(public_id);
            out.push_str("' '");
            out.push_str(system_id.as_deref().unwrap_or(""));
            out.push('\'');
        }
        (None, Some(system_id)) => {
            out.push_str(" SYSTEM '");
            out.push_str(system_id);
            out.push('\'');
        }
        (None, None) => {}
    }
    if let Some(subset) = &doctype.internal_subset {
        out.push_str(" [\n");
        out.push_str(subset);
        out.push(']');
    }
    out.push_str(">\n");
}

fn normalize_and_write(out: &mut String, value: &str, is_att_value: bool) {
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' if is_att_value => out.push_str("&quot;"),
            // Reparsing would normalize a literal CR away
            '\r' => out.push_str("&#xD;"),
            c if needs_char_reference(c, is_att_value) => {
                out.push_str(&format!("&#x{:X};", c as u32));
            }
            c => out.push(c),
        }
    }
}

fn needs_char_reference(c: char, is_att_value: bool) -> bool {
    let code = c as u32;
    ((0x01..=0x1F).contains(&code) && c != '\t' && c != '\n')
        || (0x7F..=0x9F).contains(&code)
        || code == 0x2028
        || (is_att_value && (c == '\t' || c == '\n'))
}
