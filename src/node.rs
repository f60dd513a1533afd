//! Owned document tree.
//!
//! Produced by the document builder and carried by validation locators as the
//! offending node. Only what the diagnostics need is modelled: no namespaces,
//! no parent links.

/// A single attribute, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// `<!DOCTYPE ...>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentType {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub internal_subset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document {
        children: Vec<Node>,
    },
    DocumentType(DocumentType),
    Element {
        name: String,
        attributes: Vec<Attribute>,
        children: Vec<Node>,
    },
    Attribute(Attribute),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    EntityReference(String),
}

impl Node {
    pub fn element(name: impl Into<String>) -> Self {
        Node::Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Builder: add an attribute. No-op on non-element nodes.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element { attributes, .. } = &mut self {
            attributes.push(Attribute::new(name, value));
        }
        self
    }

    /// Builder: append a child. No-op on nodes that cannot have children.
    pub fn with_child(mut self, child: Node) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    /// Node name as the DOM would report it
    pub fn name(&self) -> &str {
        match self {
            Node::Document { .. } => "#document",
            Node::DocumentType(doctype) => &doctype.name,
            Node::Element { name, .. } => name,
            Node::Attribute(attribute) => &attribute.name,
            Node::Text(_) => "#text",
            Node::CData(_) => "#cdata-section",
            Node::Comment(_) => "#comment",
            Node::ProcessingInstruction { target, .. } => target,
            Node::EntityReference(name) => name,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// First element child of a document node
    pub fn document_element(&self) -> Option<&Node> {
        match self {
            Node::Document { children } => children
                .iter()
                .find(|child| matches!(child, Node::Element { .. })),
            _ => None,
        }
    }
}
