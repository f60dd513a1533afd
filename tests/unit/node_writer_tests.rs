use bulk_transform::node_writer::{compact_whitespace, write_child_nodes, write_node};
use bulk_transform::{Attribute, Node, parse_string};

#[test]
fn test_text_escaping() {
    let node = Node::element("p").with_child(Node::text("<a & b>"));
    assert_eq!(write_node(&node), "<p>&lt;a &amp; b&gt;</p>");
}

#[test]
fn test_quote_escaped_only_in_attributes() {
    let node = Node::element("p")
        .with_attribute("title", "say \"hi\"")
        .with_child(Node::text("say \"hi\""));
    assert_eq!(
        write_node(&node),
        "<p title=\"say &quot;hi&quot;\">say \"hi\"</p>"
    );
}

#[test]
fn test_carriage_return_always_escaped() {
    let node = Node::element("p")
        .with_attribute("v", "a\rb")
        .with_child(Node::text("c\rd"));
    assert_eq!(write_node(&node), "<p v=\"a&#xD;b\">c&#xD;d</p>");
}

#[test]
fn test_tab_and_newline_escaped_only_in_attributes() {
    let node = Node::element("p")
        .with_attribute("v", "a\tb\nc")
        .with_child(Node::text("a\tb\nc"));
    assert_eq!(write_node(&node), "<p v=\"a&#x9;b&#xA;c\">a\tb\nc</p>");
}

#[test]
fn test_control_characters() {
    let node = Node::text("\u{1}\u{7F}\u{85}\u{2028}");
    assert_eq!(write_node(&node), "&#x1;&#x7F;&#x85;&#x2028;");
}

#[test]
fn test_detached_attribute_renders_value() {
    let node = Node::Attribute(Attribute::new("currency", "<EUR>"));
    assert_eq!(write_node(&node), "&lt;EUR&gt;");
}

#[test]
fn test_parsed_document_renders_root_only() {
    let document = parse_string("<?xml version=\"1.0\"?>\n<!--lead-->\n<a><b/>tail</a>").unwrap();
    assert_eq!(write_node(&document), "<a><b/>tail</a>");
    assert_eq!(write_child_nodes(document.document_element().unwrap()), "<b/>tail");
}

#[test]
fn test_compact_whitespace() {
    assert_eq!(compact_whitespace("a \t\n\r\u{B}\u{C} b"), "a b");
    assert_eq!(compact_whitespace("\u{A0}kept\u{A0}"), "\u{A0}kept\u{A0}");
}
