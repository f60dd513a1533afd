use bulk_transform::{HRef, unescape_url_path};

#[test]
fn test_no_anchor_marker_means_no_anchor() {
    for reference in [
        "doc.xml",
        "dir/doc.xml",
        "http://example.org/a/b/c.xsl",
        "",
        "/",
        "%23encoded-hash",
    ] {
        assert_eq!(HRef::new(reference).anchor(), None, "{reference}");
    }
}

#[test]
fn test_directory_name_and_fragment() {
    let href = HRef::new("dir/sub/name.ext#frag");
    assert_eq!(href.path().as_deref(), Some("dir/sub"));
    assert_eq!(href.name().as_deref(), Some("name.ext"));
    assert_eq!(href.anchor().as_deref(), Some("frag"));
}

#[test]
fn test_anchor_in_earlier_segment_is_ignored() {
    let href = HRef::new("a#b/c");
    assert_eq!(href.anchor(), None);
    assert_eq!(href.name().as_deref(), Some("c"));
    assert_eq!(href.path().as_deref(), Some("a#b"));
}

#[test]
fn test_reference_ending_at_separator_has_no_name() {
    let href = HRef::new("http://example.org/styles/");
    assert_eq!(href.name(), None);
    assert_eq!(href.path().as_deref(), Some("http://example.org/styles"));
}

#[test]
fn test_views_follow_reparse() {
    let mut href = HRef::new("first/one.xml#top");
    assert_eq!(href.name().as_deref(), Some("one.xml"));

    href.parse(Some("second/two%20words.xsl"));
    assert_eq!(href.name().as_deref(), Some("two words.xsl"));
    assert_eq!(href.anchor(), None);
    assert_eq!(href.len(), "second/two%20words.xsl".len());

    href.parse(None);
    assert_eq!(href.len(), 0);
    assert_eq!(href.name(), None);
    assert_eq!(href.path(), None);
}

#[test]
fn test_all_views_are_decoded() {
    let href = HRef::new("file:///Gem%C3%BCse/caf%C3%A9.xml#%C2%A7%201");
    assert_eq!(href.path().as_deref(), Some("file:///Gemüse"));
    assert_eq!(href.name().as_deref(), Some("café.xml"));
    assert_eq!(href.anchor().as_deref(), Some("§ 1"));
}

#[test]
fn test_equality_uses_raw_value() {
    assert_ne!(HRef::new("a%20b"), HRef::new("a b"));
    assert_eq!(HRef::new("a%20b"), HRef::new("a%20b"));
    assert_eq!(
        HRef::new("a%20b").name(),
        HRef::new("a b").name()
    );
}

#[test]
fn test_unescape_properties() {
    assert_eq!(unescape_url_path("%41%42"), "AB");
    assert_eq!(unescape_url_path("%C3%A9"), "é");
    assert_eq!(unescape_url_path("%c3%a9"), "é");
    assert_eq!(unescape_url_path("%E2%82%AC"), "€");
    assert_eq!(unescape_url_path("already é"), "already é");
}
