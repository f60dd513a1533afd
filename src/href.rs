//! Reference (HREF) parsing
//!
//! An [`HRef`] wraps a URI-like reference such as `file:///data/in%20box/doc.xml#intro`,
//! a relative path, or a bare file name, and exposes its path, name and anchor
//! segments with percent-escaped UTF-8 decoded. The derived views are recomputed
//! from the raw reference on every call.

use std::fmt;
use std::io::Read;

use url::Url;

use crate::error::{DiagnosticsError, Result};
use crate::resource::ResourceClient;

/// Marker to identify the anchor in an HREF.
pub const ANCHOR_MARKER: char = '#';

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

const ESCAPE_MARKER: char = '%';

/// A URI-like reference. Equality and hashing use the raw, undecoded string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HRef {
    href: Option<String>,
}

impl HRef {
    /// Create a reference from a string.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
        }
    }

    /// A reference with no value set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the current reference. No validation is performed.
    pub fn parse(&mut self, href: Option<&str>) {
        self.href = href.map(str::to_owned);
    }

    /// The raw reference, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Byte length of the raw reference, 0 if none is set.
    pub fn len(&self) -> usize {
        self.href.as_ref().map_or(0, String::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the file referenced by the HREF: the decoded text between the last
    /// path separator and the anchor marker.
    pub fn name(&self) -> Option<String> {
        let href = self.href.as_deref()?;
        let start = name_start(href);

        let end = match href.rfind(ANCHOR_MARKER) {
            Some(anchor) if anchor >= start => anchor,
            _ => href.len(),
        };

        (end > start).then(|| unescape_url_path(&href[start..end]))
    }

    /// Path of the file referenced by the HREF: the decoded text before the last
    /// path separator.
    pub fn path(&self) -> Option<String> {
        let href = self.href.as_deref()?;
        href.rfind(PATH_SEPARATOR)
            .map(|separator| unescape_url_path(&href[..separator]))
    }

    /// Anchor referenced by the HREF. An anchor marker that sits inside an earlier
    /// path segment is not an anchor.
    pub fn anchor(&self) -> Option<String> {
        let href = self.href.as_deref()?;
        let start = name_start(href);

        href.rfind(ANCHOR_MARKER)
            .filter(|&anchor| anchor >= start)
            .map(|anchor| unescape_url_path(&href[anchor + ANCHOR_MARKER.len_utf8()..]))
    }

    /// Open a byte stream to the resource. The reference must be an absolute URL.
    pub fn open_stream(&self) -> Result<Box<dyn Read>> {
        self.open_stream_with(&ResourceClient::default())
    }

    /// Open a byte stream to the resource, resolving the reference against `context`.
    pub fn open_stream_in(&self, context: &Url) -> Result<Box<dyn Read>> {
        self.open_stream_in_with(context, &ResourceClient::default())
    }

    /// Like [`open_stream`](Self::open_stream) using a configured client.
    pub fn open_stream_with(&self, client: &ResourceClient) -> Result<Box<dyn Read>> {
        let href = self.href.as_deref().ok_or(DiagnosticsError::EmptyReference)?;
        let url = Url::parse(href).map_err(|e| DiagnosticsError::InvalidReference {
            reference: href.to_string(),
            details: e.to_string(),
        })?;
        client.open(&url)
    }

    /// Like [`open_stream_in`](Self::open_stream_in) using a configured client.
    pub fn open_stream_in_with(
        &self,
        context: &Url,
        client: &ResourceClient,
    ) -> Result<Box<dyn Read>> {
        let href = self.href.as_deref().ok_or(DiagnosticsError::EmptyReference)?;
        let url = context
            .join(href)
            .map_err(|e| DiagnosticsError::InvalidReference {
                reference: href.to_string(),
                details: e.to_string(),
            })?;
        client.open(&url)
    }

    /// True if a stream to the resource can be opened. Failures mean "does not exist".
    pub fn exists(&self) -> bool {
        let opened = self.open_stream();
        if let Err(e) = &opened {
            tracing::trace!(href = ?self.href, error = %e, "resource not reachable");
        }
        opened.is_ok()
    }

    /// True if a stream to the resource, resolved against `context`, can be opened.
    pub fn exists_in(&self, context: &Url) -> bool {
        let opened = self.open_stream_in(context);
        if let Err(e) = &opened {
            tracing::trace!(href = ?self.href, %context, error = %e, "resource not reachable");
        }
        opened.is_ok()
    }
}

impl From<&str> for HRef {
    fn from(href: &str) -> Self {
        HRef::new(href)
    }
}

impl From<Option<&str>> for HRef {
    fn from(href: Option<&str>) -> Self {
        Self {
            href: href.map(str::to_owned),
        }
    }
}

impl PartialEq<str> for HRef {
    fn eq(&self, other: &str) -> bool {
        self.href.as_deref() == Some(other)
    }
}

impl PartialEq<&str> for HRef {
    fn eq(&self, other: &&str) -> bool {
        self.href.as_deref() == Some(*other)
    }
}

impl fmt::Display for HRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href.as_deref().unwrap_or(""))
    }
}

/// Byte index of the first character of the name segment.
fn name_start(href: &str) -> usize {
    href.rfind(PATH_SEPARATOR)
        .map_or(0, |separator| separator + PATH_SEPARATOR.len_utf8())
}

/// Unescapes percent-escaped UTF-8 sequences in a URL path.
///
/// Decoding is best-effort: malformed UTF-8 is not rejected, the decoder emits
/// whatever its state machine produces. A `%` that is not followed by two hex
/// digits is kept as a literal character. Characters that were not escaped and
/// are outside ASCII are copied through unchanged.
pub fn unescape_url_path(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    let mut out = String::with_capacity(path.len());
    let mut decoder = Utf8Decoder::default();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if c == ESCAPE_MARKER && i + 2 < chars.len() {
            if let (Some(high), Some(low)) = (chars[i + 1].to_digit(16), chars[i + 2].to_digit(16))
            {
                decoder.feed((high << 4) | low, &mut out);
                i += 3;
                continue;
            }
        }

        if c.is_ascii() {
            decoder.feed(c as u32, &mut out);
        } else {
            out.push(c);
        }
        i += 1;
    }

    out
}

/// Running UTF-8 multi-byte decode state.
#[derive(Debug, Default)]
struct Utf8Decoder {
    /// Continuation bytes still expected; goes negative on stray continuation bytes.
    more_bytes: i32,
    /// Accumulated code point bits.
    sum_bytes: u32,
}

impl Utf8Decoder {
    fn feed(&mut self, byte: u32, out: &mut String) {
        if byte & 0xC0 == 0x80 {
            // 10xxxxxx
            self.sum_bytes = (self.sum_bytes << 6) | (byte & 0x3F);
            self.more_bytes -= 1;
            if self.more_bytes == 0 {
                out.push(char::from_u32(self.sum_bytes).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        } else if byte & 0x80 == 0x00 {
            // 0xxxxxxx
            out.push(char::from_u32(byte).unwrap_or(char::REPLACEMENT_CHARACTER));
        } else if byte & 0xE0 == 0xC0 {
            // 110xxxxx
            self.start(byte & 0x1F, 1);
        } else if byte & 0xF0 == 0xE0 {
            // 1110xxxx
            self.start(byte & 0x0F, 2);
        } else if byte & 0xF8 == 0xF0 {
            // 11110xxx
            self.start(byte & 0x07, 3);
        } else if byte & 0xFC == 0xF8 {
            // 111110xx
            self.start(byte & 0x03, 4);
        } else {
            // 1111110x
            self.start(byte & 0x01, 5);
        }
    }

    fn start(&mut self, bits: u32, more_bytes: i32) {
        self.sum_bytes = bits;
        self.more_bytes = more_bytes;
    }
}
