//! soap/xml.rs
//!
//! Minimal zero-copy XML scanning for SOAP envelopes.
//! Elements are matched by local name; namespace prefixes are ignored.
//! Only what a request/response round with the security service needs:
//! tags, attributes, text, CDATA. No DTDs, no validation.

use memchr::{memchr, memchr3, memmem, memrchr};
use std::{borrow::Cow, error::Error as StdError, fmt, str};

// -----------------------------------------------------------------------------
// ----- Element ---------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    name: &'a [u8],
    attrs: &'a [u8],
    inner: &'a [u8],
}

impl<'a> Element<'a> {
    pub fn local_name(&self) -> &'a [u8] {
        local_name(self.name)
    }

    /// Raw bytes between the start and end tag. Empty for `<x/>`.
    pub fn inner(&self) -> &'a [u8] {
        self.inner
    }

    pub fn attribute(&self, local: &str) -> Option<&'a [u8]> {
        attribute(self.attrs, local)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.attribute("nil"), Some(b"true") | Some(b"1"))
    }

    pub fn find(&self, local: &str) -> Result<Option<Element<'a>>, XmlError> {
        find_element(self.inner, local)
    }

    /// First direct child whose local name equals `local`.
    pub fn child(&self, local: &str) -> Result<Option<Element<'a>>, XmlError> {
        Ok(children(self.inner)?
            .into_iter()
            .find(|c| c.local_name() == local.as_bytes()))
    }

    pub fn children(&self) -> Result<Vec<Element<'a>>, XmlError> {
        children(self.inner)
    }

    pub fn text(&self) -> Result<String, XmlError> {
        text_content(self.inner)
    }

    /// Like [`Element::text`], but every tag boundary becomes a space so text
    /// of sibling elements never runs together.
    pub fn spaced_text(&self) -> Result<String, XmlError> {
        collect_text(self.inner, true)
    }
}

// -----------------------------------------------------------------------------
// ----- Lookup ----------------------------------------------------------------

/// First element (at any depth) whose local name equals `local`.
pub fn find_element<'a>(doc: &'a [u8], local: &str) -> Result<Option<Element<'a>>, XmlError> {
    let mut tags = Tags::new(doc);
    while let Some(span) = tags.next_tag()? {
        if let Tag::Start { name, .. } = span.tag {
            if local_name(name) == local.as_bytes() {
                return read_element(&mut tags, span).map(Some);
            }
        }
    }
    Ok(None)
}

/// Direct child elements of `inner`, in document order.
pub fn children(inner: &[u8]) -> Result<Vec<Element<'_>>, XmlError> {
    let mut tags = Tags::new(inner);
    let mut out = Vec::new();
    while let Some(span) = tags.next_tag()? {
        match span.tag {
            Tag::Start { .. } => out.push(read_element(&mut tags, span)?),
            Tag::End { name } => {
                return Err(XmlError::UnexpectedEndTag(lossy(local_name(name))));
            }
        }
    }
    Ok(out)
}

/// Concatenated, unescaped character data of `inner`, markup stripped.
pub fn text_content(inner: &[u8]) -> Result<String, XmlError> {
    collect_text(inner, false)
}

fn collect_text(inner: &[u8], spaced: bool) -> Result<String, XmlError> {
    let mut out = String::new();
    let mut pos = 0;

    while let Some(offset) = memchr(b'<', &inner[pos..]) {
        let lt = pos + offset;
        out.push_str(&unescape(&inner[pos..lt])?);

        let (markup, end) = markup_at(inner, lt)?;
        match markup {
            Markup::CData(raw) => {
                out.push_str(str::from_utf8(raw).map_err(XmlError::InvalidUtf8)?)
            }
            Markup::Tag(_) if spaced => out.push(' '),
            _ => {}
        }
        pos = end;
    }

    out.push_str(&unescape(&inner[pos..])?);
    Ok(out)
}

// -----------------------------------------------------------------------------
// ----- Escaping --------------------------------------------------------------

pub fn escape(text: &str) -> Cow<'_, str> {
    let needs_escape = text
        .bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''));
    if !needs_escape {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

pub fn unescape(raw: &[u8]) -> Result<Cow<'_, str>, XmlError> {
    let text = str::from_utf8(raw).map_err(XmlError::InvalidUtf8)?;
    if memchr(b'&', raw).is_none() {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| XmlError::BadEntity(after.chars().take(8).collect()))?;
        out.push(decode_entity(&after[..semi])?);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);

    Ok(Cow::Owned(out))
}

fn decode_entity(entity: &str) -> Result<char, XmlError> {
    let ch = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    };

    ch.ok_or_else(|| XmlError::BadEntity(entity.to_string()))
}

// -----------------------------------------------------------------------------
// ----- Internal: Tokenizer ---------------------------------------------------

#[derive(Clone, Copy, Debug)]
enum Tag<'a> {
    Start {
        name: &'a [u8],
        attrs: &'a [u8],
        self_closing: bool,
    },
    End {
        name: &'a [u8],
    },
}

#[derive(Clone, Copy, Debug)]
struct TagSpan<'a> {
    tag: Tag<'a>,
    /// Offset of `<`.
    start: usize,
    /// Offset just past `>`.
    end: usize,
}

enum Markup<'a> {
    Skipped,
    CData(&'a [u8]),
    Tag(Tag<'a>),
}

struct Tags<'a> {
    doc: &'a [u8],
    pos: usize,
}

impl<'a> Tags<'a> {
    fn new(doc: &'a [u8]) -> Self {
        Self { doc, pos: 0 }
    }

    fn next_tag(&mut self) -> Result<Option<TagSpan<'a>>, XmlError> {
        while let Some(offset) = memchr(b'<', &self.doc[self.pos..]) {
            let start = self.pos + offset;
            let (markup, end) = markup_at(self.doc, start)?;
            self.pos = end;

            if let Markup::Tag(tag) = markup {
                return Ok(Some(TagSpan { tag, start, end }));
            }
        }
        self.pos = self.doc.len();
        Ok(None)
    }
}

/// Consumes tags up to and including the end tag matching `open`.
fn read_element<'a>(tags: &mut Tags<'a>, open: TagSpan<'a>) -> Result<Element<'a>, XmlError> {
    let Tag::Start {
        name,
        attrs,
        self_closing,
    } = open.tag
    else {
        return Err(XmlError::UnexpectedEndTag(String::new()));
    };

    if self_closing {
        return Ok(Element {
            name,
            attrs,
            inner: &[],
        });
    }

    let mut depth = 1usize;
    while let Some(span) = tags.next_tag()? {
        match span.tag {
            Tag::Start {
                self_closing: false,
                ..
            } => depth += 1,
            Tag::Start { .. } => {}
            Tag::End { name: end_name } => {
                depth -= 1;
                if depth == 0 {
                    if local_name(end_name) != local_name(name) {
                        return Err(XmlError::MismatchedEndTag {
                            expected: lossy(local_name(name)),
                            found: lossy(local_name(end_name)),
                        });
                    }
                    return Ok(Element {
                        name,
                        attrs,
                        inner: &tags.doc[open.end..span.start],
                    });
                }
            }
        }
    }

    Err(XmlError::UnclosedElement(lossy(local_name(name))))
}

/// Classifies the markup starting at `lt` (which must point at `<`).
/// Returns the markup and the offset just past it.
fn markup_at(doc: &[u8], lt: usize) -> Result<(Markup<'_>, usize), XmlError> {
    let rest = &doc[lt..];

    if rest.starts_with(b"<!--") {
        let end = memmem::find(&rest[4..], b"-->").ok_or(XmlError::UnexpectedEof)?;
        return Ok((Markup::Skipped, lt + 4 + end + 3));
    }
    if rest.starts_with(b"<![CDATA[") {
        let body = &rest[9..];
        let end = memmem::find(body, b"]]>").ok_or(XmlError::UnexpectedEof)?;
        return Ok((Markup::CData(&body[..end]), lt + 9 + end + 3));
    }
    if rest.starts_with(b"<?") {
        let end = memmem::find(&rest[2..], b"?>").ok_or(XmlError::UnexpectedEof)?;
        return Ok((Markup::Skipped, lt + 2 + end + 2));
    }
    if rest.starts_with(b"<!") {
        let end = memchr(b'>', rest).ok_or(XmlError::UnexpectedEof)?;
        return Ok((Markup::Skipped, lt + end + 1));
    }

    let gt = find_tag_end(rest).ok_or(XmlError::UnexpectedEof)?;
    let body = &rest[1..gt];
    let end = lt + gt + 1;

    if let Some(name) = body.strip_prefix(b"/") {
        let name = trim(name);
        if name.is_empty() {
            return Err(XmlError::EmptyTagName);
        }
        return Ok((Markup::Tag(Tag::End { name }), end));
    }

    let (body, self_closing) = match body.strip_suffix(b"/") {
        Some(b) => (b, true),
        None => (body, false),
    };
    let name_len = body
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(body.len());
    if name_len == 0 {
        return Err(XmlError::EmptyTagName);
    }

    let tag = Tag::Start {
        name: &body[..name_len],
        attrs: &body[name_len..],
        self_closing,
    };
    Ok((Markup::Tag(tag), end))
}

/// Index of the `>` closing the tag at the start of `rest`, skipping quoted
/// attribute values.
fn find_tag_end(rest: &[u8]) -> Option<usize> {
    let mut pos = 1;
    loop {
        let offset = memchr3(b'>', b'"', b'\'', &rest[pos..])?;
        let at = pos + offset;
        match rest[at] {
            b'>' => return Some(at),
            quote => {
                let close = memchr(quote, &rest[at + 1..])?;
                pos = at + 1 + close + 1;
            }
        }
    }
}

fn attribute<'a>(mut attrs: &'a [u8], local: &str) -> Option<&'a [u8]> {
    loop {
        attrs = trim_start(attrs);
        if attrs.is_empty() {
            return None;
        }

        let eq = memchr(b'=', attrs)?;
        let name = trim(&attrs[..eq]);
        let after = trim_start(&attrs[eq + 1..]);
        let quote = *after.first()?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let close = memchr(quote, &after[1..])?;
        let value = &after[1..1 + close];

        if local_name(name) == local.as_bytes() {
            return Some(value);
        }
        attrs = &after[close + 2..];
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

#[inline]
fn local_name(name: &[u8]) -> &[u8] {
    match memrchr(b':', name) {
        Some(colon) => &name[colon + 1..],
        None => name,
    }
}

#[inline]
fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

#[inline]
fn trim(bytes: &[u8]) -> &[u8] {
    let bytes = trim_start(bytes);
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |p| p + 1);
    &bytes[..end]
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug)]
pub enum XmlError {
    BadEntity(String),
    EmptyTagName,
    InvalidUtf8(str::Utf8Error),
    MismatchedEndTag { expected: String, found: String },
    UnclosedElement(String),
    UnexpectedEndTag(String),
    UnexpectedEof,
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use XmlError::*;
        match self {
            BadEntity(e) => write!(f, "bad entity reference: &{e}"),
            EmptyTagName => write!(f, "empty tag name"),
            InvalidUtf8(e) => write!(f, "utf8: {e}"),
            MismatchedEndTag { expected, found } => {
                write!(f, "expected </{expected}>, found </{found}>")
            }
            UnclosedElement(n) => write!(f, "element <{n}> is never closed"),
            UnexpectedEndTag(n) => write!(f, "unexpected end tag </{n}>"),
            UnexpectedEof => write!(f, "unexpected EOF"),
        }
    }
}

impl StdError for XmlError {}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
