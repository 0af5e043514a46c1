//! Whole-document XML tree built on quick-xml.
//!
//! The mapping engine needs random access to child elements and relative
//! `a/b` path lookups, so responses are read into a small owned tree instead
//! of being consumed as an event stream.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ApiError, Result};

/// One XML element with its direct text content and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text directly inside this element, entity references resolved.
    ///
    /// Text of descendant elements is not included. Whitespace is kept as-is.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All descendants reached by the relative path `path` (`a/b/c`), in
    /// document order.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter().filter(move |c| c.name == segment))
                .collect();
        }
        current
    }

    /// First descendant reached by the relative path `path`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

/// Parse `input` into a tree and return its root element.
///
/// Returns `Ok(None)` when the input holds no element at all (empty body,
/// whitespace, or only a declaration).
pub fn parse_document(input: &[u8]) -> Result<Option<Element>> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let element = open_element(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let decoded = e.decode().map_err(content_error)?;
                    let unescaped = quick_xml::escape::unescape(&decoded).map_err(content_error)?;
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(current) = stack.last_mut() {
                    let name = e.decode().map_err(content_error)?;
                    current.text.push_str(&resolve_reference(&name)?);
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ApiError::XmlContent(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    Ok(root)
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.name().as_ref())?.to_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(content_error)?;
        let key = utf8(attribute.key.as_ref())?.to_owned();
        let raw = utf8(&attribute.value)?;
        let value = quick_xml::escape::unescape(raw).map_err(content_error)?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Resolve `&name;` where `name` is a predefined entity or a character reference.
fn resolve_reference(name: &str) -> Result<Cow<'static, str>> {
    let predefined = match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    };
    if let Some(text) = predefined {
        return Ok(Cow::Borrowed(text));
    }

    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32)
        .map(|c| Cow::Owned(c.to_string()))
        .ok_or_else(|| ApiError::XmlContent(format!("unknown entity reference &{name};")))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(content_error)
}

fn content_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::XmlContent(err.to_string())
}
