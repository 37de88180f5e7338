use crate::errors::{AppError, AppResult};
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::BufRead;

/// Kind of node the cursor is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    EndElement,
    Text,
}

/// Forward-only pull cursor over one XML stream.
///
/// Wraps a `quick_xml` reader and exposes the current node's kind, local name,
/// attributes and text. Self-closing elements are reported once as an `Element`
/// with [`XmlCursor::is_empty_element`] set and no matching `EndElement`.
pub struct XmlCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    kind: Option<NodeKind>,
    name: String,
    attributes: Vec<(String, String)>,
    empty: bool,
    text: String,
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        // Whitespace is content in shared strings and inline strings
        reader.config_mut().trim_text(false);

        Self {
            reader,
            buf: Vec::with_capacity(4096),
            kind: None,
            name: String::new(),
            attributes: Vec::with_capacity(8),
            empty: false,
            text: String::new(),
        }
    }

    /// Moves to the next element, end tag or text node.
    ///
    /// Declarations, comments and processing instructions are skipped.
    /// Returns `None` once the stream is exhausted.
    pub fn advance(&mut self) -> AppResult<Option<NodeKind>> {
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?;
            let kind = match event {
                Event::Start(e) => {
                    fill_element(&e, &mut self.name, &mut self.attributes)?;
                    self.empty = false;
                    NodeKind::Element
                }
                Event::Empty(e) => {
                    fill_element(&e, &mut self.name, &mut self.attributes)?;
                    self.empty = true;
                    NodeKind::Element
                }
                Event::End(e) => {
                    self.name.clear();
                    self.name
                        .push_str(&String::from_utf8_lossy(e.local_name().as_ref()));
                    self.attributes.clear();
                    self.empty = false;
                    NodeKind::EndElement
                }
                Event::Text(e) => {
                    let decoded = e.decode().map_err(|err| {
                        AppError::ParseError(format!("Failed to decode XML text: {err}"))
                    })?;
                    self.text.clear();
                    self.text.push_str(&decoded);
                    NodeKind::Text
                }
                Event::CData(e) => {
                    let decoded = e.decode().map_err(|err| {
                        AppError::ParseError(format!("Failed to decode CDATA: {err}"))
                    })?;
                    self.text.clear();
                    self.text.push_str(&decoded);
                    NodeKind::Text
                }
                Event::GeneralRef(e) => {
                    let entity = e.decode().map_err(|err| {
                        AppError::ParseError(format!("Failed to decode entity reference: {err}"))
                    })?;
                    let resolved = resolve_reference(&entity)?;
                    self.text.clear();
                    self.text.push_str(&resolved);
                    NodeKind::Text
                }
                Event::Eof => {
                    self.kind = None;
                    return Ok(None);
                }
                _ => continue,
            };
            self.kind = Some(kind);
            return Ok(Some(kind));
        }
    }

    /// Local name of the current element or end tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_element(&self, name: &str) -> bool {
        self.kind == Some(NodeKind::Element) && self.name == name
    }

    pub fn is_end_element(&self, name: &str) -> bool {
        self.kind == Some(NodeKind::EndElement) && self.name == name
    }

    /// Unescaped value of an attribute of the current element, by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First attribute whose qualified name satisfies `predicate`.
    pub fn attribute_matching(&self, predicate: impl Fn(&str) -> bool) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| predicate(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty_element(&self) -> bool {
        self.kind == Some(NodeKind::Element) && self.empty
    }

    /// Advances until an element named `name` starts. Returns `false` at end of stream.
    pub fn find(&mut self, name: &str) -> AppResult<bool> {
        while self.advance()?.is_some() {
            if self.is_element(name) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Concatenated text content of the current element, leaving the cursor on its end tag.
    ///
    /// Returns `None` for self-closing elements, end tags and an element left
    /// unclosed at end of stream. On a text node returns that node's text.
    pub fn read_value(&mut self) -> AppResult<Option<String>> {
        match self.kind {
            Some(NodeKind::Text) => return Ok(Some(self.text.clone())),
            Some(NodeKind::Element) if !self.empty => {}
            _ => return Ok(None),
        }

        let mut depth = 0usize;
        let mut content = String::new();
        while let Some(kind) = self.advance()? {
            match kind {
                NodeKind::Text => content.push_str(&self.text),
                NodeKind::Element if !self.empty => depth += 1,
                NodeKind::Element => {}
                NodeKind::EndElement => {
                    if depth == 0 {
                        return Ok(Some(content));
                    }
                    depth -= 1;
                }
            }
        }
        Ok(None)
    }
}

fn fill_element(
    element: &BytesStart<'_>,
    name: &mut String,
    attributes: &mut Vec<(String, String)>,
) -> AppResult<()> {
    name.clear();
    name.push_str(&String::from_utf8_lossy(element.local_name().as_ref()));

    attributes.clear();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = std::str::from_utf8(&attr.value).map_err(|e| {
            AppError::ParseError(format!("Attribute {key} is not valid UTF-8: {e}"))
        })?;
        let value = unescape(raw)
            .map_err(|e| AppError::ParseError(format!("Failed to unescape attribute {key}: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(())
}

/// Resolves the body of an `&...;` reference: predefined entities and character references.
fn resolve_reference(entity: &str) -> AppResult<String> {
    if let Some(number) = entity.strip_prefix('#') {
        let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        return code
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| AppError::ParseError(format!("Invalid character reference &{entity};")));
    }

    resolve_predefined_entity(entity)
        .map(str::to_string)
        .ok_or_else(|| AppError::ParseError(format!("Unknown entity &{entity};")))
}
