//! Shared XML reading and writing helpers
//!
//! Both XML codecs and the schema loader read markup through
//! [`read_elements`], which turns a document into a small owned element
//! tree. Declarations, comments, processing instructions and DOCTYPE are
//! dropped; whitespace-only text is ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One parsed element with its attributes in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct XmlElement {
    /// Qualified tag name as written (`xs:element`, `OBS.value`)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated, trimmed character data directly inside this element
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Tag name without any namespace prefix
    pub fn local_name(&self) -> &str {
        strip_prefix(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Text after the last `:` of a qualified name
pub(crate) fn strip_prefix(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Parse a document into its top-level elements
///
/// Returns an empty list for input with no elements at all. Any markup
/// error, including elements still open at end of input, is reported as a
/// message suitable for a parse error.
pub(crate) fn read_elements(text: &str) -> Result<Vec<XmlElement>, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut roots = Vec::new();
    let mut open: Vec<XmlElement> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{e} at byte {}", reader.buffer_position()))?;

        match event {
            Event::Start(start) => open.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                close_into(element, &mut open, &mut roots);
            }
            Event::End(end) => {
                let element = open.pop().ok_or_else(|| {
                    format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    )
                })?;
                close_into(element, &mut open, &mut roots);
            }
            Event::Text(content) => {
                let value = content.unescape().map_err(|e| e.to_string())?;
                push_text(&mut open, value.trim())?;
            }
            Event::CData(content) => {
                let value = String::from_utf8_lossy(&content.into_inner()).into_owned();
                push_text(&mut open, value.trim())?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(format!("unclosed element <{}>", unclosed.name));
    }

    Ok(roots)
}

/// Top-level message elements, with envelope tags replaced by their children
pub(crate) fn message_elements(
    text: &str,
    wrapper_tags: &[String],
) -> Result<Vec<XmlElement>, String> {
    let mut elements = Vec::new();
    for root in read_elements(text)? {
        if wrapper_tags.iter().any(|tag| *tag == root.name) {
            elements.extend(root.children);
        } else {
            elements.push(root);
        }
    }
    Ok(elements)
}

/// Whether an attribute is a namespace declaration
pub(crate) fn is_namespace_declaration(name: &str) -> bool {
    name.starts_with("xmlns")
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{name}>: {e}"))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value on <{name}>: {e}"))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        ..Default::default()
    })
}

fn close_into(element: XmlElement, open: &mut [XmlElement], roots: &mut Vec<XmlElement>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

fn push_text(open: &mut [XmlElement], value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    let current = open
        .last_mut()
        .ok_or_else(|| "text content outside of any element".to_string())?;
    if !current.text.is_empty() {
        current.text.push(' ');
    }
    current.text.push_str(value);
    Ok(())
}

/// Entity-escape `& < > " '`
pub(crate) fn escape(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}

/// `name="value"` pairs joined by spaces, skipping nameless entries
pub(crate) fn attribute_list<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| format!("{name}=\"{}\"", escape(value)))
        .collect::<Vec<_>>()
        .join(" ")
}
