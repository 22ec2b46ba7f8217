//! Minimal owned XML tree built on `quick-xml`'s event reader.
//!
//! Jamf Pro's Classic API returns small, shallow XML documents, so the
//! whole body is materialized as an [`Element`] tree and navigated by tag
//! name. Absent elements surface as `Option::None` rather than errors;
//! only well-formedness problems are reported as [`XmlError`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Reasons a document failed to parse into a tree.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The tokenizer rejected the input (bad syntax, mismatched end tag,
    /// unknown entity, ...).
    #[error("XML syntax error at position {position}: {source}")]
    Syntax {
        /// Byte offset where the error was detected.
        position: u64,
        /// The quick-xml diagnostic.
        #[source]
        source: quick_xml::Error,
    },

    /// A character outside the XML 1.0 `Char` production, written raw or
    /// as a character reference.
    #[error("illegal character U+{code:04X} at position {position}")]
    InvalidChar {
        /// Byte offset of the event containing the character.
        position: u64,
        /// The offending code point.
        code: u32,
    },

    /// An element or attribute name that is not an XML `Name`.
    #[error("invalid name {name:?} at position {position}")]
    InvalidName {
        /// Byte offset of the event containing the name.
        position: u64,
        /// The rejected name.
        name: String,
    },

    /// The input ended while elements were still open.
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),

    /// The input contained no root element at all.
    #[error("document has no root element")]
    NoRoot,

    /// A second top-level element, or non-whitespace text outside the root.
    #[error("content outside the root element: {0}")]
    OutsideRoot(String),
}

/// A child of an [`Element`]: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Unescaped character data (text or CDATA).
    Text(String),
}

/// An XML element with its children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Element {
            name,
            children: Vec::new(),
        }
    }

    /// The element's tag name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct child elements whose tag equals `tag`, in document order.
    pub fn children_named<'a, 'b>(
        &'a self,
        tag: &'b str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'b> {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(el) if el.name == tag => Some(el),
            _ => None,
        })
    }

    /// Consumes the element, yielding its direct children tagged `tag`.
    pub fn into_children_named(self, tag: &str) -> impl Iterator<Item = Element> + '_ {
        self.children.into_iter().filter_map(move |node| match node {
            Node::Element(el) if el.name == tag => Some(el),
            _ => None,
        })
    }

    /// First direct child element with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.name == tag => Some(el),
            _ => None,
        })
    }

    /// Text of the first direct child with the given tag, if that child exists.
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.child(tag).map(Element::text)
    }

    /// Text that precedes the first child element.
    ///
    /// For leaf elements such as `<id>` or `<script_contents>` this is the
    /// element's entire content. Empty elements yield an empty string.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(_) => break,
            }
        }
        out
    }

    /// All text in the subtree concatenated in document order, ignoring
    /// element boundaries. No separators are inserted between siblings.
    pub fn flattened_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Parses a complete document and returns its root element.
///
/// Declarations, comments, processing instructions and the doctype are
/// skipped. Whitespace outside the root is allowed; anything else is not.
/// Names, attributes and character data are checked against XML 1.0, so
/// control characters such as ESC (raw or as `&#27;`) are rejected.
pub fn parse(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|source| XmlError::Syntax {
            position: reader.error_position() as u64,
            source,
        })?;

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = checked_start(&e, reader.buffer_position() as u64)?;
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::OutsideRoot(format!("<{name}>")));
                }
                stack.push(Element::new(name));
            }
            Event::Empty(e) => {
                let name = checked_start(&e, reader.buffer_position() as u64)?;
                attach(&mut stack, &mut root, Element::new(name))?;
            }
            Event::End(_) => {
                // quick-xml already verified the end name matches the open tag.
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut root, done)?;
                }
            }
            Event::Text(e) => {
                let position = reader.buffer_position() as u64;
                let text = e
                    .unescape()
                    .map_err(|source| XmlError::Syntax { position, source })?;
                check_chars(&text, position)?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                check_chars(&text, reader.buffer_position() as u64)?;
                push_text(&mut stack, &text)?;
            }
            Event::Comment(e) => {
                check_chars(&String::from_utf8_lossy(&e), reader.buffer_position() as u64)?;
            }
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

/// Validates a start tag's name and attributes and returns the name.
///
/// Attributes are not kept in the tree, but malformed ones (duplicated,
/// unquoted, bad references or characters) still reject the document.
fn checked_start(e: &BytesStart<'_>, position: u64) -> Result<String, XmlError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    check_name(&name, position)?;

    let mut attributes = e.attributes();
    attributes.with_checks(true);
    for attr in attributes {
        let attr = attr.map_err(|err| XmlError::Syntax {
            position,
            source: err.into(),
        })?;
        check_name(&String::from_utf8_lossy(attr.key.as_ref()), position)?;
        let value = attr
            .unescape_value()
            .map_err(|source| XmlError::Syntax { position, source })?;
        check_chars(&value, position)?;
    }
    Ok(name)
}

fn check_chars(text: &str, position: u64) -> Result<(), XmlError> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(XmlError::InvalidChar {
            position,
            code: c as u32,
        }),
        None => Ok(()),
    }
}

fn check_name(name: &str, position: u64) -> Result<(), XmlError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(XmlError::InvalidName {
            position,
            name: name.to_string(),
        })
    }
}

/// XML 1.0 `Char`. Surrogates cannot occur in a Rust `char`.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | ' '..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}'
        )
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => {
            return Err(XmlError::OutsideRoot(format!("<{}>", element.name)));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            if let Some(Node::Text(prev)) = parent.children.last_mut() {
                prev.push_str(text);
            } else {
                parent.children.push(Node::Text(text.to_string()));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::OutsideRoot(text.trim().to_string())),
    }
}
