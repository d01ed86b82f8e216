//! Generic XML node tree
//!
//! Schema sources are tokenized into this tree, and the builder emits its output
//! as the same tree before rendering it to text. Names are kept exactly as
//! written (`prefix:local`), namespace declarations are kept apart from plain
//! attributes, and repeatable children are always a `Vec` (possibly empty).

use crate::error::{Error, ParseError, Result};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// XML element node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `xs:element`
    pub name: String,
    /// Namespace declarations on this element; the default namespace uses `""`
    pub namespaces: IndexMap<String, String>,
    /// Plain attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Local part of the name
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Get an attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Declare a namespace prefix (`""` for the default namespace)
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Append a new child and return it for further filling
    pub fn create_child(&mut self, name: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Child elements with the given qualified name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child element with the given qualified name
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child element with the given local name, whatever its prefix
    pub fn find_child_local(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == local_name)
    }

    /// Whether the element has neither text nor children
    pub fn is_hollow(&self) -> bool {
        self.children.is_empty() && self.text.is_none()
    }

    /// Render the element as an XML string
    pub fn render(&self, options: &RenderOptions) -> Result<String> {
        let mut writer = match options.indent {
            Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
            None => Writer::new(Vec::new()),
        };

        if let Some(ref encoding) = options.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some(encoding.as_str()), None)))
                .map_err(render_error)?;
        }

        self.write_to(&mut writer)?;

        String::from_utf8(writer.into_inner()).map_err(render_error)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (prefix, uri) in &self.namespaces {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            start.push_attribute((key.as_str(), uri.as_str()));
        }
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.is_hollow() {
            return writer.write_event(Event::Empty(start)).map_err(render_error);
        }

        writer.write_event(Event::Start(start)).map_err(render_error)?;
        if let Some(ref text) = self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(render_error)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(render_error)
    }
}

fn render_error(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

/// Flags accepted by [`Element::render`]
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Indentation width; `None` renders on a single line
    pub indent: Option<usize>,
    /// Encoding label for the XML declaration; `None` suppresses it
    pub declaration: Option<String>,
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from UTF-8 bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::default();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    element_stack.push(Self::parse_element(&e)?);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        match element_stack.last_mut() {
                            Some(parent) => parent.add_child(current),
                            None => doc.root = Some(current),
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::parse_element(&e)?;
                    match element_stack.last_mut() {
                        Some(parent) => parent.add_child(element),
                        None => doc.root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e.unescape().map_err(|e| {
                            Error::SchemaSyntax(ParseError::new("Failed to unescape text").with_cause(e))
                        })?;
                        append_text(current, &text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        append_text(current, &text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::SchemaSyntax(
                        ParseError::new(format!(
                            "Malformed XML at position {}",
                            reader.buffer_position()
                        ))
                        .with_cause(e),
                    ))
                }
                _ => {} // comments, processing instructions, doctype
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::syntax("Unexpected end of document: unclosed elements"));
        }

        Ok(doc)
    }

    fn parse_element(start: &BytesStart) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::SchemaSyntax(ParseError::new("Invalid element name").with_cause(e)))?
            .to_string();

        let mut element = Element::new(name);

        for attr_result in start.attributes() {
            let attr = attr_result.map_err(|e| {
                Error::SchemaSyntax(ParseError::new("Failed to parse attribute").with_cause(e))
            })?;

            let key = std::str::from_utf8(attr.key.as_ref()).map_err(|e| {
                Error::SchemaSyntax(ParseError::new("Invalid attribute name").with_cause(e))
            })?;

            let value = attr
                .unescape_value()
                .map_err(|e| {
                    Error::SchemaSyntax(ParseError::new("Failed to unescape attribute value").with_cause(e))
                })?
                .into_owned();

            if key == "xmlns" {
                element.declare_namespace("", value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                element.declare_namespace(prefix, value);
            } else {
                element.set_attribute(key, value);
            }
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

fn append_text(element: &mut Element, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    match element.text {
        Some(ref mut existing) => existing.push_str(text),
        None => element.text = Some(text.to_string()),
    }
}
