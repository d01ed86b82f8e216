//! Conversion options

use serde::Deserialize;

use crate::documents::RenderOptions;
use crate::error::Result;

/// Configuration for a JSON to XML conversion
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Whether to indent the output
    pretty_print: bool,
    /// Whether to emit the XML declaration
    xml_declaration: bool,
    /// Encoding label written in the XML declaration
    encoding: String,
    /// Prefix marking attribute keys in the JSON input
    attribute_prefix: String,
    /// Key holding text content in the JSON input
    text_node_key: String,
    /// Whether to validate the input against the schema before building
    strict: bool,
    /// Explicit root element name
    root_element: Option<String>,
    /// Indentation width used when pretty printing
    indent: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pretty_print: false,
            xml_declaration: true,
            encoding: "UTF-8".to_string(),
            attribute_prefix: "@".to_string(),
            text_node_key: "#text".to_string(),
            strict: false,
            root_element: None,
            indent: 2,
        }
    }
}

impl ConvertOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON document; missing keys keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check if output is indented
    pub fn pretty_print(&self) -> bool {
        self.pretty_print
    }

    /// Check if the XML declaration is emitted
    pub fn xml_declaration(&self) -> bool {
        self.xml_declaration
    }

    /// Get the declared encoding
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Get the attribute prefix
    pub fn attribute_prefix(&self) -> &str {
        &self.attribute_prefix
    }

    /// Get the text node key
    pub fn text_node_key(&self) -> &str {
        &self.text_node_key
    }

    /// Check if strict validation is requested
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Get the explicit root element, if any
    pub fn root_element(&self) -> Option<&str> {
        self.root_element.as_deref()
    }

    /// Get the indentation width
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Set pretty printing
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set whether the XML declaration is emitted
    pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = declaration;
        self
    }

    /// Set the declared encoding
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the attribute prefix
    pub fn with_attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_prefix = prefix.into();
        self
    }

    /// Set the text node key
    pub fn with_text_node_key(mut self, key: impl Into<String>) -> Self {
        self.text_node_key = key.into();
        self
    }

    /// Set strict validation
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the explicit root element
    pub fn with_root_element(mut self, root: Option<String>) -> Self {
        self.root_element = root;
        self
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Serializer flags derived from these options
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            indent: self.pretty_print.then_some(self.indent),
            declaration: self.xml_declaration.then(|| self.encoding.clone()),
        }
    }
}
