//! XML namespace handling
//!
//! Prefix maps for schema documents and the normalization pass that rewrites
//! every XSD vocabulary name to the canonical `xs:` prefix, whether the source
//! used `xs:`, `xsd:`, some other bound prefix, or the default namespace.

use crate::documents::Element;
use crate::schema::builtins;
use indexmap::IndexMap;

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Canonical prefix for the schema vocabulary after normalization
pub const SCHEMA_PREFIX: &str = "xs";

/// Prefixes treated as the schema vocabulary even when left undeclared
const CONVENTIONAL_PREFIXES: [&str; 2] = ["xs", "xsd"];

/// Attributes whose values are QNames that may point into the XSD namespace
const QNAME_ATTRIBUTES: [&str; 3] = ["type", "base", "itemType"];

/// Split a QName into its optional prefix and local part
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Local part of a QName
pub fn local_part(name: &str) -> &str {
    split_qname(name).1
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI; the default namespace uses `""`
    prefixes: IndexMap<String, String>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Get the namespace for a prefix (`""` for the default namespace)
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.get_namespace("")
    }

    /// A copy of this context with `inner` declarations shadowing ours
    pub fn scoped(&self, inner: &IndexMap<String, String>) -> Self {
        let mut scoped = self.clone();
        for (prefix, uri) in inner {
            scoped.add_prefix(prefix.clone(), uri.clone());
        }
        scoped
    }

    /// Iterate over named prefixes (the default namespace is skipped)
    pub fn named_prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .filter(|(prefix, _)| !prefix.is_empty())
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    /// Prefixes bound to `namespace`
    pub fn prefixes_for<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.named_prefixes()
            .filter(move |(_, uri)| *uri == namespace)
            .map(|(prefix, _)| prefix)
    }

    /// Whether an element or QName prefix denotes the schema vocabulary
    fn is_schema_prefix(&self, prefix: Option<&str>) -> bool {
        match prefix {
            None => self.get_default_namespace() == Some(XSD_NAMESPACE),
            Some(p) => match self.get_namespace(p) {
                Some(uri) => uri == XSD_NAMESPACE,
                None => CONVENTIONAL_PREFIXES.contains(&p),
            },
        }
    }
}

/// Rewrite schema vocabulary names to the canonical `xs:` prefix, recursively.
///
/// Element names in the XSD namespace become `xs:local`. QName-valued
/// attributes (`type`, `base`, `itemType`) pointing into the XSD namespace are
/// rewritten the same way; an unprefixed value under a default XSD namespace is
/// only rewritten when it names a built-in type.
pub fn normalize_schema_prefixes(element: &mut Element, outer: &NamespaceContext) {
    let ctx = outer.scoped(&element.namespaces);

    let (prefix, local) = split_qname(&element.name);
    if ctx.is_schema_prefix(prefix) {
        element.name = format!("{}:{}", SCHEMA_PREFIX, local);
    }

    for attr in QNAME_ATTRIBUTES {
        if let Some(value) = element.attributes.get_mut(attr) {
            let (prefix, local) = split_qname(value);
            let rewrite = match prefix {
                Some(_) => ctx.is_schema_prefix(prefix),
                None => ctx.is_schema_prefix(None) && builtins::is_builtin(local),
            };
            if rewrite {
                *value = format!("{}:{}", SCHEMA_PREFIX, local);
            }
        }
    }

    for child in &mut element.children {
        normalize_schema_prefixes(child, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("tns:Order"), (Some("tns"), "Order"));
        assert_eq!(split_qname("Order"), (None, "Order"));
        assert_eq!(local_part("xs:string"), "string");
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", XSD_NAMESPACE);
        ctx.add_prefix("", "http://example.com");
        ctx.add_prefix("a", "urn:a");
        ctx.add_prefix("b", "urn:a");

        assert_eq!(ctx.get_namespace("xs"), Some(XSD_NAMESPACE));
        assert_eq!(ctx.get_default_namespace(), Some("http://example.com"));
        assert_eq!(ctx.prefixes_for("urn:a").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(ctx.named_prefixes().count(), 3);
    }

    #[test]
    fn test_normalize_alternate_prefix() {
        let xml = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
            <xsd:element name="A" type="xsd:string"/>
        </xsd:schema>"#;
        let mut root = Document::from_string(xml).unwrap().root.unwrap();
        normalize_schema_prefixes(&mut root, &NamespaceContext::new());

        assert_eq!(root.name, "xs:schema");
        assert_eq!(root.children[0].name, "xs:element");
        assert_eq!(root.children[0].get_attribute("type"), Some("xs:string"));
    }

    #[test]
    fn test_normalize_default_namespace() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema" xmlns:tns="urn:t">
            <element name="A" type="string"/>
            <element name="B" type="tns:BType"/>
            <complexType name="C"><complexContent><extension base="BType"/></complexContent></complexType>
        </schema>"#;
        let mut root = Document::from_string(xml).unwrap().root.unwrap();
        normalize_schema_prefixes(&mut root, &NamespaceContext::new());

        assert_eq!(root.name, "xs:schema");
        assert_eq!(root.children[0].get_attribute("type"), Some("xs:string"));
        assert_eq!(root.children[1].get_attribute("type"), Some("tns:BType"));
        let extension = &root.children[2].children[0].children[0];
        assert_eq!(extension.name, "xs:extension");
        assert_eq!(extension.get_attribute("base"), Some("BType"));
    }

    #[test]
    fn test_foreign_elements_untouched() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:doc="urn:doc">
            <xs:annotation><xs:appinfo><doc:note/></xs:appinfo></xs:annotation>
        </xs:schema>"#;
        let mut root = Document::from_string(xml).unwrap().root.unwrap();
        normalize_schema_prefixes(&mut root, &NamespaceContext::new());

        assert_eq!(root.children[0].children[0].children[0].name, "doc:note");
    }
}
