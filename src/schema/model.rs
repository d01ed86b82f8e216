//! Schema Model
//!
//! The resolved, file-independent representation of one logical schema after
//! all includes and imports have been merged. Built once by the parser and
//! read-only afterwards.

use indexmap::IndexMap;
use serde::Serialize;

/// Upper occurrence bound of an element particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MaxOccurs {
    /// A finite bound
    Bounded(u32),
    /// `maxOccurs="unbounded"`
    Unbounded,
}

impl MaxOccurs {
    /// Parse a `maxOccurs` attribute value; anything unreadable counts as 1
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("unbounded") => MaxOccurs::Unbounded,
            Some(s) => MaxOccurs::Bounded(s.parse().unwrap_or(1)),
            None => MaxOccurs::Bounded(1),
        }
    }

    /// Whether more than one occurrence is allowed
    pub fn is_multiple(&self) -> bool {
        match self {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Bounded(n) => *n > 1,
        }
    }

    /// Whether `count` occurrences exceed the bound
    pub fn is_exceeded(&self, count: usize) -> bool {
        match self {
            MaxOccurs::Unbounded => false,
            MaxOccurs::Bounded(n) => count > *n as usize,
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

/// How the children of a complex type combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Compositor {
    /// Ordered, each required per its occurrence bounds
    #[default]
    Sequence,
    /// Any order, each at most once
    All,
    /// Exactly one branch
    Choice,
}

impl Compositor {
    /// Map a compositor element's local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "sequence" => Some(Compositor::Sequence),
            "all" => Some(Compositor::All),
            "choice" => Some(Compositor::Choice),
            _ => None,
        }
    }
}

/// Attribute use constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeUse {
    /// Attribute is optional (default)
    #[default]
    Optional,
    /// Attribute is required
    Required,
    /// Attribute is prohibited
    Prohibited,
}

impl AttributeUse {
    /// Parse a `use` attribute value; unknown values are treated as optional
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("required") => AttributeUse::Required,
            Some("prohibited") => AttributeUse::Prohibited,
            _ => AttributeUse::Optional,
        }
    }

    /// Get the use as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeUse::Optional => "optional",
            AttributeUse::Required => "required",
            AttributeUse::Prohibited => "prohibited",
        }
    }
}

/// Element declaration
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDef {
    /// Element name as declared (this casing is always the emitted one)
    pub name: String,
    /// Reference to a named type
    pub type_name: Option<String>,
    /// Target of `ref="..."`, resolved through the top-level elements
    pub reference: Option<String>,
    /// Structural definition declared in place
    pub inline_complex_type: Option<Box<ComplexTypeDef>>,
    /// Minimum occurrences
    pub min_occurs: u32,
    /// Maximum occurrences
    pub max_occurs: MaxOccurs,
    /// Children of the inline type; named-type children are reached via the walker
    pub children: Vec<ElementDef>,
}

impl ElementDef {
    /// Create a required, single-occurrence element with no type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_occurs: 1,
            ..Default::default()
        }
    }

    /// Set the named type
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set occurrence bounds
    pub fn with_occurs(mut self, min: u32, max: MaxOccurs) -> Self {
        self.min_occurs = min;
        self.max_occurs = max;
        self
    }

    /// Set an inline complex type; its elements become this element's children
    pub fn with_inline_type(mut self, complex_type: ComplexTypeDef) -> Self {
        self.children = complex_type.elements.clone();
        self.inline_complex_type = Some(Box::new(complex_type));
        self
    }

    /// True iff more than one occurrence is allowed
    pub fn is_array(&self) -> bool {
        self.max_occurs.is_multiple()
    }

    /// True iff at least one occurrence is required
    pub fn is_required(&self) -> bool {
        self.min_occurs > 0
    }
}

/// Named or inline structural type
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexTypeDef {
    /// Type name (empty for inline types)
    pub name: String,
    /// How the declared elements combine
    pub compositor: Compositor,
    /// Elements declared directly on this type
    pub elements: Vec<ElementDef>,
    /// Attributes declared directly on this type
    pub attributes: Vec<AttributeDef>,
    /// True for `xs:simpleContent`
    pub has_text_content: bool,
    /// Base type of a `complexContent` extension
    pub extends: Option<String>,
    /// True iff the compositor directly contains `xs:any`
    pub has_wildcard: bool,
}

impl ComplexTypeDef {
    /// Create an empty sequence type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Attribute declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    /// Attribute name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Use constraint
    #[serde(rename = "use")]
    pub use_: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
}

impl AttributeDef {
    /// Create an optional attribute
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the attribute must be present
    pub fn is_required(&self) -> bool {
        self.use_ == AttributeUse::Required
    }
}

/// Named scalar type (base only; facets are ignored)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleTypeDef {
    /// Type name
    pub name: String,
    /// Restriction/list/union base, when one is declared
    pub base: Option<String>,
}

/// The resolved schema: every include and import merged in
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    /// Element used as document root when none is specified; empty for type libraries
    pub root_element: String,
    /// True when `root_element` was picked from merged elements rather than declared locally
    pub root_inferred: bool,
    /// Top-level elements
    pub elements: IndexMap<String, ElementDef>,
    /// Named complex types, also keyed `prefix:name` for imported namespaces
    pub complex_types: IndexMap<String, ComplexTypeDef>,
    /// Named simple types, also keyed `prefix:name` for imported namespaces
    pub simple_types: IndexMap<String, SimpleTypeDef>,
    /// Target namespace, emitted as the default namespace of the XML root
    pub target_namespace: Option<String>,
}

impl SchemaModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an included schema into this one; existing keys are never replaced
    pub fn merge_included(&mut self, other: &SchemaModel) {
        insert_missing(&mut self.elements, other.elements.iter().map(|(k, v)| (k.clone(), v.clone())));
        insert_missing(
            &mut self.complex_types,
            other.complex_types.iter().map(|(k, v)| (k.clone(), v.clone())),
        );
        insert_missing(
            &mut self.simple_types,
            other.simple_types.iter().map(|(k, v)| (k.clone(), v.clone())),
        );
    }

    /// Fold an imported schema into this one.
    ///
    /// Types are registered under their bare name and again under
    /// `prefix:name` for each of `prefixes`. Elements are merged unprefixed.
    /// Existing keys are never replaced.
    pub fn merge_imported(&mut self, other: &SchemaModel, prefixes: &[String]) {
        insert_missing(&mut self.elements, other.elements.iter().map(|(k, v)| (k.clone(), v.clone())));

        for (name, def) in &other.complex_types {
            insert_missing(&mut self.complex_types, [(name.clone(), def.clone())]);
            for prefix in prefixes {
                insert_missing(&mut self.complex_types, [(format!("{}:{}", prefix, name), def.clone())]);
            }
        }

        for (name, def) in &other.simple_types {
            insert_missing(&mut self.simple_types, [(name.clone(), def.clone())]);
            for prefix in prefixes {
                insert_missing(&mut self.simple_types, [(format!("{}:{}", prefix, name), def.clone())]);
            }
        }
    }
}

/// First-writer-wins insertion, in iteration order
pub fn insert_missing<V>(target: &mut IndexMap<String, V>, entries: impl IntoIterator<Item = (String, V)>) {
    for (key, value) in entries {
        target.entry(key).or_insert(value);
    }
}
