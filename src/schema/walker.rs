//! Schema Walker
//!
//! Read-only queries over a [`SchemaModel`]. The builder and the validator ask
//! every structural question through these methods, so both see the same
//! inheritance-resolved attributes, children and wildcard status.

use std::collections::HashSet;

use super::builtins;
use super::model::{AttributeDef, ComplexTypeDef, Compositor, ElementDef, SchemaModel};
use crate::namespaces::local_part;

/// Query layer over a borrowed schema model
#[derive(Debug, Clone, Copy)]
pub struct SchemaWalker<'a> {
    model: &'a SchemaModel,
}

impl<'a> SchemaWalker<'a> {
    /// Wrap a model
    pub fn new(model: &'a SchemaModel) -> Self {
        Self { model }
    }

    /// The wrapped model
    pub fn model(&self) -> &'a SchemaModel {
        self.model
    }

    /// Top-level element by exact name
    pub fn root_element(&self, name: &str) -> Option<&'a ElementDef> {
        self.model.elements.get(name)
    }

    /// Named complex type by reference; `tns:Order` falls back to `Order`
    pub fn lookup_type(&self, type_name: &str) -> Option<&'a ComplexTypeDef> {
        self.model
            .complex_types
            .get(type_name)
            .or_else(|| self.model.complex_types.get(local_part(type_name)))
    }

    /// The effective complex type of `element`, or `None` for a text leaf.
    ///
    /// Inline type first, then the named type, then (for `ref` particles) the
    /// type of the referenced top-level element.
    pub fn resolve_complex_type<'b>(&self, element: &'b ElementDef) -> Option<&'b ComplexTypeDef>
    where
        'a: 'b,
    {
        if let Some(inline) = element.inline_complex_type.as_deref() {
            return Some(inline);
        }
        if let Some(type_name) = element.type_name.as_deref() {
            if self.is_simple_type(Some(type_name)) {
                return None;
            }
            return self.lookup_type(type_name);
        }
        element
            .reference
            .as_deref()
            .and_then(|r| self.referenced_element(r))
            .and_then(|target| {
                if target.reference.is_some() {
                    // chained refs are not followed
                    return target.inline_complex_type.as_deref().or_else(|| {
                        target.type_name.as_deref().and_then(|t| self.lookup_type(t))
                    });
                }
                self.resolve_complex_type(target)
            })
    }

    fn referenced_element(&self, reference: &str) -> Option<&'a ElementDef> {
        self.model
            .elements
            .get(reference)
            .or_else(|| self.model.elements.get(local_part(reference)))
    }

    /// Whether a type reference denotes text content.
    ///
    /// True for an absent name, any built-in datatype, any registered simple
    /// type, and any name that is not a registered complex type.
    pub fn is_simple_type(&self, type_name: Option<&str>) -> bool {
        let Some(type_name) = type_name else {
            return true;
        };
        if builtins::is_builtin_ref(type_name) {
            return true;
        }
        if self.model.simple_types.contains_key(type_name) {
            return true;
        }
        if self.model.complex_types.contains_key(type_name) {
            return false;
        }
        let local = local_part(type_name);
        self.model.simple_types.contains_key(local) || !self.model.complex_types.contains_key(local)
    }

    /// Inheritance chain of `complex_type`, base first, ending with the type itself
    pub fn ancestry<'b>(&self, complex_type: &'b ComplexTypeDef) -> Vec<&'b ComplexTypeDef>
    where
        'a: 'b,
    {
        let mut chain = vec![complex_type];
        let mut visited: HashSet<&str> = HashSet::new();
        if !complex_type.name.is_empty() {
            visited.insert(complex_type.name.as_str());
        }

        let mut current = complex_type;
        while let Some(base_name) = current.extends.as_deref() {
            let Some(base) = self.lookup_type(base_name) else {
                break;
            };
            if !visited.insert(base.name.as_str()) {
                break;
            }
            chain.push(base);
            current = base;
        }

        chain.reverse();
        chain
    }

    /// Attributes of `element`, base type's first
    pub fn resolve_attributes<'b>(&self, element: &'b ElementDef) -> Vec<&'b AttributeDef>
    where
        'a: 'b,
    {
        match self.resolve_complex_type(element) {
            Some(complex_type) => self
                .ancestry(complex_type)
                .into_iter()
                .flat_map(|t| t.attributes.iter())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Child elements of `element`, base type's first
    pub fn resolve_children<'b>(&self, element: &'b ElementDef) -> Vec<&'b ElementDef>
    where
        'a: 'b,
    {
        match self.resolve_complex_type(element) {
            Some(complex_type) => self
                .ancestry(complex_type)
                .into_iter()
                .flat_map(|t| t.elements.iter())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Alternative groups of `element`: one entry per type in the chain whose
    /// content model is a choice
    pub fn choice_groups<'b>(&self, element: &'b ElementDef) -> Vec<&'b [ElementDef]>
    where
        'a: 'b,
    {
        match self.resolve_complex_type(element) {
            Some(complex_type) => self
                .ancestry(complex_type)
                .into_iter()
                .filter(|t| t.compositor == Compositor::Choice && !t.elements.is_empty())
                .map(|t| t.elements.as_slice())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether the element's type or any ancestor declares a wildcard
    pub fn has_wildcard(&self, element: &ElementDef) -> bool {
        match self.resolve_complex_type(element) {
            Some(complex_type) => self.ancestry(complex_type).iter().any(|t| t.has_wildcard),
            None => false,
        }
    }
}
