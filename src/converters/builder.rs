//! Schema-directed XML builder
//!
//! Walks the JSON input alongside the schema, emitting only what the schema
//! declares. Element names and their order come from the schema; JSON keys are
//! matched case-insensitively and their own order is irrelevant, except inside
//! wildcard content where it is preserved.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::config::ConvertOptions;
use super::freeform;
use super::values::{lookup, lookup_present, names_match, scalar_text};
use crate::documents::Element;
use crate::error::{MappingError, Result};
use crate::schema::{ElementDef, SchemaWalker};

/// Builds an element tree from JSON using a schema walker
#[derive(Debug, Clone, Copy)]
pub struct XmlBuilder<'a> {
    walker: SchemaWalker<'a>,
    options: &'a ConvertOptions,
}

impl<'a> XmlBuilder<'a> {
    /// Create a builder over `walker` with the given options
    pub fn new(walker: SchemaWalker<'a>, options: &'a ConvertOptions) -> Self {
        Self { walker, options }
    }

    /// Build the tree for top-level element `root_name` from `json`
    pub fn build(&self, json: &JsonValue, root_name: &str) -> Result<Element> {
        let root_def = self.walker.root_element(root_name).ok_or_else(|| {
            MappingError::new("$", format!("root element '{}' is not declared in the schema", root_name))
        })?;

        if json.is_array() {
            return Err(MappingError::new("$", "the root element cannot be an array").into());
        }

        let mut root = self.build_instance(root_def, json, "$")?;
        if let Some(ns) = self.walker.model().target_namespace.as_deref() {
            if !ns.is_empty() {
                root.declare_namespace("", ns);
            }
        }
        Ok(root)
    }

    /// Append zero or more occurrences of `def` to `parent`
    fn append_element(&self, parent: &mut Element, def: &ElementDef, value: &JsonValue, path: &str) -> Result<()> {
        match value {
            JsonValue::Null => Ok(()),
            JsonValue::Array(items) => {
                if !def.is_array() {
                    return Err(MappingError::new(
                        path,
                        format!("'{}' allows a single occurrence but an array was given", def.name),
                    )
                    .into());
                }
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    match item {
                        JsonValue::Null => continue,
                        JsonValue::Array(_) => {
                            return Err(MappingError::new(
                                item_path,
                                format!("nested arrays cannot be mapped to repeated '{}'", def.name),
                            )
                            .into())
                        }
                        _ => parent.add_child(self.build_instance(def, item, &item_path)?),
                    }
                }
                Ok(())
            }
            _ => {
                parent.add_child(self.build_instance(def, value, path)?);
                Ok(())
            }
        }
    }

    /// Build one occurrence of `def`
    fn build_instance(&self, def: &ElementDef, value: &JsonValue, path: &str) -> Result<Element> {
        let mut element = Element::new(def.name.as_str());
        let text_key = self.options.text_node_key();

        let Some(complex_type) = self.walker.resolve_complex_type(def) else {
            if !value.is_null() {
                element.set_text(scalar_text(value, text_key));
            }
            return Ok(element);
        };

        let JsonValue::Object(object) = value else {
            self.write_attributes(&mut element, def, &Map::new());
            if !value.is_null() {
                element.set_text(scalar_text(value, text_key));
            }
            return Ok(element);
        };

        self.write_attributes(&mut element, def, object);

        if complex_type.has_text_content {
            if let Some((_, text)) = lookup(object, text_key) {
                if !text.is_null() {
                    element.set_text(scalar_text(text, text_key));
                }
                return Ok(element);
            }
        }

        let children = self.walker.resolve_children(def);
        for child in &children {
            if let Some((_, child_value)) = lookup(object, &child.name) {
                let child_path = format!("{}.{}", path, child.name);
                self.append_element(&mut element, child, child_value, &child_path)?;
            }
        }

        if self.walker.has_wildcard(def) {
            self.write_wildcard_content(&mut element, object, &children, path)?;
        }

        Ok(element)
    }

    /// Declared attributes in declaration order; absent ones fall back to their default
    fn write_attributes(&self, element: &mut Element, def: &ElementDef, object: &Map<String, JsonValue>) {
        let prefix = self.options.attribute_prefix();
        for attr in self.walker.resolve_attributes(def) {
            let key = format!("{}{}", prefix, attr.name);
            match lookup_present(object, &key) {
                Some((_, value)) => {
                    element.set_attribute(attr.name.as_str(), scalar_text(value, self.options.text_node_key()))
                }
                None => {
                    if let Some(ref default) = attr.default {
                        element.set_attribute(attr.name.as_str(), default.as_str());
                    }
                }
            }
        }
    }

    /// Keys naming no declared child in any casing, in JSON order
    fn write_wildcard_content(
        &self,
        element: &mut Element,
        object: &Map<String, JsonValue>,
        children: &[&ElementDef],
        path: &str,
    ) -> Result<()> {
        let prefix = self.options.attribute_prefix();
        for (key, value) in object {
            if key == self.options.text_node_key()
                || (!prefix.is_empty() && key.starts_with(prefix))
                || children.iter().any(|child| names_match(&child.name, key))
            {
                continue;
            }
            debug!(element = %element.name, key = %key, "writing wildcard content");
            let key_path = format!("{}.{}", path, key);
            freeform::append_wildcard(element, key, value, &key_path, self.options)?;
        }
        Ok(())
    }
}
