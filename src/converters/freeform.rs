//! Free-form content
//!
//! JSON keys that land in wildcard (`xs:any`) content have no declaration to
//! follow, so their structure is taken from the JSON value itself.

use serde_json::Value as JsonValue;

use super::config::ConvertOptions;
use super::values::scalar_text;
use crate::documents::Element;
use crate::error::{MappingError, Result};
use crate::names::is_valid_qname;

/// Append `key: value` found directly in wildcard content.
///
/// A top-level array becomes a single element holding the items' text joined
/// with commas; `null` produces nothing.
pub fn append_wildcard(
    parent: &mut Element,
    key: &str,
    value: &JsonValue,
    path: &str,
    options: &ConvertOptions,
) -> Result<()> {
    check_name(key, path)?;
    match value {
        JsonValue::Null => {}
        JsonValue::Array(items) => {
            let text = items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| scalar_text(item, options.text_node_key()))
                .collect::<Vec<_>>()
                .join(",");
            parent.create_child(key).set_text(text);
        }
        _ => parent.add_child(free_element(key, value, path, options)?),
    }
    Ok(())
}

/// Build an element purely from the shape of a JSON value
fn free_element(name: &str, value: &JsonValue, path: &str, options: &ConvertOptions) -> Result<Element> {
    let mut element = Element::new(name);
    let text_key = options.text_node_key();
    let prefix = options.attribute_prefix();

    let JsonValue::Object(object) = value else {
        if !value.is_null() {
            element.set_text(scalar_text(value, text_key));
        }
        return Ok(element);
    };

    for (key, child) in object {
        if child.is_null() {
            continue;
        }
        let child_path = format!("{}.{}", path, key);

        if key == text_key {
            element.set_text(scalar_text(child, text_key));
        } else if let Some(attr) = key.strip_prefix(prefix).filter(|_| !prefix.is_empty()) {
            check_name(attr, &child_path)?;
            element.set_attribute(attr, scalar_text(child, text_key));
        } else if let JsonValue::Array(items) = child {
            check_name(key, &child_path)?;
            for (i, item) in items.iter().enumerate() {
                if !item.is_null() {
                    let item_path = format!("{}[{}]", child_path, i);
                    element.add_child(free_element(key, item, &item_path, options)?);
                }
            }
        } else {
            check_name(key, &child_path)?;
            element.add_child(free_element(key, child, &child_path, options)?);
        }
    }

    Ok(element)
}

fn check_name(name: &str, path: &str) -> Result<()> {
    if is_valid_qname(name) {
        Ok(())
    } else {
        Err(MappingError::new(path, format!("'{}' is not a valid XML name", name)).into())
    }
}
