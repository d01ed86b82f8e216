//! JSON to XML conversion
//!
//! The entry points resolve the schema, pick the root element, optionally run
//! strict validation and then build and render the XML tree.

mod builder;
mod config;
mod freeform;
pub mod values;

pub use builder::XmlBuilder;
pub use config::ConvertOptions;

use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{MappingError, Result};
use crate::schema::{SchemaModel, SchemaParser, SchemaWalker};
use crate::validation::SchemaValidator;

/// Convert `json` to an XML string directed by the schema at `schema_path`
pub fn convert(json: &JsonValue, schema_path: impl AsRef<Path>, options: &ConvertOptions) -> Result<String> {
    let model = SchemaParser::new().parse(schema_path, None)?;
    convert_with_model(json, &model, options)
}

/// Convert `json` using an already resolved schema model
pub fn convert_with_model(json: &JsonValue, model: &SchemaModel, options: &ConvertOptions) -> Result<String> {
    let walker = SchemaWalker::new(model);
    let (root_name, content) = select_root(json, model, options)?;
    debug!(root = %root_name, strict = options.strict(), "converting");

    if options.strict() {
        SchemaValidator::new(walker, options.attribute_prefix(), options.text_node_key())
            .validate(content, &root_name)?;
    }

    let root = XmlBuilder::new(walker, options).build(content, &root_name)?;
    root.render(&options.render_options())
}

/// Decide the root element name and the JSON value holding its content.
///
/// An explicit root wins. Otherwise a single-key object whose key names a
/// top-level element is treated as a wrapper; failing that the schema's own
/// root is used.
pub fn select_root<'v>(
    json: &'v JsonValue,
    model: &SchemaModel,
    options: &ConvertOptions,
) -> Result<(String, &'v JsonValue)> {
    let wrapper = single_entry(json);

    if let Some(root) = options.root_element() {
        let content = match wrapper {
            Some((key, inner)) if values::names_match(key, root) => inner,
            _ => json,
        };
        return Ok((root.to_string(), content));
    }

    if let Some((key, inner)) = wrapper {
        let declared = model
            .elements
            .keys()
            .find(|name| name.as_str() == key)
            .or_else(|| model.elements.keys().find(|name| values::names_match(name, key)));
        if let Some(name) = declared {
            return Ok((name.clone(), inner));
        }
    }

    let root = model.root_element.as_str();
    if root.is_empty() {
        return Err(MappingError::new("$", "the schema declares no root element; set root_element").into());
    }
    if model.root_inferred {
        warn!(root = %root, "using a root element inferred from merged schemas; set root_element to override");
    }
    Ok((root.to_string(), json))
}

fn single_entry(json: &JsonValue) -> Option<(&str, &JsonValue)> {
    match json {
        JsonValue::Object(object) if object.len() == 1 => object.iter().next().map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}
