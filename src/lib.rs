//! # xsdmapper
//!
//! Schema-driven JSON to XML conversion. An XSD (or a WSDL embedding one)
//! decides element names, nesting, attributes, cardinality and element order;
//! the JSON input only supplies values.
//!
//! ## Features
//!
//! - Include and import resolution with cycle detection
//! - Any namespace prefix for the XSD vocabulary, including a default namespace
//! - Legacy single-byte schema encodings
//! - Complex type inheritance, simple content and `xs:any` wildcards
//! - Case-insensitive matching of JSON keys to declared names
//! - Optional strict validation reporting every issue at once
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsdmapper::{convert, ConvertOptions};
//!
//! let json = serde_json::json!({"Order": {"Id": "42"}});
//! let xml = convert(&json, "schemas/order.xsd", &ConvertOptions::new().with_pretty_print(true))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod names;
pub mod namespaces;

// Schema source loading
pub mod loaders;
pub mod documents;

// Schema model
pub mod schema;

// Conversion
pub mod converters;
pub mod validation;

// Re-exports for convenience
pub use converters::{convert, convert_with_model, ConvertOptions};
pub use error::{Error, MappingError, ParseError, Result, ValidationError, ValidationIssue};
pub use schema::{SchemaModel, SchemaParser, SchemaWalker};
pub use validation::SchemaValidator;

/// Version of the xsdmapper library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
