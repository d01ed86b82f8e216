//! Schema source loading
//!
//! Reads schema files from disk and normalizes their character encoding so the
//! tokenizer always sees UTF-8 text with a matching XML declaration.

use crate::error::{Error, ParseError, Result};
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Matches the encoding pseudo-attribute of a leading XML declaration
static ENCODING_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*<\?xml[^>]*?\bencoding\s*=\s*)(["'])([A-Za-z][A-Za-z0-9._-]*)(["'])"#)
        .expect("encoding declaration regex is valid")
});

/// Only this many leading bytes are inspected for the declaration
const HEADER_SCAN: usize = 256;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Resource loader for schema sources
#[derive(Debug, Default)]
pub struct Loader;

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self
    }

    /// Load a schema file and return its text as normalized UTF-8
    pub fn load(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| {
            Error::SchemaRead(
                ParseError::new("Failed to read schema")
                    .with_location(path.display().to_string())
                    .with_cause(e),
            )
        })?;

        decode_schema_bytes(&bytes).map_err(|e| match e {
            Error::SchemaRead(pe) => Error::SchemaRead(pe.with_location(path.display().to_string())),
            other => other,
        })
    }
}

/// Decode raw schema bytes according to their declared encoding.
///
/// The returned text always declares `UTF-8` if it had a declaration at all.
pub fn decode_schema_bytes(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let declared = declared_encoding(bytes);
    let encoding = declared
        .as_deref()
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8);
    let invalid = || {
        ParseError::new(format!(
            "Schema is not valid {}",
            declared.as_deref().unwrap_or("UTF-8")
        ))
    };

    let text = if encoding == UTF_8 {
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::SchemaRead(invalid().with_cause(e)))?
    } else {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(Error::SchemaRead(invalid()));
        }
        text.into_owned()
    };

    Ok(normalize_declaration(&text).into_owned())
}

/// Read the encoding label from the XML declaration, if any
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(HEADER_SCAN)];
    let head = String::from_utf8_lossy(head);
    ENCODING_DECL
        .captures(&head)
        .map(|caps| caps[3].to_string())
}

/// Rewrite the declared encoding to UTF-8
pub fn normalize_declaration(text: &str) -> Cow<'_, str> {
    ENCODING_DECL.replace(text, "${1}${2}UTF-8${4}")
}
