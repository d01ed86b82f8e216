//! Error types for xsdmapper
//!
//! Three failure kinds are kept apart: reading/parsing the schema, strict-mode
//! validation of the JSON input, and structural mapping faults raised while
//! building the XML tree.

use std::fmt;
use thiserror::Error;

/// Result type alias using xsdmapper Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdmapper operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema source missing or undecodable
    #[error("schema read error: {0}")]
    SchemaRead(ParseError),

    /// Schema source does not contain a schema root
    #[error("schema syntax error: {0}")]
    SchemaSyntax(ParseError),

    /// JSON shape cannot be reconciled with the schema
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Strict-mode validation found one or more issues
    #[error("schema validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// XML serializer fault
    #[error("render error: {0}")]
    Render(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::SchemaSyntax`] with a bare message
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::SchemaSyntax(ParseError::new(message))
    }

    /// Validation issues, if this is a validation failure
    pub fn issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            Error::Validation(v) => Some(&v.issues),
            _ => None,
        }
    }
}

/// Schema read/parse error with optional location and cause
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Schema source the error refers to
    pub location: Option<String>,
    /// Underlying I/O or tokenizer fault
    pub cause: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            cause: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the underlying cause
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (in {})", loc)?;
        }

        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Structural mapping failure at a single JSON path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingError {
    /// JSON-path-like locator, e.g. `$.Order.Item[2]`
    pub path: String,
    /// Error message
    pub message: String,
}

impl MappingError {
    /// Create a new mapping error
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.path)
    }
}

impl std::error::Error for MappingError {}

/// One schema violation found by the validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON-path-like locator
    pub path: String,
    /// What is wrong
    pub message: String,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Aggregate of every issue found in one validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    /// All issues, in discovery order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Create a validation error from collected issues
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
