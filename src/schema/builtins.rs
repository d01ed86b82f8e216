//! XSD built-in types
//!
//! Only the names matter here: any element typed with one of these is a text
//! leaf. Facets are never evaluated.

use crate::namespaces::{split_qname, SCHEMA_PREFIX};

/// Local names of the built-in XSD datatypes (1.0 plus the 1.1 additions)
pub const BUILTIN_TYPES: &[&str] = &[
    // Ur-types
    "anyType",
    "anySimpleType",
    "anyAtomicType",
    // String types
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "boolean",
    // Numeric types
    "decimal",
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "nonPositiveInteger",
    "negativeInteger",
    "float",
    "double",
    // Date/time types
    "duration",
    "dateTime",
    "dateTimeStamp",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    // Binary and misc
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
];

/// Whether `local_name` is a built-in XSD datatype
pub fn is_builtin(local_name: &str) -> bool {
    BUILTIN_TYPES.contains(&local_name)
}

/// Whether a normalized type reference points at a built-in datatype.
///
/// Only `xs:`-prefixed names qualify: a bare `Name` belongs to whatever the
/// default namespace is, and normalization has already prefixed it when that
/// namespace is XSD.
pub fn is_builtin_ref(type_name: &str) -> bool {
    match split_qname(type_name) {
        (Some(prefix), local) => prefix == SCHEMA_PREFIX && is_builtin(local),
        (None, _) => false,
    }
}
