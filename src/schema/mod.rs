//! Schema model, parser and walker

pub mod builtins;
pub mod model;
pub mod parsing;
pub mod walker;

pub use model::{
    AttributeDef, AttributeUse, ComplexTypeDef, Compositor, ElementDef, MaxOccurs, SchemaModel,
    SimpleTypeDef,
};
pub use parsing::SchemaParser;
pub use walker::SchemaWalker;
