//! XSD Document Parsing
//!
//! Turns one XSD (or the schema embedded in a WSDL) plus everything it
//! includes or imports into a flat [`SchemaModel`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::model::{
    AttributeDef, AttributeUse, ComplexTypeDef, Compositor, ElementDef, MaxOccurs, SchemaModel,
    SimpleTypeDef,
};
use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::loaders::{normalize_declaration, Loader};
use crate::namespaces::{local_part, normalize_schema_prefixes, NamespaceContext, XSD_NAMESPACE};

/// XSD element names, after prefix normalization
mod xsd_elements {
    pub const SCHEMA: &str = "xs:schema";
    pub const ELEMENT: &str = "xs:element";
    pub const COMPLEX_TYPE: &str = "xs:complexType";
    pub const SIMPLE_TYPE: &str = "xs:simpleType";
    pub const ATTRIBUTE: &str = "xs:attribute";
    pub const SEQUENCE: &str = "xs:sequence";
    pub const CHOICE: &str = "xs:choice";
    pub const ALL: &str = "xs:all";
    pub const ANY: &str = "xs:any";
    pub const IMPORT: &str = "xs:import";
    pub const INCLUDE: &str = "xs:include";
    pub const RESTRICTION: &str = "xs:restriction";
    pub const EXTENSION: &str = "xs:extension";
    pub const LIST: &str = "xs:list";
    pub const COMPLEX_CONTENT: &str = "xs:complexContent";
    pub const SIMPLE_CONTENT: &str = "xs:simpleContent";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const BASE: &str = "base";
    pub const NAMESPACE: &str = "namespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
}

/// Cycle and reuse bookkeeping for one top-level parse call
#[derive(Debug, Default)]
struct ResolutionState {
    /// Sources still being resolved somewhere up the call chain
    in_progress: HashSet<PathBuf>,
    /// Sources already fully resolved during this call
    resolved: HashMap<PathBuf, SchemaModel>,
}

/// Schema parser
#[derive(Debug, Default)]
pub struct SchemaParser {
    loader: Loader,
}

impl SchemaParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema file, resolving every include and import.
    ///
    /// A relative `path` is taken relative to `base_dir` when one is given.
    pub fn parse(&self, path: impl AsRef<Path>, base_dir: Option<&Path>) -> Result<SchemaModel> {
        let path = resolve_schema_location(&path.as_ref().to_string_lossy(), base_dir);
        let mut state = ResolutionState::default();
        let mut model = self.parse_file(&path, &mut state)?;
        infer_root(&mut model);
        Ok(model)
    }

    /// Parse schema text held in memory.
    ///
    /// Includes and imports resolve relative to `base_dir`, or the working
    /// directory when none is given.
    pub fn parse_str(&self, text: &str, base_dir: Option<&Path>) -> Result<SchemaModel> {
        let text = normalize_declaration(text);
        let mut state = ResolutionState::default();
        let mut model = self.parse_text(&text, base_dir, &mut state)?;
        infer_root(&mut model);
        Ok(model)
    }

    fn parse_file(&self, path: &Path, state: &mut ResolutionState) -> Result<SchemaModel> {
        let identity = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if state.in_progress.contains(&identity) {
            debug!(location = %path.display(), "schema already being resolved, breaking cycle");
            return Ok(SchemaModel::new());
        }
        if let Some(model) = state.resolved.get(&identity) {
            return Ok(model.clone());
        }

        let text = self.loader.load(path)?;

        state.in_progress.insert(identity.clone());
        let result = self
            .parse_text(&text, path.parent(), state)
            .map_err(|e| match e {
                Error::SchemaSyntax(pe) if pe.location.is_none() => {
                    Error::SchemaSyntax(pe.with_location(path.display().to_string()))
                }
                other => other,
            });
        state.in_progress.remove(&identity);

        let model = result?;
        state.resolved.insert(identity, model.clone());
        Ok(model)
    }

    fn parse_text(&self, text: &str, base_dir: Option<&Path>, state: &mut ResolutionState) -> Result<SchemaModel> {
        let doc = Document::from_string(text)?;
        let root = doc
            .root
            .ok_or_else(|| Error::syntax("Empty document"))?;
        let schema = extract_schema(root)?;

        let mut model = collect_definitions(&schema);

        for include in schema.children_named(xsd_elements::INCLUDE) {
            let Some(location) = include.get_attribute(xsd_attrs::SCHEMA_LOCATION) else {
                warn!("xs:include without schemaLocation skipped");
                continue;
            };
            let path = resolve_schema_location(location, base_dir);
            match self.parse_file(&path, state) {
                Ok(included) => {
                    debug!(location = %path.display(), "merged include");
                    model.merge_included(&included);
                }
                Err(e) => warn!(location = %path.display(), error = %e, "skipping unresolvable include"),
            }
        }

        let prefix_map = prefix_map(&schema);
        for import in schema.children_named(xsd_elements::IMPORT) {
            let Some(location) = import.get_attribute(xsd_attrs::SCHEMA_LOCATION) else {
                debug!("xs:import without schemaLocation skipped");
                continue;
            };
            let path = resolve_schema_location(location, base_dir);
            match self.parse_file(&path, state) {
                Ok(imported) => {
                    let namespace = import
                        .get_attribute(xsd_attrs::NAMESPACE)
                        .map(str::to_string)
                        .or_else(|| imported.target_namespace.clone());
                    let prefixes: Vec<String> = match namespace {
                        Some(ref ns) => prefix_map.prefixes_for(ns).map(str::to_string).collect(),
                        None => Vec::new(),
                    };
                    debug!(location = %path.display(), ?prefixes, "merged import");
                    model.merge_imported(&imported, &prefixes);
                }
                Err(e) => warn!(location = %path.display(), error = %e, "skipping unresolvable import"),
            }
        }

        Ok(model)
    }
}

/// Find the schema element, normalizing prefixes and unwrapping WSDL.
fn extract_schema(mut root: Element) -> Result<Element> {
    normalize_schema_prefixes(&mut root, &NamespaceContext::new());

    if root.name == xsd_elements::SCHEMA {
        return Ok(root);
    }

    if root.local_name() == "definitions" {
        let types = root.find_child_local("types");
        let embedded = types.and_then(|t| t.find_child(xsd_elements::SCHEMA));
        let (Some(types), Some(embedded)) = (types, embedded) else {
            return Err(Error::syntax("Service description has no embedded xs:schema section"));
        };

        let mut schema = embedded.clone();
        for (prefix, uri) in root.namespaces.iter().chain(types.namespaces.iter()) {
            if !schema.namespaces.contains_key(prefix) {
                schema.declare_namespace(prefix.clone(), uri.clone());
            }
        }
        return Ok(schema);
    }

    Err(Error::SchemaSyntax(ParseError::new(format!(
        "Expected xs:schema root element, got {}",
        root.name
    ))))
}

/// Prefixes declared on the schema element, minus the schema vocabulary itself
fn prefix_map(schema: &Element) -> NamespaceContext {
    let mut ctx = NamespaceContext::new();
    for (prefix, uri) in &schema.namespaces {
        if !prefix.is_empty() && uri != XSD_NAMESPACE {
            ctx.add_prefix(prefix.clone(), uri.clone());
        }
    }
    ctx
}

/// Collect the schema's own top-level declarations
fn collect_definitions(schema: &Element) -> SchemaModel {
    let mut model = SchemaModel::new();
    model.target_namespace = schema
        .get_attribute(xsd_attrs::TARGET_NAMESPACE)
        .map(str::to_string);

    for child in &schema.children {
        match child.name.as_str() {
            xsd_elements::ELEMENT => {
                if let Some(def) = parse_element(child) {
                    if model.root_element.is_empty() {
                        model.root_element = def.name.clone();
                    }
                    model.elements.entry(def.name.clone()).or_insert(def);
                }
            }
            xsd_elements::COMPLEX_TYPE => {
                if let Some(name) = child.get_attribute(xsd_attrs::NAME) {
                    model
                        .complex_types
                        .entry(name.to_string())
                        .or_insert_with(|| parse_complex_type(child, name));
                }
            }
            xsd_elements::SIMPLE_TYPE => {
                if let Some(name) = child.get_attribute(xsd_attrs::NAME) {
                    model
                        .simple_types
                        .entry(name.to_string())
                        .or_insert_with(|| parse_simple_type(child, name));
                }
            }
            _ => {}
        }
    }

    model
}

/// Parse an element declaration or reference
fn parse_element(elem: &Element) -> Option<ElementDef> {
    let reference = elem.get_attribute(xsd_attrs::REF);
    let name = elem
        .get_attribute(xsd_attrs::NAME)
        .or_else(|| reference.map(local_part))?;

    let (min_occurs, max_occurs) = parse_occurs(elem);
    let mut def = ElementDef::new(name).with_occurs(min_occurs, max_occurs);
    def.type_name = elem.get_attribute(xsd_attrs::TYPE).map(str::to_string);
    def.reference = reference.map(str::to_string);

    if let Some(inline) = elem.find_child(xsd_elements::COMPLEX_TYPE) {
        def = def.with_inline_type(parse_complex_type(inline, ""));
    }

    Some(def)
}

/// Parse minOccurs and maxOccurs attributes
fn parse_occurs(elem: &Element) -> (u32, MaxOccurs) {
    let min = elem
        .get_attribute(xsd_attrs::MIN_OCCURS)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(1);
    let max = MaxOccurs::parse(elem.get_attribute(xsd_attrs::MAX_OCCURS));
    (min, max)
}

/// Parse a named or inline complexType
fn parse_complex_type(elem: &Element, name: &str) -> ComplexTypeDef {
    let mut complex_type = ComplexTypeDef::new(name);

    if let Some(simple_content) = elem.find_child(xsd_elements::SIMPLE_CONTENT) {
        complex_type.has_text_content = true;
        let derivation = simple_content
            .find_child(xsd_elements::EXTENSION)
            .or_else(|| simple_content.find_child(xsd_elements::RESTRICTION));
        if let Some(derivation) = derivation {
            collect_attributes(derivation, &mut complex_type.attributes);
        }
        return complex_type;
    }

    if let Some(complex_content) = elem.find_child(xsd_elements::COMPLEX_CONTENT) {
        if let Some(extension) = complex_content.find_child(xsd_elements::EXTENSION) {
            complex_type.extends = extension.get_attribute(xsd_attrs::BASE).map(str::to_string);
            read_content(extension, &mut complex_type);
        } else if let Some(restriction) = complex_content.find_child(xsd_elements::RESTRICTION) {
            read_content(restriction, &mut complex_type);
        }
        return complex_type;
    }

    read_content(elem, &mut complex_type);
    complex_type
}

/// Read the compositor and attributes held directly by `holder`
fn read_content(holder: &Element, complex_type: &mut ComplexTypeDef) {
    let compositor = holder
        .children
        .iter()
        .find_map(|c| compositor_of(c).map(|kind| (c, kind)));

    if let Some((model_elem, kind)) = compositor {
        complex_type.compositor = kind;
        let optional = model_elem.get_attribute(xsd_attrs::MIN_OCCURS) == Some("0");
        collect_particles(model_elem, complex_type, optional);
    }

    collect_attributes(holder, &mut complex_type.attributes);
}

fn compositor_of(elem: &Element) -> Option<Compositor> {
    match elem.name.as_str() {
        xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
            Compositor::from_local_name(elem.local_name())
        }
        _ => None,
    }
}

/// Collect element particles and wildcards; nested compositors are flattened.
///
/// Members of a nested choice or of an optional nested group lose their
/// individual requirement (`minOccurs` becomes 0).
fn collect_particles(model_elem: &Element, complex_type: &mut ComplexTypeDef, optional: bool) {
    for child in &model_elem.children {
        match child.name.as_str() {
            xsd_elements::ELEMENT => {
                if let Some(mut def) = parse_element(child) {
                    if optional {
                        def.min_occurs = 0;
                    }
                    complex_type.elements.push(def);
                }
            }
            xsd_elements::ANY => complex_type.has_wildcard = true,
            _ => {
                if let Some(kind) = compositor_of(child) {
                    let nested_optional = optional
                        || kind == Compositor::Choice
                        || child.get_attribute(xsd_attrs::MIN_OCCURS) == Some("0");
                    collect_particles(child, complex_type, nested_optional);
                }
            }
        }
    }
}

fn collect_attributes(holder: &Element, out: &mut Vec<AttributeDef>) {
    for child in holder.children_named(xsd_elements::ATTRIBUTE) {
        if let Some(attr) = parse_attribute(child) {
            out.push(attr);
        }
    }
}

fn parse_attribute(elem: &Element) -> Option<AttributeDef> {
    let name = elem
        .get_attribute(xsd_attrs::NAME)
        .or_else(|| elem.get_attribute(xsd_attrs::REF).map(local_part))?;

    Some(AttributeDef {
        name: name.to_string(),
        type_name: elem.get_attribute(xsd_attrs::TYPE).map(str::to_string),
        use_: AttributeUse::parse(elem.get_attribute(xsd_attrs::USE)),
        default: elem.get_attribute(xsd_attrs::DEFAULT).map(str::to_string),
        fixed: elem.get_attribute(xsd_attrs::FIXED).map(str::to_string),
    })
}

fn parse_simple_type(elem: &Element, name: &str) -> SimpleTypeDef {
    let base = elem
        .find_child(xsd_elements::RESTRICTION)
        .and_then(|r| r.get_attribute(xsd_attrs::BASE))
        .or_else(|| {
            elem.find_child(xsd_elements::LIST)
                .and_then(|l| l.get_attribute(xsd_attrs::ITEM_TYPE))
        })
        .map(str::to_string);

    SimpleTypeDef {
        name: name.to_string(),
        base,
    }
}

/// Resolve a schemaLocation relative to the including schema's directory
fn resolve_schema_location(location: &str, base_dir: Option<&Path>) -> PathBuf {
    let location_path = Path::new(location);

    if location_path.is_absolute() {
        return location_path.to_path_buf();
    }

    match base_dir {
        Some(base) => base.join(location_path),
        None => location_path.to_path_buf(),
    }
}

/// Fall back to the first merged element when the schema declares none itself
fn infer_root(model: &mut SchemaModel) {
    if !model.root_element.is_empty() {
        return;
    }
    if let Some(first) = model.elements.keys().next() {
        debug!(root = %first, "no local top-level element, inferring root from merged elements");
        model.root_element = first.clone();
        model.root_inferred = true;
    }
}
