//! Strict-mode validation
//!
//! Checks a JSON input against the schema before anything is built, using the
//! same walker queries as the builder. Every problem found is collected; the
//! result is either success or one [`ValidationError`] listing all issues.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::converters::values::{kind_of, lookup, lookup_present, names_match};
use crate::error::{Result, ValidationError, ValidationIssue};
use crate::schema::{ElementDef, SchemaWalker};

static ABSENT: JsonValue = JsonValue::Null;

/// Validates JSON input against a schema walker
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'a> {
    walker: SchemaWalker<'a>,
    attribute_prefix: &'a str,
    text_node_key: &'a str,
}

impl<'a> SchemaValidator<'a> {
    /// Create a validator with the attribute prefix and text key used by the input
    pub fn new(walker: SchemaWalker<'a>, attribute_prefix: &'a str, text_node_key: &'a str) -> Self {
        Self {
            walker,
            attribute_prefix,
            text_node_key,
        }
    }

    /// Validate `json` as the content of top-level element `root_name`
    pub fn validate(&self, json: &JsonValue, root_name: &str) -> Result<()> {
        let issues = self.collect_issues(json, root_name);
        if issues.is_empty() {
            Ok(())
        } else {
            debug!(root = %root_name, count = issues.len(), "validation failed");
            Err(ValidationError::new(issues).into())
        }
    }

    /// All issues found in `json`, in document order
    pub fn collect_issues(&self, json: &JsonValue, root_name: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        match self.walker.root_element(root_name) {
            Some(root) => {
                if json.is_array() {
                    issues.push(ValidationIssue::new("$", "the root element cannot be an array"));
                } else {
                    self.check_element(root, json, "$", &mut issues);
                }
            }
            None => issues.push(ValidationIssue::new(
                "$",
                format!("root element '{}' is not declared in the schema", root_name),
            )),
        }
        issues
    }

    fn check_element(&self, def: &ElementDef, value: &JsonValue, path: &str, issues: &mut Vec<ValidationIssue>) {
        match value {
            JsonValue::Null => {
                if def.is_required() {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("required element '{}' is missing", def.name),
                    ));
                }
            }
            JsonValue::Array(items) => {
                if !def.is_array() {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("'{}' allows a single occurrence but an array was given", def.name),
                    ));
                    return;
                }
                let count = items.iter().filter(|item| !item.is_null()).count();
                if (count as u64) < u64::from(def.min_occurs) {
                    issues.push(ValidationIssue::new(
                        path,
                        format!(
                            "'{}' needs at least {} occurrence(s), found {}",
                            def.name, def.min_occurs, count
                        ),
                    ));
                }
                if def.max_occurs.is_exceeded(count) {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("'{}' has too many occurrences ({})", def.name, count),
                    ));
                }
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    match item {
                        JsonValue::Null => {}
                        JsonValue::Array(_) => issues.push(ValidationIssue::new(
                            item_path,
                            format!("nested arrays cannot be mapped to repeated '{}'", def.name),
                        )),
                        _ => self.check_instance(def, item, &item_path, issues),
                    }
                }
            }
            _ => {
                if def.min_occurs > 1 {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("'{}' needs at least {} occurrence(s), found 1", def.name, def.min_occurs),
                    ));
                }
                self.check_instance(def, value, path, issues);
            }
        }
    }

    fn check_instance(&self, def: &ElementDef, value: &JsonValue, path: &str, issues: &mut Vec<ValidationIssue>) {
        let Some(complex_type) = self.walker.resolve_complex_type(def) else {
            if let JsonValue::Object(object) = value {
                if lookup(object, self.text_node_key).is_none() {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("'{}' expects a simple value, found an object", def.name),
                    ));
                }
            }
            return;
        };

        let JsonValue::Object(object) = value else {
            if complex_type.has_text_content {
                self.check_required_attributes(def, &Map::new(), path, issues);
            } else {
                issues.push(ValidationIssue::new(
                    path,
                    format!("'{}' expects an object, found {}", def.name, kind_of(value)),
                ));
            }
            return;
        };

        self.check_required_attributes(def, object, path, issues);

        if complex_type.has_text_content && lookup(object, self.text_node_key).is_some() {
            self.check_unknown_keys(def, object, path, issues);
            return;
        }

        let groups = self.walker.choice_groups(def);
        for child in self.walker.resolve_children(def) {
            let in_choice = groups
                .iter()
                .any(|group| group.iter().any(|member| std::ptr::eq(member, child)));
            let child_value = lookup(object, &child.name).map_or(&ABSENT, |(_, v)| v);
            if in_choice && child_value.is_null() {
                continue;
            }
            let child_path = format!("{}.{}", path, child.name);
            self.check_element(child, child_value, &child_path, issues);
        }

        for group in groups {
            self.check_choice(group, object, path, issues);
        }

        self.check_unknown_keys(def, object, path, issues);
    }

    /// Exactly one alternative of a choice may be given
    fn check_choice(
        &self,
        group: &[ElementDef],
        object: &Map<String, JsonValue>,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let present: Vec<&str> = group
            .iter()
            .filter(|member| lookup_present(object, &member.name).is_some())
            .map(|member| member.name.as_str())
            .collect();
        let names = group.iter().map(|m| m.name.as_str()).collect::<Vec<_>>().join(", ");

        if present.is_empty() && group.iter().all(ElementDef::is_required) {
            issues.push(ValidationIssue::new(path, format!("one of [{}] is required", names)));
        } else if present.len() > 1 {
            issues.push(ValidationIssue::new(
                path,
                format!("only one of [{}] may be given, found {}", names, present.join(", ")),
            ));
        }
    }

    fn check_required_attributes(
        &self,
        def: &ElementDef,
        object: &Map<String, JsonValue>,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for attr in self.walker.resolve_attributes(def) {
            if !attr.is_required() {
                continue;
            }
            let key = format!("{}{}", self.attribute_prefix, attr.name);
            if lookup_present(object, &key).is_none() {
                issues.push(ValidationIssue::new(
                    format!("{}.{}", path, key),
                    format!("required attribute '{}' is missing", attr.name),
                ));
            }
        }
    }

    fn check_unknown_keys(
        &self,
        def: &ElementDef,
        object: &Map<String, JsonValue>,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if self.walker.has_wildcard(def) {
            return;
        }
        let attributes = self.walker.resolve_attributes(def);
        let children = self.walker.resolve_children(def);
        let prefix = self.attribute_prefix;

        for key in object.keys() {
            if names_match(key, self.text_node_key) {
                continue;
            }
            let known = match key.strip_prefix(prefix).filter(|_| !prefix.is_empty()) {
                Some(attr_name) => attributes.iter().any(|a| names_match(&a.name, attr_name)),
                None => children.iter().any(|c| names_match(&c.name, key)),
            };
            if !known {
                issues.push(ValidationIssue::new(
                    format!("{}.{}", path, key),
                    format!("'{}' is not declared for '{}'", key, def.name),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaModel, SchemaParser};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:element name="Invoice">
            <xs:complexType>
                <xs:sequence>
                    <xs:element name="Number" type="xs:string"/>
                    <xs:element name="Line" type="LineType" minOccurs="1" maxOccurs="2"/>
                    <xs:element name="Payment" type="PaymentType" minOccurs="0"/>
                </xs:sequence>
                <xs:attribute name="series" type="xs:string" use="required"/>
            </xs:complexType>
        </xs:element>
        <xs:complexType name="LineType">
            <xs:sequence>
                <xs:element name="Amount" type="xs:decimal"/>
            </xs:sequence>
        </xs:complexType>
        <xs:complexType name="PaymentType">
            <xs:choice>
                <xs:element name="Card" type="xs:string"/>
                <xs:element name="Cash" type="xs:string"/>
            </xs:choice>
        </xs:complexType>
    </xs:schema>"#;

    fn model() -> SchemaModel {
        SchemaParser::new().parse_str(SCHEMA, None).unwrap()
    }

    fn issues(json: JsonValue) -> Vec<String> {
        let model = model();
        SchemaValidator::new(SchemaWalker::new(&model), "@", "#text")
            .collect_issues(&json, "Invoice")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_valid_input_passes() {
        let model = model();
        let validator = SchemaValidator::new(SchemaWalker::new(&model), "@", "#text");
        let json = json!({"@series": "A", "number": "1", "Line": [{"Amount": 1}], "Payment": {"Cash": "10"}});
        assert!(validator.validate(&json, "Invoice").is_ok());
    }

    #[test]
    fn test_collects_every_issue() {
        let found = issues(json!({"Line": {"Amount": {"x": 1}}, "Bogus": 1, "@other": "x"}));
        assert_eq!(
            found,
            vec![
                "$.@series: required attribute 'series' is missing",
                "$.Number: required element 'Number' is missing",
                "$.Line.Amount: 'Amount' expects a simple value, found an object",
                "$.Bogus: 'Bogus' is not declared for 'Invoice'",
                "$.@other: '@other' is not declared for 'Invoice'",
            ]
        );
    }

    #[test]
    fn test_occurrence_bounds() {
        let found = issues(json!({"@series": "A", "Number": "1", "Line": [{"Amount": 1}, {"Amount": 2}, {"Amount": 3}]}));
        assert_eq!(found, vec!["$.Line: 'Line' has too many occurrences (3)"]);

        let found = issues(json!({"@series": "A", "Number": "1", "Line": []}));
        assert_eq!(found, vec!["$.Line: 'Line' needs at least 1 occurrence(s), found 0"]);

        let found = issues(json!({"@series": "A", "Number": ["1", "2"], "Line": {"Amount": 1}}));
        assert_eq!(found, vec!["$.Number: 'Number' allows a single occurrence but an array was given"]);
    }

    #[test]
    fn test_choice_alternatives() {
        let base = json!({"@series": "A", "Number": "1", "Line": {"Amount": 1}});

        let mut both = base.clone();
        both["Payment"] = json!({"Card": "x", "Cash": "y"});
        assert_eq!(issues(both), vec!["$.Payment: only one of [Card, Cash] may be given, found Card, Cash"]);

        let mut neither = base.clone();
        neither["Payment"] = json!({});
        assert_eq!(issues(neither), vec!["$.Payment: one of [Card, Cash] is required"]);

        assert!(issues(base).is_empty());
    }

    #[test]
    fn test_optional_choice_accepts_empty_object() {
        let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="Pay">
                <xs:complexType>
                    <xs:choice minOccurs="0">
                        <xs:element name="Card" type="xs:string"/>
                        <xs:element name="Cash" type="xs:string"/>
                    </xs:choice>
                </xs:complexType>
            </xs:element>
        </xs:schema>"#;
        let model = SchemaParser::new().parse_str(schema, None).unwrap();
        let validator = SchemaValidator::new(SchemaWalker::new(&model), "@", "#text");

        assert!(validator.collect_issues(&json!({}), "Pay").is_empty());
        let both = validator.collect_issues(&json!({"Card": "x", "Cash": "y"}), "Pay");
        assert_eq!(both.len(), 1);
    }

    #[test]
    fn test_object_expected() {
        let found = issues(json!({"@series": "A", "Number": "1", "Line": "flat"}));
        assert_eq!(found, vec!["$.Line: 'Line' expects an object, found a string"]);
    }

    #[test]
    fn test_unknown_root() {
        let model = model();
        let err = SchemaValidator::new(SchemaWalker::new(&model), "@", "#text")
            .validate(&json!({}), "Receipt")
            .unwrap_err();
        let issues = err.issues().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "$");
    }
}
