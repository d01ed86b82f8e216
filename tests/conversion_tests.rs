//! End-to-end conversion tests
//!
//! Convert JSON documents against the fixture schemas and check the emitted XML,
//! both as text and decoded back with an independent parser.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

use xsdmapper::{convert, convert_with_model, ConvertOptions, Error, SchemaParser};

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn order_schema() -> PathBuf {
    fixtures_dir().join("order").join("order.xsd")
}

fn order_json() -> Value {
    let text = std::fs::read_to_string(fixtures_dir().join("order").join("order.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn compact() -> ConvertOptions {
    ConvertOptions::new().with_xml_declaration(false)
}

const ORDER_XML: &str = concat!(
    r#"<Order xmlns="urn:example:orders" status="open" channel="web">"#,
    "<Number>PO-1</Number>",
    "<Customer><Name>Ana</Name><CNPJ>12345678000199</CNPJ></Customer>",
    r#"<Item line="1"><Sku>ABC-1</Sku><Quantity>2</Quantity></Item>"#,
    r#"<Item line="2"><Sku>XYZ-9</Sku><Quantity>1</Quantity></Item>"#,
    r#"<Total currency="BRL">99.5</Total>"#,
    r#"<Notes><Gift>yes</Gift><Wrap color="red"/></Notes>"#,
    "</Order>"
);

// ============================================================================
// Full documents
// ============================================================================

#[test]
fn test_convert_order_fixture() {
    let xml = convert(&order_json(), order_schema(), &compact()).unwrap();
    assert_eq!(xml, ORDER_XML);
}

#[test]
fn test_output_decodes_to_schema_structure() {
    let xml = convert(&order_json(), order_schema(), &ConvertOptions::new().with_pretty_print(true)).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let root = doc.root_element();

    assert_eq!(root.tag_name().name(), "Order");
    assert_eq!(root.tag_name().namespace(), Some("urn:example:orders"));
    assert_eq!(root.attribute("channel"), Some("web"));
    assert_eq!(root.attribute("status"), Some("open"));

    let children: Vec<&str> = root
        .children()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name())
        .collect();
    assert_eq!(children, vec!["Number", "Customer", "Item", "Item", "Total", "Notes"]);

    let total = root.children().find(|n| n.has_tag_name("Total")).unwrap();
    assert_eq!(total.text(), Some("99.5"));
    assert_eq!(total.attribute("currency"), Some("BRL"));
}

#[test]
fn test_pretty_print_and_declaration() {
    let xml = convert(&order_json(), order_schema(), &ConvertOptions::new().with_pretty_print(true)).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains("\n  <Number>PO-1</Number>"));
    assert!(xml.contains("\n    <Name>Ana</Name>"));
}

#[test]
fn test_declared_encoding_label_only_changes_declaration() {
    let options = ConvertOptions::new().with_encoding("ISO-8859-1");
    let xml = convert(&order_json(), order_schema(), &options).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#));
    assert!(xml.ends_with(&ORDER_XML[ORDER_XML.find('>').unwrap() + 1..]));
}

#[test]
fn test_root_override_without_wrapper() {
    let json = order_json()["Order"].clone();
    let options = compact().with_root_element(Some("Order".to_string()));
    let xml = convert(&json, order_schema(), &options).unwrap();
    assert_eq!(xml, ORDER_XML);
}

// ============================================================================
// Mapping rules
// ============================================================================

#[test]
fn test_choice_emits_only_given_alternative() {
    let mut json = order_json();
    json["Order"]["customer"] = json!({"Name": "Bia", "CPF": "123"});
    let xml = convert(&json, order_schema(), &compact()).unwrap();
    assert!(xml.contains("<Customer><Name>Bia</Name><CPF>123</CPF></Customer>"));
    assert!(!xml.contains("CNPJ"));
}

#[test]
fn test_single_item_object_is_accepted_for_repeated_element() {
    let mut json = order_json();
    json["Order"]["item"] = json!({"Sku": "ONE", "Quantity": 1});
    let xml = convert(&json, order_schema(), &compact()).unwrap();
    assert!(xml.contains("<Item><Sku>ONE</Sku><Quantity>1</Quantity></Item>"));
}

#[test]
fn test_array_for_single_element_is_mapping_error() {
    let mut json = order_json();
    json["Order"]["number"] = json!(["PO-1", "PO-2"]);
    let err = convert(&json, order_schema(), &compact()).unwrap_err();
    match err {
        Error::Mapping(e) => assert_eq!(e.path, "$.Number"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_special_characters_are_escaped() {
    let mut json = order_json();
    json["Order"]["number"] = json!("A < B & C");
    let xml = convert(&json, order_schema(), &compact()).unwrap();
    assert!(xml.contains("<Number>A &lt; B &amp; C</Number>"));

    let doc = roxmltree::Document::parse(&xml).unwrap();
    let number = doc.descendants().find(|n| n.has_tag_name("Number")).unwrap();
    assert_eq!(number.text(), Some("A < B & C"));
}

#[test]
fn test_explicit_attribute_overrides_default() {
    let mut json = order_json();
    json["Order"]["@status"] = json!("closed");
    json["Order"]["total"] = json!({"@currency": "USD", "#text": "10.00"});
    let xml = convert(&json, order_schema(), &compact()).unwrap();
    assert!(xml.contains(r#"status="closed""#));
    assert!(xml.contains(r#"<Total currency="USD">10.00</Total>"#));
}

#[test]
fn test_custom_attribute_prefix_and_text_key() {
    let json = json!({"Order": {
        "_channel": "phone",
        "Number": "7",
        "Customer": {"Name": "C"},
        "Item": [],
        "Total": {"value": 1}
    }});
    let options = compact().with_attribute_prefix("_").with_text_node_key("value");
    let xml = convert(&json, order_schema(), &options).unwrap();
    assert!(xml.contains(r#"channel="phone""#));
    assert!(xml.contains(r#"<Total currency="BRL">1</Total>"#));
}

#[test]
fn test_wsdl_embedded_schema_conversion() {
    let json = json!({"Ping": {"message": "hello", "meta": {"@source": "cli"}}});
    let xml = convert(&json, fixtures_dir().join("service.wsdl"), &compact()).unwrap();
    assert_eq!(
        xml,
        r#"<Ping xmlns="urn:example:service"><Message>hello</Message><Meta source="cli"/></Ping>"#
    );
}

// ============================================================================
// Strict mode
// ============================================================================

#[test]
fn test_strict_mode_reports_unknown_key() {
    let options = compact().with_strict(true);
    let err = convert(&order_json(), order_schema(), &options).unwrap_err();
    let issues = err.issues().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, "$.ignored");
}

#[test]
fn test_strict_mode_accepts_clean_input() {
    let mut json = order_json();
    json["Order"].as_object_mut().unwrap().remove("ignored");
    let xml = convert(&json, order_schema(), &compact().with_strict(true)).unwrap();
    assert_eq!(xml, ORDER_XML);
}

#[test]
fn test_strict_mode_collects_all_issues() {
    let json = json!({"Order": {"Customer": {"Name": {"nested": true}}, "Item": [[1]], "Extra": 1}});
    let err = convert(&json, order_schema(), &compact().with_strict(true)).unwrap_err();
    let paths: Vec<&str> = err.issues().unwrap().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "$.@channel",
            "$.Number",
            "$.Customer.Name",
            "$.Item[0]",
            "$.Total",
            "$.Extra",
        ]
    );
}

// ============================================================================
// Schema-independent invariants
// ============================================================================

#[test]
fn test_default_namespace_schema_converts_identically() {
    let prefixed = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:element name="Box">
            <xs:complexType>
                <xs:sequence>
                    <xs:element name="Label" type="xs:string"/>
                    <xs:element name="Size" type="xs:int" maxOccurs="2"/>
                </xs:sequence>
                <xs:attribute name="kind" type="xs:string" default="plain"/>
            </xs:complexType>
        </xs:element>
    </xs:schema>"#;
    let default_ns = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
        <element name="Box">
            <complexType>
                <sequence>
                    <element name="Label" type="string"/>
                    <element name="Size" type="int" maxOccurs="2"/>
                </sequence>
                <attribute name="kind" type="string" default="plain"/>
            </complexType>
        </element>
    </schema>"#;

    let parser = SchemaParser::new();
    let a = parser.parse_str(prefixed, None).unwrap();
    let b = parser.parse_str(default_ns, None).unwrap();
    let json = json!({"Box": {"size": [1, 2], "label": "x"}});

    let xml_a = convert_with_model(&json, &a, &compact()).unwrap();
    let xml_b = convert_with_model(&json, &b, &compact()).unwrap();
    assert_eq!(xml_a, xml_b);
    assert_eq!(xml_a, r#"<Box kind="plain"><Label>x</Label><Size>1</Size><Size>2</Size></Box>"#);
}

#[test]
fn test_user_type_named_like_builtin_keeps_its_structure() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
            xmlns="urn:p" targetNamespace="urn:p">
        <xs:element name="FullName" type="Name"/>
        <xs:complexType name="Name">
            <xs:sequence>
                <xs:element name="First" type="xs:string"/>
                <xs:element name="Last" type="token"/>
            </xs:sequence>
        </xs:complexType>
        <xs:simpleType name="token">
            <xs:restriction base="xs:string"/>
        </xs:simpleType>
    </xs:schema>"#;
    let model = SchemaParser::new().parse_str(schema, None).unwrap();
    let json = json!({"FullName": {"First": "Ana", "Last": "Lima"}});

    let xml = convert_with_model(&json, &model, &compact().with_strict(true)).unwrap();
    assert_eq!(xml, r#"<FullName xmlns="urn:p"><First>Ana</First><Last>Lima</Last></FullName>"#);
}

#[test]
fn test_conversion_is_deterministic() {
    let model = SchemaParser::new().parse(order_schema(), None).unwrap();
    let first = convert_with_model(&order_json(), &model, &compact()).unwrap();
    let second = convert_with_model(&order_json(), &model, &compact()).unwrap();
    assert_eq!(first, second);
}

fn flip_case(key: &str, upper: bool) -> String {
    if upper {
        key.to_uppercase()
    } else {
        key.to_lowercase()
    }
}

proptest! {
    #[test]
    fn prop_key_casing_does_not_change_output(flags in proptest::collection::vec(any::<bool>(), 4)) {
        let model = SchemaParser::new().parse(order_schema(), None).unwrap();
        let json = json!({"Order": {
            "@channel": "web",
            flip_case("Number", flags[0]): "1",
            flip_case("Customer", flags[1]): {flip_case("Name", flags[2]): "N"},
            flip_case("Total", flags[3]): 5
        }});

        let xml = convert_with_model(&json, &model, &compact()).unwrap();
        prop_assert_eq!(
            xml,
            r#"<Order xmlns="urn:example:orders" status="open" channel="web"><Number>1</Number><Customer><Name>N</Name></Customer><Total currency="BRL">5</Total></Order>"#
        );
    }
}
