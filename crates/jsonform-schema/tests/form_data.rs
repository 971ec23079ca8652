//! Integration test: load native data into compiled forms, validate it and
//! read it back, per field kind.

use jsonform_core::{FormConfig, Validator};
use jsonform_schema::{ConverterRegistry, FormModel, RawValue, WidgetOptions};
use proptest::prelude::*;
use serde_json::{json, Value};

fn compile(schema: Value) -> FormModel {
    FormModel::from_schema_with(&schema, &ConverterRegistry::with_defaults(), &FormConfig::default()).unwrap()
}

fn text(form: &FormModel, raw: &RawValue, name: &str) -> String {
    match raw.get(name) {
        Some(RawValue::Text(t)) => t.clone(),
        other => panic!("expected text for {name} in {} form, got: {other:?}", form.name()),
    }
}

/// Paths with at least one failure, in field order.
fn failing_paths(form: &FormModel, data: &Value) -> Vec<String> {
    let mut paths: Vec<String> = form.check(data).unwrap().into_iter().map(|f| f.path).collect();
    paths.dedup();
    paths
}

fn string_form() -> FormModel {
    compile(json!({
        "title": "StringModel",
        "type": "object",
        "properties": {
            "s": {"title": "S", "type": "string"},
            "s_d": {"default": "Foobar", "title": "S D", "type": "string"},
            "s_d_n": {"anyOf": [{"type": "string"}, {"type": "null"}], "default": null, "title": "S D N"},
            "c": {"enum": ["A", "B", "C"], "title": "C", "type": "string"},
            "c_d": {"anyOf": [{"enum": ["C", "D"], "type": "string"}, {"type": "null"}], "default": null, "title": "C D"}
        },
        "required": ["s", "c"]
    }))
}

#[test]
fn test_string_fields() {
    let form = string_form();
    let raw = form.initial_raw().unwrap();
    let native = form.from_raw(&raw).unwrap();
    assert_eq!(native["s"], Value::Null);
    assert_eq!(native["s_d"], "Foobar");
    assert_eq!(native["s_d_n"], Value::Null);
    assert_eq!(native["c"], "A");
    assert_eq!(native["c_d"], Value::Null);

    // only the required text field is invalid as is
    assert_eq!(form.validate_raw(&raw).iter().map(|f| f.path.as_str()).collect::<Vec<_>>(), ["s"]);

    let data = json!({"s": "Anderson Paak is great", "c": "B"});
    assert!(form.check(&data).unwrap().is_empty());
    let normalized = form.normalize(&data).unwrap();
    assert_eq!(
        normalized,
        json!({"s": "Anderson Paak is great", "s_d": "Foobar", "s_d_n": null, "c": "B", "c_d": null})
    );
}

#[test]
fn test_number_fields() {
    let form = compile(json!({
        "type": "object",
        "properties": {
            "i": {"title": "I", "type": "integer"},
            "i_f": {"default": 0, "title": "I F", "type": "integer"},
            "f": {"title": "F", "type": "number"},
            "c": {"maximum": 115, "minimum": 10, "title": "C", "type": "integer"}
        },
        "required": ["i", "f", "c"]
    }));
    let raw = form.initial_raw().unwrap();
    assert_eq!(text(&form, &raw, "i_f"), "0");
    assert_eq!(form.from_raw(&raw).unwrap()["i_f"], 0);
    assert_eq!(failing_paths(&form, &json!({})), ["i", "f", "c"]);
    assert_eq!(failing_paths(&form, &json!({"i": 5, "f": 0.1, "c": 9})), ["c"]);

    let data = json!({"i": 5, "f": 0.1, "c": 15});
    assert!(form.check(&data).unwrap().is_empty());
    assert_eq!(form.normalize(&data).unwrap(), json!({"i": 5, "i_f": 0, "f": 0.1, "c": 15}));
}

#[test]
fn test_boolean_fields() {
    let form = compile(json!({
        "type": "object",
        "properties": {
            "a": {"title": "A", "type": "boolean"},
            "a_n": {"anyOf": [{"type": "boolean"}, {"type": "null"}], "default": null, "title": "A N"}
        },
        "required": ["a"]
    }));
    assert!(form.field("a").unwrap().required());
    assert!(!form.field("a_n").unwrap().required());
    let raw = form.initial_raw().unwrap();
    assert_eq!(form.from_raw(&raw).unwrap(), json!({"a": false, "a_n": false}));
    assert!(form.validate_raw(&raw).is_empty());

    let data = json!({"a": true, "a_n": false});
    assert_eq!(form.normalize(&data).unwrap(), data);
}

#[test]
fn test_array_of_literals() {
    let form = compile(json!({
        "$defs": {"AB": {"enum": ["A", "B"], "type": "string"}},
        "type": "object",
        "properties": {"i": {"items": {"enum": ["A", "B"], "type": "string"}, "title": "I", "type": "array"}},
        "required": ["i"]
    }));
    let raw = form.initial_raw().unwrap();
    assert_eq!(raw.get("i"), Some(&RawValue::Choices(vec![])));
    assert!(form.validate_raw(&raw).is_empty());

    let data = json!({"i": ["A", "B"]});
    assert_eq!(form.normalize(&data).unwrap(), data);
    assert_eq!(failing_paths(&form, &json!({"i": ["A", "Z"]})), ["i[1]"]);
}

#[test]
fn test_list_with_bounds_and_defaults() {
    let form = compile(json!({
        "type": "object",
        "properties": {
            "dates": {
                "type": "array",
                "items": {"type": "string", "format": "date"},
                "minItems": 1,
                "maxItems": 2,
                "default": ["2024-01-31"]
            }
        }
    }));
    let raw = form.initial_raw().unwrap();
    assert_eq!(
        raw.get("dates"),
        Some(&RawValue::List(vec![RawValue::Text("31.01.2024".into())]))
    );
    assert_eq!(form.from_raw(&raw).unwrap(), json!({"dates": ["2024-01-31"]}));

    let failures = form.check(&json!({"dates": []})).unwrap();
    assert_eq!(failures[0].validator, "min_items");
    assert_eq!(failures[0].message, "Must contain at least 1 items");

    let mut raw = form.to_raw(&json!({"dates": ["2024-02-01"]})).unwrap();
    if let Some(RawValue::List(items)) = raw.get_mut("dates") {
        items.push(RawValue::Text("2024-02-02".into()));
    }
    let failures = form.validate_raw(&raw);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "dates[1]");
    assert!(failures[0].message.starts_with("Is not a valid date of format"));
}

#[test]
fn test_nested_objects() {
    let form = compile(json!({
        "$defs": {
            "Inner": {
                "type": "object",
                "title": "Inner",
                "properties": {"n": {"type": "integer"}, "flag": {"type": "boolean", "default": true}},
                "required": ["n"]
            }
        },
        "type": "object",
        "properties": {"inner": {"$ref": "#/$defs/Inner"}, "other": {"type": "string"}},
        "required": ["inner"]
    }));
    assert_eq!(form.field("inner").unwrap().label(), "Inner");
    assert_eq!(failing_paths(&form, &json!({})), ["inner.n"]);
    assert_eq!(
        form.normalize(&json!({"inner": {"n": 3}, "unknown": 1})).unwrap(),
        json!({"inner": {"n": 3, "flag": true}, "other": null})
    );
}

#[test]
fn test_file_path_validator_rechecks_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let form = compile(json!({
        "type": "object",
        "properties": {"f": {"type": "string", "format": "file-path"}},
        "required": ["f"]
    }));
    let f = form.field("f").unwrap();
    assert!(!f.blank_allowed());
    assert_eq!(f.effective_validators().len(), 2);
    assert!(matches!(f.format_validator(), Some(Validator::FilePath { allow_blank: false })));

    let path = dir.path().join("foo");
    let data = json!({"f": path.to_string_lossy()});
    let failures = form.check(&data).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].message, "File does not exist");

    std::fs::write(&path, "foo").unwrap();
    assert!(form.check(&data).unwrap().is_empty());

    // a directory is not a file
    let failures = form.check(&json!({"f": dir.path().to_string_lossy()})).unwrap();
    assert_eq!(failures[0].message, "File does not exist");
}

#[test]
fn test_optional_path_formats() {
    let dir = tempfile::tempdir().unwrap();
    let form = compile(json!({
        "type": "object",
        "properties": {
            "p": {"type": "string", "format": "path"},
            "d": {"type": "string", "format": "directory-path"},
            "f_p_o": {"anyOf": [{"type": "string", "format": "file-path"}, {"type": "null"}], "default": null}
        },
        "required": ["p", "d"]
    }));
    let f_p_o = form.field("f_p_o").unwrap();
    assert!(f_p_o.blank_allowed());
    assert_eq!(f_p_o.effective_validators().len(), 1);

    let d = form.field("d").unwrap();
    assert_eq!(d.effective_validators().len(), 2);
    assert_eq!(d.format(), Some("directory-path"));

    assert_eq!(failing_paths(&form, &json!({})), ["p", "d"]);
    assert_eq!(failing_paths(&form, &json!({"p": ".", "d": dir.path()})), ["p"]);
    assert!(failing_paths(&form, &json!({"p": "~/", "d": dir.path()})).is_empty());
    match form.field("p").unwrap().options() {
        WidgetOptions::Input(input) => assert!(input.always_revalidate),
        other => panic!("expected input, got: {other:?}"),
    }
}

#[test]
fn test_custom_date_patterns() {
    let config = FormConfig {
        date_format: "%Y/%m/%d".into(),
        ..FormConfig::default()
    };
    let form = FormModel::from_schema_with(
        &json!({"type": "object", "properties": {"d": {"type": "string", "format": "date"}}}),
        &ConverterRegistry::with_defaults(),
        &config,
    )
    .unwrap();
    let raw = form.to_raw(&json!({"d": "2020-05-17"})).unwrap();
    assert_eq!(text(&form, &raw, "d"), "2020/05/17");
    assert!(form.validate_raw(&raw).is_empty());
}

proptest! {
    /// Inclusive bounds accept exactly [10, 115].
    #[test]
    fn prop_inclusive_range(n in -1000i64..1000) {
        let form = compile(json!({
            "type": "object",
            "properties": {"n": {"type": "integer", "minimum": 10, "maximum": 115}},
            "required": ["n"]
        }));
        let ok = form.check(&json!({"n": n})).unwrap().is_empty();
        prop_assert_eq!(ok, (10..=115).contains(&n));
    }

    /// Exclusive bounds accept exactly (10, 115).
    #[test]
    fn prop_exclusive_range(n in -1000i64..1000) {
        let form = compile(json!({
            "type": "object",
            "properties": {"n": {"type": "integer", "exclusiveMinimum": 10, "exclusiveMaximum": 115}},
            "required": ["n"]
        }));
        let ok = form.check(&json!({"n": n})).unwrap().is_empty();
        prop_assert_eq!(ok, (11..=114).contains(&n));
    }

    /// Text written through a field's setter reads back to the same native value.
    #[test]
    fn prop_native_round_trip(n in any::<i32>(), s in "[a-zA-Z0-9 ]{1,20}", day in 1u32..=28, month in 1u32..=12, year in 1900i32..2100) {
        let form = compile(json!({
            "type": "object",
            "properties": {
                "n": {"type": "integer"},
                "s": {"type": "string"},
                "d": {"type": "string", "format": "date"}
            }
        }));
        let data = json!({"n": n, "s": s, "d": format!("{year:04}-{month:02}-{day:02}")});
        prop_assert_eq!(form.normalize(&data).unwrap(), data);
    }
}
