use fieldrules::enums::{FailurePolicy, MessagePolicy, NumericMode, WildcardMatch};
use fieldrules::{FieldrulesError, ParseErrorKind, parse_record, parse_schema};
use serde_json::json;

#[test]
fn schema_with_all_sections() {
    let input = r#"
rules:
  user:
    name: required|min:3
    email:
      - required
      - "regex:/^[a-z]+@(example|test)\\.com$/"
  "tags.*": required
messages:
  user.name.required: Name is required
options:
  failure_policy: unconditional
  message_policy: first_per_field
  numeric: number
  wildcard_match: exact
"#;
    let schema = parse_schema(input).expect("schema loads");

    assert_eq!(
        schema.rules.get("user.name").unwrap(),
        &vec!["required".to_string(), "min:3".to_string()]
    );
    assert_eq!(schema.rules.get("user.email").unwrap().len(), 2);
    assert!(schema.rules.contains_key("tags.*"));
    assert_eq!(
        schema.messages.message_for("user.name", "required"),
        Some("Name is required")
    );
    assert_eq!(schema.options.failure_policy, FailurePolicy::Unconditional);
    assert_eq!(schema.options.message_policy, MessagePolicy::FirstPerField);
    assert_eq!(schema.options.numeric, NumericMode::Number);
    assert_eq!(schema.options.wildcard_match, WildcardMatch::Exact);
}

#[test]
fn options_default_when_absent() {
    let schema = parse_schema("rules:\n  name: required\n").unwrap();
    assert_eq!(schema.options, fieldrules::Options::default());
    assert!(schema.messages.is_empty());
}

#[test]
fn json_documents_are_accepted() {
    let schema = parse_schema(r#"{"rules": {"name": "required"}, "messages": null}"#).unwrap();
    assert_eq!(schema.rules.len(), 1);
}

#[test]
fn unknown_top_level_field() {
    let err = parse_schema("rules:\n  name: required\nmesages:\n  name.required: x\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.path.as_deref(), Some("mesages"));
}

#[test]
fn missing_rules() {
    let err = parse_schema("messages:\n  name.required: x\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert_eq!(err.path.as_deref(), Some("rules"));
}

#[test]
fn rules_must_be_a_mapping() {
    let err = parse_schema("rules: required\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert_eq!(err.path.as_deref(), Some("rules"));
}

#[test]
fn non_string_rule_leaf() {
    let err = parse_schema("rules:\n  user:\n    age: 5\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert_eq!(err.path.as_deref(), Some("rules.user.age"));
    assert!(err.to_string().starts_with("rules.user.age: "));
}

#[test]
fn non_string_message_leaf() {
    let err = parse_schema("rules:\n  a: required\nmessages:\n  a.required: [x]\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert_eq!(err.path.as_deref(), Some("messages.a.required"));
}

#[test]
fn unknown_option_variant() {
    let err = parse_schema("rules:\n  a: required\noptions:\n  failure_policy: sometimes\n")
        .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownVariant);
    assert_eq!(err.path.as_deref(), Some("options"));
}

#[test]
fn unknown_option_field() {
    let err = parse_schema("rules:\n  a: required\noptions:\n  strict: true\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownField);
    assert_eq!(err.path.as_deref(), Some("options"));
}

#[test]
fn empty_input_is_a_syntax_error() {
    assert_eq!(parse_schema("").unwrap_err().kind, ParseErrorKind::Syntax);
    assert_eq!(parse_record("   \n").unwrap_err().kind, ParseErrorKind::Syntax);
}

#[test]
fn malformed_yaml_is_a_syntax_error() {
    let err = parse_record("a: [1, 2\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn record_root_must_be_a_mapping() {
    let err = parse_record("- a\n- b\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert!(err.path.is_none());
}

#[test]
fn record_loads_nested_values() {
    let record = parse_record("user:\n  name: ada\n  age: 36\n").unwrap();
    assert_eq!(record, json!({ "user": { "name": "ada", "age": 36 } }));
}

#[test]
fn check_reports_which_document_failed() {
    let schema = "rules:\n  name: required\n";

    match fieldrules::check("", schema) {
        Err(FieldrulesError::Record(e)) => assert_eq!(e.kind, ParseErrorKind::Syntax),
        other => panic!("expected a record error, got {:?}", other),
    }

    match fieldrules::check("name: x\n", "rules: []\n") {
        Err(FieldrulesError::Schema(e)) => assert_eq!(e.kind, ParseErrorKind::TypeMismatch),
        other => panic!("expected a schema error, got {:?}", other),
    }

    let err = fieldrules::check("name: x\n", "other: 1\n").unwrap_err();
    assert!(err.to_string().starts_with("Schema error: "));
}
