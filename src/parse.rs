use crate::error::{ParseError, ParseErrorKind};
use crate::options::Options;
use crate::types::{MessageTable, RuleTable, Schema};
use serde_json::Value;

/// Parse a YAML (or JSON) schema document.
///
/// The root must be a mapping with a `rules` mapping and optional `messages`
/// mapping and `options` mapping. Rule leaves must be strings or lists of
/// strings and message leaves must be strings.
pub fn parse_schema(input: &str) -> Result<Schema, ParseError> {
    let value = parse_mapping(input, "schema")?;
    let Some(obj) = value.as_object() else {
        return Err(root_error("schema"));
    };

    for key in obj.keys() {
        match key.as_str() {
            "rules" | "messages" | "options" => {}
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownField,
                    format!("unknown top-level field: {}", other),
                )
                .at(other));
            }
        }
    }

    let rules = match obj.get("rules") {
        Some(decl @ Value::Object(_)) => RuleTable::try_from_declaration(decl)?,
        Some(_) => return Err(mapping_error("rules")),
        None => {
            return Err(ParseError::new(
                ParseErrorKind::TypeMismatch,
                "missing required field: rules",
            )
            .at("rules"));
        }
    };

    let messages = match obj.get("messages") {
        None | Some(Value::Null) => MessageTable::new(),
        Some(decl @ Value::Object(_)) => MessageTable::try_from_declaration(decl)?,
        Some(_) => return Err(mapping_error("messages")),
    };

    let options: Options = match obj.get("options") {
        None | Some(Value::Null) => Options::default(),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            let msg = e.to_string();
            ParseError::new(classify_json_error(&msg), msg).at("options")
        })?,
    };

    Ok(Schema {
        rules,
        messages,
        options,
    })
}

/// Parse a YAML (or JSON) record. The root must be a mapping.
pub fn parse_record(input: &str) -> Result<Value, ParseError> {
    parse_mapping(input, "record")
}

fn parse_mapping(input: &str, what: &str) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, "empty input"));
    }

    let value: Value = serde_saphyr::from_str(input)
        .map_err(|e| ParseError::new(ParseErrorKind::Syntax, e.to_string()))?;

    if !value.is_object() {
        return Err(root_error(what));
    }
    Ok(value)
}

fn root_error(what: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::TypeMismatch,
        format!("{} root must be a mapping", what),
    )
}

fn mapping_error(field: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::TypeMismatch,
        format!("{} must be a mapping", field),
    )
    .at(field)
}

fn classify_json_error(msg: &str) -> ParseErrorKind {
    if msg.contains("unknown variant") {
        ParseErrorKind::UnknownVariant
    } else if msg.contains("unknown field") {
        ParseErrorKind::UnknownField
    } else {
        ParseErrorKind::TypeMismatch
    }
}
