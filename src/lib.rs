//! Declarative field validation for nested records.
//!
//! A record is checked against a parallel declaration of pipe-delimited rule
//! strings, with optional custom failure messages. Every declared field gets
//! a per-rule pass/fail map, configured messages for its failures, and the
//! whole record gets a single `valid` verdict:
//!
//! ```text
//! record ─┐
//! rules  ─┼→ flatten → backfill → expand wildcards → evaluate → unflatten → result
//! messages┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//!
//! let record = json!({
//!     "user": { "name": "mikkjal", "email": "not-an-email" },
//!     "tags": { "a": "x", "b": "" },
//! });
//! let rules = json!({
//!     "user": { "name": "required|min:3", "email": "required|email" },
//!     "tags.*": "required",
//! });
//! let messages = json!({ "user.email.email": "Email must be valid" });
//!
//! let result = fieldrules::validate(&record, &rules, Some(&messages));
//! assert!(!result.valid);
//!
//! let nested = result.to_value();
//! assert_eq!(nested["user"]["email"]["email"], json!(false));
//! assert_eq!(nested["user"]["email"]["messages"], json!(["Email must be valid"]));
//! assert_eq!(nested["tags"]["b"]["required"], json!(false));
//! ```
//!
//! # Rule strings
//!
//! A field declares `"name"` or `"name:args"` specs joined by `|`, or a list
//! of specs when an argument itself contains `|` (e.g. a regex alternation).
//! Unknown rule names are ignored. Repeating a rule on one field yields
//! result keys `rule`, `rule1`, `rule2`, …, and messages are addressed as
//! `path.ruleKey`. See [`rules::RULE_REGISTRY`] for the catalogue.

pub mod enums;
pub mod error;
pub mod execute;
pub mod options;
pub mod parse;
pub mod path;
pub mod rules;
pub mod serialize;
pub mod types;
pub mod wildcard;

pub use error::*;
pub use options::Options;
pub use types::*;

pub use parse::{parse_record, parse_schema};

use serde_json::Value;

/// Validates `record` against `rules` and optional `messages` with the
/// default [`Options`].
///
/// Never fails: unknown rules are ignored and malformed rule arguments make
/// the affected rule fail. The inputs are not modified.
pub fn validate(record: &Value, rules: &Value, messages: Option<&Value>) -> ValidationResult {
    validate_with(record, rules, messages, &Options::default())
}

/// Like [`validate`], with explicit engine options.
pub fn validate_with(
    record: &Value,
    rules: &Value,
    messages: Option<&Value>,
    options: &Options,
) -> ValidationResult {
    let rules = RuleTable::from_declaration(rules);
    let messages = messages
        .map(MessageTable::from_declaration)
        .unwrap_or_default();
    execute::run(record, rules, messages, options)
}

/// Convenience entry point composing `parse_record` → `parse_schema` →
/// [`Schema::validate`].
///
/// # Errors
///
/// Returns [`FieldrulesError::Record`] or [`FieldrulesError::Schema`] when the
/// corresponding document cannot be loaded.
///
/// # Example
///
/// ```rust
/// let record = "name: ''\nemail: someone@example.com\n";
/// let schema = r#"
/// rules:
///   name: required
///   email: required|email
/// messages:
///   name.required: Name is required
/// "#;
///
/// let result = fieldrules::check(record, schema).expect("documents load");
/// assert!(!result.valid);
/// assert_eq!(result.field("name").unwrap().messages(), vec!["Name is required"]);
/// ```
pub fn check(record: &str, schema: &str) -> Result<ValidationResult, FieldrulesError> {
    let record = parse::parse_record(record).map_err(FieldrulesError::Record)?;
    let schema = parse::parse_schema(schema).map_err(FieldrulesError::Schema)?;
    Ok(schema.validate(&record))
}
