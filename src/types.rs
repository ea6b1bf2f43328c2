//! Declaration tables and validation results.

use crate::error::{ParseError, ParseErrorKind};
use crate::options::Options;
use crate::path::{FlatMap, flatten, unflatten};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Result key holding the overall verdict. Never evaluated as a field path.
pub const VALID_KEY: &str = "valid";

/// Field result key holding the ordered failure messages.
pub const MESSAGES_KEY: &str = "messages";

// ─── Declarations ───────────────────────────────────────────────────────────

/// Insertion-ordered map from dot-path to a declaration entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Table<T> {
    pub fn new() -> Self {
        Table {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&T> {
        self.index.get(path).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Inserts or replaces an entry. Replacing keeps the original position.
    pub fn insert(&mut self, path: impl Into<String>, entry: T) {
        let path = path.into();
        match self.index.get(&path) {
            Some(&i) => self.entries[i].1 = entry,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, entry));
            }
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<T> {
        let i = self.index.remove(path)?;
        let (_, entry) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rule declarations: path → ordered rule-spec strings.
pub type RuleTable = Table<Vec<String>>;

/// Message declarations: `path.ruleKey` → message.
pub type MessageTable = Table<String>;

impl RuleTable {
    /// Builds a rule table from a nested declaration, skipping leaves that are
    /// neither a rule string nor an array of rule strings.
    pub fn from_declaration(declaration: &Value) -> Self {
        let mut table = RuleTable::new();
        for (path, leaf) in flatten(declaration) {
            match rule_specs(&leaf) {
                Ok(specs) => table.insert(path, specs),
                Err(found) => {
                    debug!(path = %path, found, "ignoring rule declaration of unsupported type");
                }
            }
        }
        table
    }

    /// Strict variant of [`RuleTable::from_declaration`] used when loading
    /// schema documents.
    pub fn try_from_declaration(declaration: &Value) -> Result<Self, ParseError> {
        let mut table = RuleTable::new();
        for (path, leaf) in flatten(declaration) {
            let specs = rule_specs(&leaf).map_err(|found| {
                ParseError::new(
                    ParseErrorKind::TypeMismatch,
                    format!("expected a rule string or a list of rule strings, found {}", found),
                )
                .at(format!("rules.{}", path))
            })?;
            table.insert(path, specs);
        }
        Ok(table)
    }

    /// Appends rule-specs after whatever is already declared for `path`.
    pub fn append(&mut self, path: &str, specs: &[String]) {
        match self.index.get(path) {
            Some(&i) => self.entries[i].1.extend_from_slice(specs),
            None => self.insert(path, specs.to_vec()),
        }
    }
}

fn rule_specs(leaf: &Value) -> Result<Vec<String>, &'static str> {
    match leaf {
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(s.split('|').map(str::to_string).collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or(type_name(item)))
            .collect(),
        other => Err(type_name(other)),
    }
}

impl MessageTable {
    /// Builds a message table from a nested declaration, skipping non-string
    /// leaves.
    pub fn from_declaration(declaration: &Value) -> Self {
        let mut table = MessageTable::new();
        for (path, leaf) in flatten(declaration) {
            match leaf {
                Value::String(message) => table.insert(path, message),
                other => {
                    debug!(path = %path, found = type_name(&other), "ignoring non-string message");
                }
            }
        }
        table
    }

    /// Strict variant of [`MessageTable::from_declaration`] used when loading
    /// schema documents.
    pub fn try_from_declaration(declaration: &Value) -> Result<Self, ParseError> {
        let mut table = MessageTable::new();
        for (path, leaf) in flatten(declaration) {
            match leaf {
                Value::String(message) => table.insert(path, message),
                other => {
                    return Err(ParseError::new(
                        ParseErrorKind::TypeMismatch,
                        format!("expected a message string, found {}", type_name(&other)),
                    )
                    .at(format!("messages.{}", path)));
                }
            }
        }
        Ok(table)
    }

    /// Message configured for `rule_key` on `path`, if any.
    pub fn message_for(&self, path: &str, rule_key: &str) -> Option<&str> {
        self.get(&format!("{}.{}", path, rule_key)).map(String::as_str)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

/// A loaded schema document: rules, messages and engine options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    pub rules: RuleTable,
    pub messages: MessageTable,
    pub options: Options,
}

impl Schema {
    /// Validates `record` against this schema. The schema is left untouched
    /// and can be reused.
    pub fn validate(&self, record: &Value) -> ValidationResult {
        crate::execute::run(
            record,
            self.rules.clone(),
            self.messages.clone(),
            &self.options,
        )
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Outcome of one rule applied to one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Registry name of the rule.
    pub rule: String,
    /// How many times the same rule ran earlier on this field.
    pub occurrence: usize,
    pub passed: bool,
    /// Whether this failure invalidated the overall verdict.
    pub counted: bool,
    pub message: Option<String>,
}

impl RuleOutcome {
    /// Result key: `rule` for the first occurrence, then `rule1`, `rule2`, …
    pub fn key(&self) -> String {
        rule_key(&self.rule, self.occurrence)
    }
}

pub(crate) fn rule_key(rule: &str, occurrence: usize) -> String {
    if occurrence == 0 {
        rule.to_string()
    } else {
        format!("{}{}", rule, occurrence)
    }
}

/// All rule outcomes recorded for one concrete path, in evaluation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldResult {
    pub path: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl FieldResult {
    /// Whether every rule on this field passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Looks up an outcome by its result key (`regex`, `regex1`, …).
    pub fn get(&self, key: &str) -> Option<bool> {
        self.outcomes
            .iter()
            .find(|o| o.key() == key)
            .map(|o| o.passed)
    }

    /// Configured failure messages, in the order the rules failed.
    pub fn messages(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| o.message.as_deref())
            .collect()
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for outcome in &self.outcomes {
            map.insert(outcome.key(), Value::Bool(outcome.passed));
        }
        let messages = self.messages();
        if !messages.is_empty() {
            map.insert(
                MESSAGES_KEY.to_string(),
                Value::Array(messages.into_iter().map(Value::from).collect()),
            );
        }
        Value::Object(map)
    }
}

/// The outcome of a validation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub fields: Vec<FieldResult>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn field(&self, path: &str) -> Option<&FieldResult> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Fields with at least one failing rule, whether or not it counted.
    pub fn failed_fields(&self) -> impl Iterator<Item = &FieldResult> {
        self.fields.iter().filter(|f| !f.passed())
    }

    /// Path → messages, for fields that collected at least one message.
    pub fn messages(&self) -> Vec<(&str, Vec<&str>)> {
        self.fields
            .iter()
            .map(|f| (f.path.as_str(), f.messages()))
            .filter(|(_, messages)| !messages.is_empty())
            .collect()
    }

    /// Assembles the nested result record: `valid` at the root and each
    /// field's outcomes at its own path.
    pub fn to_value(&self) -> Value {
        let mut flat = FlatMap::new();
        flat.insert(VALID_KEY.to_string(), Value::Bool(self.valid));
        for field in &self.fields {
            flat.insert(field.path.clone(), field.to_value());
        }
        unflatten(&flat)
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
