//! Rule dispatch and verdict folding.

use crate::enums::MessagePolicy;
use crate::options::Options;
use crate::path::{FlatMap, flatten};
use crate::rules::{RuleContext, lookup_rule};
use crate::types::{
    FieldResult, MessageTable, RuleOutcome, RuleTable, VALID_KEY, ValidationResult, rule_key,
};
use crate::wildcard::{backfill_missing, expand_messages, expand_rules};
use serde_json::Value;
use tracing::{debug, debug_span};

static EMPTY: Value = Value::String(String::new());

/// A parsed rule-spec: `name` or `name:args`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSpec<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

impl<'a> RuleSpec<'a> {
    /// Splits on the first `:`; the argument string keeps any later colons.
    /// Surrounding whitespace of the whole spec is ignored.
    pub fn parse(spec: &'a str) -> Self {
        let spec = spec.trim();
        match spec.split_once(':') {
            Some((name, args)) => RuleSpec { name, args },
            None => RuleSpec {
                name: spec,
                args: "",
            },
        }
    }
}

/// Full pipeline over owned declaration tables: flatten, backfill, expand,
/// evaluate.
pub(crate) fn run(
    record: &Value,
    mut rules: RuleTable,
    mut messages: MessageTable,
    options: &Options,
) -> ValidationResult {
    let mut form = flatten(record);

    let span = debug_span!("validate", fields = form.len(), declarations = rules.len());
    let _enter = span.enter();

    backfill_missing(&mut form, &rules);
    expand_rules(&mut rules, &form, options.wildcard_match);
    expand_messages(&mut messages, &form, options.wildcard_match);

    let result = evaluate(&form, &rules, &messages, options);
    debug!(valid = result.valid, evaluated = result.fields.len(), "validation finished");
    result
}

/// Evaluates already-expanded declarations against a flattened record.
///
/// Fields whose rules are all unknown produce no [`FieldResult`]. The empty
/// path and the reserved `valid` path are skipped.
pub fn evaluate(
    form: &FlatMap,
    rules: &RuleTable,
    messages: &MessageTable,
    options: &Options,
) -> ValidationResult {
    let mut valid = true;
    let mut fields = Vec::new();

    for (path, specs) in rules.iter() {
        if path.is_empty() || path == VALID_KEY {
            continue;
        }

        let value = form.get(path).unwrap_or(&EMPTY);
        let mut outcomes: Vec<RuleOutcome> = Vec::new();

        for spec in specs {
            let spec = RuleSpec::parse(spec);
            if spec.name.is_empty() {
                continue;
            }
            let Some(entry) = lookup_rule(spec.name) else {
                debug!(path, rule = spec.name, "skipping unknown rule");
                continue;
            };

            let occurrence = outcomes.iter().filter(|o| o.rule == spec.name).count();
            let ctx = RuleContext {
                value,
                args: spec.args,
                form,
                key: path,
                numeric: options.numeric,
            };
            let passed = (entry.predicate)(&ctx);

            let mut counted = false;
            let mut message = None;
            if !passed {
                counted = options.failure_policy.counts(value, spec.name);
                if counted {
                    valid = false;
                }

                let accepts_message = match options.message_policy {
                    MessagePolicy::PerRule => true,
                    MessagePolicy::FirstPerField => outcomes.iter().all(|o| o.message.is_none()),
                };
                if accepts_message {
                    message = messages
                        .message_for(path, &rule_key(spec.name, occurrence))
                        .map(str::to_string);
                }
            }

            outcomes.push(RuleOutcome {
                rule: spec.name.to_string(),
                occurrence,
                passed,
                counted,
                message,
            });
        }

        if !outcomes.is_empty() {
            fields.push(FieldResult {
                path: path.to_string(),
                outcomes,
            });
        }
    }

    ValidationResult { valid, fields }
}
