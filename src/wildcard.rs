//! Wildcard expansion of rule and message declarations.
//!
//! A declared path containing `*` is a pattern, never a field. Each pattern is
//! compiled once into a [`WildcardPattern`] and then applied to the concrete
//! paths of the flattened record. Under [`WildcardMatch::Prefix`] the pattern
//! only has to cover a leading part of the path; under
//! [`WildcardMatch::Exact`] it has to cover all of it:
//!
//! | Pattern          | Exact                                | Prefix also           |
//! |------------------|--------------------------------------|-----------------------|
//! | `items.*`        | `items.a`, `items.a.b`               |                       |
//! | `users.*.email`  | `users.1.email`, `users.x.y.email`   | `users.1.email_sent`  |
//! | `*email`         | `email`, `user.email`, `work_email`  | `email_confirmation`  |
//! | `*.email`        | `email`, `user.email`                | `user.emails`         |
//! | `user*.name`     | `user.name`, `users.name`            | `users.name.first`    |

use crate::enums::WildcardMatch;
use crate::path::FlatMap;
use crate::types::{MessageTable, RuleTable, VALID_KEY};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

/// Whether a declared path is a pattern rather than a concrete field.
pub fn is_wildcard(path: &str) -> bool {
    path.contains('*')
}

/// A compiled wildcard path.
#[derive(Clone, Debug)]
pub struct WildcardPattern {
    source: String,
    matcher: Regex,
}

impl WildcardPattern {
    /// Compiles `pattern`. Returns `None` if it contains no `*`.
    pub fn compile(pattern: &str, mode: WildcardMatch) -> Option<Self> {
        if !is_wildcard(pattern) {
            return None;
        }
        let matcher = Regex::new(&pattern_regex(pattern, mode)).ok()?;
        Some(WildcardPattern {
            source: pattern.to_string(),
            matcher,
        })
    }

    /// Whether `path` is one of the concrete paths this pattern denotes. The
    /// pattern's own literal text never matches.
    pub fn matches(&self, path: &str) -> bool {
        path != self.source && self.matcher.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Concrete paths of `form` matched by this pattern, in form order.
    pub fn matching_paths<'a>(&'a self, form: &'a FlatMap) -> impl Iterator<Item = &'a str> {
        form.keys()
            .map(String::as_str)
            .filter(move |path| self.matches(path))
    }
}

fn pattern_regex(pattern: &str, mode: WildcardMatch) -> String {
    let segments: Vec<&str> = pattern.split('.').collect();
    let mut out = String::from("^");

    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();

        if i == 0 && *segment == "*" && !last {
            // Optional leading path, separator included.
            out.push_str(r"(?:.*\.)?");
            continue;
        }

        if i == 0
            && let Some(rest) = segment.strip_prefix('*')
        {
            out.push_str(".*");
            out.push_str(&segment_regex(rest));
        } else if *segment == "*" {
            out.push_str(r"[^.]+(?:\.[^.]+)*");
        } else {
            out.push_str(&segment_regex(segment));
        }

        if !last {
            out.push_str(r"\.");
        }
    }

    if mode == WildcardMatch::Exact {
        out.push('$');
    }
    out
}

fn segment_regex(segment: &str) -> String {
    segment
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("[^.]*")
}

/// Inserts an empty string into `form` for every concrete declared path the
/// record lacks, so presence rules still fire on missing fields.
pub fn backfill_missing(form: &mut FlatMap, rules: &RuleTable) {
    for (path, _) in rules.iter() {
        if is_wildcard(path) || path.is_empty() || path == VALID_KEY || form.contains_key(path) {
            continue;
        }
        form.insert(path.to_string(), Value::String(String::new()));
    }
}

/// Replaces every wildcard rule declaration by the concrete paths it matches.
///
/// Wildcard rule-specs are appended after any rules already declared for the
/// concrete path. Pattern entries are removed even when they match nothing.
pub fn expand_rules(rules: &mut RuleTable, form: &FlatMap, mode: WildcardMatch) {
    let patterns: Vec<String> = rules
        .iter()
        .map(|(path, _)| path)
        .filter(|path| is_wildcard(path))
        .map(str::to_string)
        .collect();

    for key in patterns {
        let Some(specs) = rules.remove(&key) else {
            continue;
        };
        if specs.is_empty() {
            continue;
        }
        let Some(pattern) = WildcardPattern::compile(&key, mode) else {
            continue;
        };
        for path in pattern.matching_paths(form) {
            trace!(pattern = %key, path, "wildcard rules expanded");
            rules.append(path, &specs);
        }
    }
}

/// Replaces every wildcard message declaration by `concretePath.rule` entries.
///
/// The last segment of a message key names the rule, everything before it is
/// the path pattern. Explicitly declared messages are never overwritten.
pub fn expand_messages(messages: &mut MessageTable, form: &FlatMap, mode: WildcardMatch) {
    let patterns: Vec<String> = messages
        .iter()
        .map(|(path, _)| path)
        .filter(|path| is_wildcard(path))
        .map(str::to_string)
        .collect();

    for key in patterns {
        let Some(message) = messages.remove(&key) else {
            continue;
        };
        if message.is_empty() {
            continue;
        }
        let Some((path_pattern, rule)) = key.rsplit_once('.') else {
            debug!(key = %key, "wildcard message key names no rule");
            continue;
        };
        let Some(pattern) = WildcardPattern::compile(path_pattern, mode) else {
            debug!(key = %key, "wildcard message key has no wildcard path");
            continue;
        };
        for path in pattern.matching_paths(form) {
            let concrete = format!("{}.{}", path, rule);
            if messages.contains_key(&concrete) {
                continue;
            }
            trace!(pattern = %key, path = %concrete, "wildcard message expanded");
            messages.insert(concrete, message.clone());
        }
    }
}
