//! Built-in rule catalogue.
//!
//! Every rule is a pure predicate over a [`RuleContext`]. Malformed arguments
//! (bad regexes, unparsable dates or bounds) make the predicate return `false`
//! instead of raising.

use crate::enums::NumericMode;
use crate::path::FlatMap;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
    .unwrap()
});

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").unwrap());

static MAC_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}|(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}|(?:[0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4})$",
    )
    .unwrap()
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[-a-z0-9@:%_+.~#?&/=]{2,256}\.[a-z]{2,63}(?::\d{1,5})?(?:[/?#][-a-z0-9@:%_+.~#?&/=]*)?$",
    )
    .unwrap()
});

static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])$",
    )
    .unwrap()
});

static UUID_V4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap()
});

// ─── Registry ───────────────────────────────────────────────────────────────

/// Everything a predicate may look at.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    /// Current value of the field; the empty string for backfilled fields.
    pub value: &'a Value,
    /// Argument string after the first `:`, empty when none was given.
    pub args: &'a str,
    /// The whole flattened record, for cross-field rules.
    pub form: &'a FlatMap,
    /// The field's own path.
    pub key: &'a str,
    /// Calibration for the `numeric` rule.
    pub numeric: NumericMode,
}

pub type RulePredicate = fn(&RuleContext<'_>) -> bool;

/// An entry in the rule registry.
#[derive(Clone, Copy, Debug)]
pub struct RuleEntry {
    pub name: &'static str,
    pub predicate: RulePredicate,
}

const fn rule(name: &'static str, predicate: RulePredicate) -> RuleEntry {
    RuleEntry { name, predicate }
}

/// The built-in rule catalogue, sorted by name.
pub static RULE_REGISTRY: &[RuleEntry] = &[
    rule("after", after),
    rule("ascii", ascii),
    rule("before", before),
    rule("between", between),
    rule("confirmed", confirmed),
    rule("date", date),
    rule("different", different),
    rule("email", email),
    rule("ends_with", ends_with),
    rule("hex", hex),
    rule("in", in_list),
    rule("ip", ip),
    rule("json", json),
    rule("mac_address", mac_address),
    rule("max", max),
    rule("min", min),
    rule("not_in", not_in),
    rule("not_regex", not_regex),
    rule("numeric", numeric),
    rule("regex", regex),
    rule("required", required),
    rule("required_with", required_with),
    rule("required_with_all", required_with_all),
    rule("required_without", required_without),
    rule("required_without_all", required_without_all),
    rule("same", same),
    rule("starts_with", starts_with),
    rule("url", url),
    rule("uuid", uuid),
];

/// Look up a rule by name.
pub fn lookup_rule(name: &str) -> Option<&'static RuleEntry> {
    RULE_REGISTRY
        .binary_search_by(|entry| entry.name.cmp(name))
        .ok()
        .map(|i| &RULE_REGISTRY[i])
}

// ─── Value coercion ─────────────────────────────────────────────────────────

/// Presence test shared by `required`, the `required_with*` family and the
/// failure policy.
///
/// `null`, `false`, zero, the empty string and the empty array are absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Text form of a value as seen by the string-oriented rules.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| value_text(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Numeric form of a value: JSON numbers and strings holding a finite number.
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Size used by `min`, `max` and `between` for non-numeric values.
fn value_len(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => value_text(other).chars().count(),
    }
}

/// Loose equality between a field and a possibly missing other field.
///
/// A missing field only equals `null`. Numbers compare numerically against
/// numeric strings, booleans compare as 1 and 0.
pub fn loose_equal(left: &Value, right: Option<&Value>) -> bool {
    let Some(right) = right else {
        return left.is_null();
    };

    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(_) | Value::Bool(_), _) | (_, Value::Number(_) | Value::Bool(_)) => {
            match (loose_number(left), loose_number(right)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => left == right,
    }
}

fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => value_number(other),
    }
}

/// Parses a value into a UTC instant.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD`, `YYYY/MM/DD`, written-out dates
/// such as `March 7, 2020`, date-times without a zone (read as UTC) and
/// non-zero JSON numbers as epoch milliseconds. The number `0` is an absent
/// value, not the epoch.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .filter(|millis| *millis != 0)
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_date_text(s),
        _ => None,
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Compiles a `regex:` argument, stripping optional `/…/flags` delimiters.
fn compile_pattern(args: &str) -> Option<Regex> {
    let (pattern, flags) = split_delimited(args);
    let source = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", flags, pattern)
    };

    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            debug!(pattern = %args, error = %e, "regex argument failed to compile");
            None
        }
    }
}

fn split_delimited(args: &str) -> (&str, &str) {
    let Some(rest) = args.strip_prefix('/') else {
        return (args, "");
    };
    if let Some(end) = rest.rfind('/') {
        let flags = &rest[end + 1..];
        if flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x')) {
            return (&rest[..end], flags);
        }
    }
    (rest, "")
}

fn field_present(form: &FlatMap, field: &str) -> bool {
    form.get(field).is_some_and(is_truthy)
}

fn compare_size(ctx: &RuleContext<'_>, bound: &str, cmp: fn(f64, f64) -> bool) -> bool {
    let Some(bound) = parse_number(bound) else {
        return false;
    };
    match value_number(ctx.value) {
        Some(n) => cmp(n, bound),
        None => cmp(value_len(ctx.value) as f64, bound),
    }
}

fn compare_dates(ctx: &RuleContext<'_>, cmp: fn(DateTime<Utc>, DateTime<Utc>) -> bool) -> bool {
    match (parse_date(ctx.value), parse_date_text(ctx.args)) {
        (Some(value), Some(reference)) => cmp(value, reference),
        _ => false,
    }
}

// ─── Predicates ─────────────────────────────────────────────────────────────

fn after(ctx: &RuleContext<'_>) -> bool {
    compare_dates(ctx, |value, reference| value > reference)
}

fn ascii(ctx: &RuleContext<'_>) -> bool {
    value_text(ctx.value).is_ascii()
}

fn before(ctx: &RuleContext<'_>) -> bool {
    compare_dates(ctx, |value, reference| value < reference)
}

fn between(ctx: &RuleContext<'_>) -> bool {
    let Some((low, high)) = ctx.args.split_once(',') else {
        return false;
    };
    compare_size(ctx, low, |v, b| v >= b) && compare_size(ctx, high, |v, b| v <= b)
}

fn confirmed(ctx: &RuleContext<'_>) -> bool {
    let confirmation = format!("{}_confirmation", ctx.key);
    loose_equal(ctx.value, ctx.form.get(&confirmation))
}

fn date(ctx: &RuleContext<'_>) -> bool {
    parse_date(ctx.value).is_some()
}

fn different(ctx: &RuleContext<'_>) -> bool {
    !same(ctx)
}

fn email(ctx: &RuleContext<'_>) -> bool {
    EMAIL_RE.is_match(&value_text(ctx.value))
}

fn ends_with(ctx: &RuleContext<'_>) -> bool {
    value_text(ctx.value).ends_with(ctx.args)
}

fn hex(ctx: &RuleContext<'_>) -> bool {
    HEX_COLOR_RE.is_match(&value_text(ctx.value))
}

fn in_list(ctx: &RuleContext<'_>) -> bool {
    let text = value_text(ctx.value);
    ctx.args.split(',').any(|item| item == text)
}

// Dotted quads; octets may carry leading zeros (`010.0.0.1`).
fn ip(ctx: &RuleContext<'_>) -> bool {
    IPV4_RE.is_match(&value_text(ctx.value))
}

fn json(ctx: &RuleContext<'_>) -> bool {
    serde_json::from_str::<Value>(&value_text(ctx.value)).is_ok()
}

fn mac_address(ctx: &RuleContext<'_>) -> bool {
    MAC_ADDRESS_RE.is_match(&value_text(ctx.value))
}

fn max(ctx: &RuleContext<'_>) -> bool {
    compare_size(ctx, ctx.args, |v, b| v <= b)
}

fn min(ctx: &RuleContext<'_>) -> bool {
    compare_size(ctx, ctx.args, |v, b| v >= b)
}

fn not_in(ctx: &RuleContext<'_>) -> bool {
    !in_list(ctx)
}

fn not_regex(ctx: &RuleContext<'_>) -> bool {
    !regex(ctx)
}

fn numeric(ctx: &RuleContext<'_>) -> bool {
    match ctx.numeric {
        NumericMode::Digits => {
            let text = value_text(ctx.value);
            !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
        }
        NumericMode::Number => value_number(ctx.value).is_some(),
    }
}

fn regex(ctx: &RuleContext<'_>) -> bool {
    match compile_pattern(ctx.args) {
        Some(re) => re.is_match(&value_text(ctx.value)),
        None => false,
    }
}

fn required(ctx: &RuleContext<'_>) -> bool {
    is_truthy(ctx.value)
}

// Passes unless the field is empty while any listed field is present.
fn required_with(ctx: &RuleContext<'_>) -> bool {
    if is_truthy(ctx.value) {
        return true;
    }
    !ctx.args.split(',').any(|field| field_present(ctx.form, field))
}

// Passes unless the field is empty while every listed field is present.
fn required_with_all(ctx: &RuleContext<'_>) -> bool {
    if is_truthy(ctx.value) {
        return true;
    }
    !ctx.args.split(',').all(|field| field_present(ctx.form, field))
}

fn required_without(ctx: &RuleContext<'_>) -> bool {
    !required_with(ctx)
}

fn required_without_all(ctx: &RuleContext<'_>) -> bool {
    !required_with_all(ctx)
}

fn same(ctx: &RuleContext<'_>) -> bool {
    loose_equal(ctx.value, ctx.form.get(ctx.args))
}

fn starts_with(ctx: &RuleContext<'_>) -> bool {
    value_text(ctx.value).starts_with(ctx.args)
}

fn url(ctx: &RuleContext<'_>) -> bool {
    URL_RE.is_match(&value_text(ctx.value))
}

fn uuid(ctx: &RuleContext<'_>) -> bool {
    UUID_V4_RE.is_match(&value_text(ctx.value))
}
