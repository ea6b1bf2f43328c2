use fieldrules::enums::WildcardMatch;
use fieldrules::path::{FlatMap, flatten};
use fieldrules::types::{MessageTable, RuleTable};
use fieldrules::wildcard::{
    WildcardPattern, backfill_missing, expand_messages, expand_rules, is_wildcard,
};
use serde_json::{Value, json};

// ─── Pattern matching ────────────────────────────────────────────────────────

struct MatchCase {
    pattern: &'static str,
    path: &'static str,
    exact: bool,
    prefix: bool,
}

const MATCH_CASES: &[MatchCase] = &[
    MatchCase { pattern: "items.*", path: "items.a", exact: true, prefix: true },
    MatchCase { pattern: "items.*", path: "items.a.b", exact: true, prefix: true },
    MatchCase { pattern: "items.*", path: "items", exact: false, prefix: false },
    MatchCase { pattern: "items.*", path: "itemsx.a", exact: false, prefix: false },
    MatchCase { pattern: "items.*", path: "other.items.a", exact: false, prefix: false },
    MatchCase { pattern: "users.*.email", path: "users.1.email", exact: true, prefix: true },
    MatchCase { pattern: "users.*.email", path: "users.x.y.email", exact: true, prefix: true },
    MatchCase { pattern: "users.*.email", path: "users.email", exact: false, prefix: false },
    MatchCase { pattern: "users.*.email", path: "users.1.email_confirmation", exact: false, prefix: true },
    MatchCase { pattern: "*email", path: "email", exact: true, prefix: true },
    MatchCase { pattern: "*email", path: "user.email", exact: true, prefix: true },
    MatchCase { pattern: "*email", path: "work_email", exact: true, prefix: true },
    MatchCase { pattern: "*email", path: "email_confirmation", exact: false, prefix: true },
    MatchCase { pattern: "*email", path: "emailAddress", exact: false, prefix: true },
    MatchCase { pattern: "*email", path: "name", exact: false, prefix: false },
    MatchCase { pattern: "*.email", path: "email", exact: true, prefix: true },
    MatchCase { pattern: "*.email", path: "user.email", exact: true, prefix: true },
    MatchCase { pattern: "*.email", path: "user.emails", exact: false, prefix: true },
    MatchCase { pattern: "*.email", path: "workemail", exact: false, prefix: false },
    MatchCase { pattern: "*", path: "anything.at.all", exact: true, prefix: true },
    MatchCase { pattern: "user*.name", path: "users.name", exact: true, prefix: true },
    MatchCase { pattern: "user*.name", path: "users.name.first", exact: false, prefix: true },
    MatchCase { pattern: "user*.name", path: "user.x.name", exact: false, prefix: false },
    MatchCase { pattern: "a+b.*", path: "a+b.c", exact: true, prefix: true },
    MatchCase { pattern: "a+b.*", path: "aab.c", exact: false, prefix: false },
];

#[test]
fn wildcard_pattern_table() {
    let mut failed = 0;
    for case in MATCH_CASES {
        for (mode, expected) in [
            (WildcardMatch::Exact, case.exact),
            (WildcardMatch::Prefix, case.prefix),
        ] {
            let pattern = WildcardPattern::compile(case.pattern, mode).expect("pattern compiles");
            let result = pattern.matches(case.path);
            if result != expected {
                eprintln!(
                    "  FAIL {} vs {} ({:?}): expected {}, got {}",
                    case.pattern, case.path, mode, expected, result
                );
                failed += 1;
            }
        }
    }
    assert_eq!(failed, 0, "{} wildcard match cases failed", failed);
}

#[test]
fn concrete_paths_do_not_compile() {
    assert!(WildcardPattern::compile("user.email", WildcardMatch::Prefix).is_none());
    assert!(!is_wildcard("user.email"));
    assert!(is_wildcard("user.*"));
}

#[test]
fn pattern_never_matches_its_own_text() {
    for mode in [WildcardMatch::Prefix, WildcardMatch::Exact] {
        let pattern = WildcardPattern::compile("items.*", mode).unwrap();
        assert!(!pattern.matches("items.*"));
        assert_eq!(pattern.as_str(), "items.*");
    }
}

// ─── Backfill and expansion ─────────────────────────────────────────────────

fn form_of(record: Value) -> FlatMap {
    flatten(&record)
}

#[test]
fn backfill_adds_missing_concrete_paths_only() {
    let mut form = form_of(json!({ "present": "x" }));
    let rules = RuleTable::from_declaration(&json!({
        "present": "required",
        "missing": "required",
        "list.*": "required",
        "valid": "required",
    }));

    backfill_missing(&mut form, &rules);

    assert_eq!(form.get("present"), Some(&json!("x")));
    assert_eq!(form.get("missing"), Some(&json!("")));
    assert!(!form.contains_key("list.*"));
    assert!(!form.contains_key("valid"));
}

#[test]
fn expand_rules_removes_patterns_and_appends() {
    let form = form_of(json!({ "items": { "a": 1, "b": 2 }, "other": 3 }));
    let mut rules = RuleTable::from_declaration(&json!({
        "items.a": "required",
        "items.*": "min:1|max:5",
    }));

    expand_rules(&mut rules, &form, WildcardMatch::Prefix);

    assert!(rules.get("items.*").is_none());
    assert_eq!(
        rules.get("items.a").unwrap(),
        &vec!["required".to_string(), "min:1".to_string(), "max:5".to_string()]
    );
    assert_eq!(
        rules.get("items.b").unwrap(),
        &vec!["min:1".to_string(), "max:5".to_string()]
    );
    assert!(rules.get("other").is_none());
}

#[test]
fn empty_wildcard_rules_are_dropped() {
    let form = form_of(json!({ "items": { "a": 1 } }));
    let mut rules = RuleTable::from_declaration(&json!({ "items.*": "" }));

    expand_rules(&mut rules, &form, WildcardMatch::Prefix);

    assert!(rules.is_empty());
}

#[test]
fn expand_messages_rewrites_to_concrete_rule_keys() {
    let form = form_of(json!({ "test": { "name": "", "email": "" }, "email": "" }));
    let mut messages = MessageTable::from_declaration(&json!({
        "test.*.required": "Required",
        "*email.email": "Bad email",
    }));

    expand_messages(&mut messages, &form, WildcardMatch::Prefix);

    assert_eq!(messages.message_for("test.name", "required"), Some("Required"));
    assert_eq!(messages.message_for("test.email", "required"), Some("Required"));
    assert_eq!(messages.message_for("test.email", "email"), Some("Bad email"));
    assert_eq!(messages.message_for("email", "email"), Some("Bad email"));
    assert_eq!(messages.message_for("email", "required"), None);
    assert!(messages.get("test.*.required").is_none());
    assert!(messages.get("*email.email").is_none());
}

#[test]
fn message_keys_without_rule_segment_are_dropped() {
    let form = form_of(json!({ "name": "" }));
    let mut messages = MessageTable::from_declaration(&json!({ "*name": "Orphan" }));

    expand_messages(&mut messages, &form, WildcardMatch::Prefix);

    assert!(messages.is_empty());
}

#[test]
fn leading_star_rule_reaches_confirmation_fields() {
    let form = form_of(json!({ "email": "a@b.co", "email_confirmation": "x" }));
    let declaration = json!({ "*email": "email" });

    let mut prefix = RuleTable::from_declaration(&declaration);
    expand_rules(&mut prefix, &form, WildcardMatch::Prefix);
    let paths: Vec<&str> = prefix.iter().map(|(path, _)| path).collect();
    assert_eq!(paths, vec!["email", "email_confirmation"]);

    let mut exact = RuleTable::from_declaration(&declaration);
    expand_rules(&mut exact, &form, WildcardMatch::Exact);
    let paths: Vec<&str> = exact.iter().map(|(path, _)| path).collect();
    assert_eq!(paths, vec!["email"]);
}
