//! Closed enumerations selecting engine policies.
//!
//! The defaults form the canonical contract. The alternatives reproduce the
//! stricter behaviours some callers depend on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::is_truthy;

/// Which failing rules make the overall verdict invalid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A failure counts when the field holds a value or the rule belongs to
    /// the `required` family. Absent optional fields never fail format rules.
    #[default]
    PresentOrRequired,
    /// Every failing rule counts.
    Unconditional,
}

impl FailurePolicy {
    /// Whether a failure of `rule` on `value` invalidates the whole result.
    pub fn counts(self, value: &Value, rule: &str) -> bool {
        match self {
            FailurePolicy::PresentOrRequired => is_truthy(value) || rule.contains("required"),
            FailurePolicy::Unconditional => true,
        }
    }
}

/// How configured failure messages accumulate on a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePolicy {
    /// Each failing rule with a configured message contributes it.
    #[default]
    PerRule,
    /// Only the first configured message of a field is kept.
    FirstPerField,
}

/// Calibration of the `numeric` rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericMode {
    /// ASCII digits only: `"42"` passes, `"4.2"` and `"-1"` fail.
    #[default]
    Digits,
    /// Any finite number, including signs, decimals and exponents.
    Number,
}

/// How far a wildcard pattern has to reach along a concrete path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardMatch {
    /// The pattern has to match a leading part of the path: `*email` also
    /// covers `email_confirmation` and `users.*.email` covers
    /// `users.1.email_verified`.
    #[default]
    Prefix,
    /// The pattern has to match the whole path.
    Exact,
}
