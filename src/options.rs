use serde::{Deserialize, Serialize};

use crate::enums::{FailurePolicy, MessagePolicy, NumericMode, WildcardMatch};

/// Engine configuration.
///
/// Every field is optional when deserialized; missing fields take the
/// canonical defaults. Unknown fields are rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub failure_policy: FailurePolicy,
    pub message_policy: MessagePolicy,
    pub numeric: NumericMode,
    pub wildcard_match: WildcardMatch,
}
