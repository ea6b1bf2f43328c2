use super::strategies::{arb_json, arb_record};
use fieldrules::path::{flatten, unflatten};
use proptest::prelude::*;
use serde_json::Value;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Keys never contain dots, so unflatten inverts flatten exactly.
    #[test]
    fn unflatten_inverts_flatten(record in arb_record()) {
        let flat = flatten(&record);
        prop_assert_eq!(unflatten(&flat), record);
    }

    // Flat leaves are never objects.
    #[test]
    fn flatten_has_no_object_leaves(record in arb_record()) {
        let flat = flatten(&record);
        prop_assert!(!flat.is_empty());
        for (path, leaf) in &flat {
            prop_assert!(!leaf.is_object(), "object leaf at {}", path);
            prop_assert!(!path.is_empty());
        }
    }

    #[test]
    fn flatten_is_idempotent(record in arb_record()) {
        let flat = flatten(&record);
        let again = flatten(&Value::Object(flat.clone()));
        prop_assert_eq!(again, flat);
    }

    // Non-object roots have no fields.
    #[test]
    fn scalar_roots_flatten_to_nothing(value in arb_json(2)) {
        prop_assume!(!value.is_object());
        prop_assert!(flatten(&value).is_empty());
    }
}
