#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the split between the record and the rule declaration.
    let split = (data[0] as usize % (data.len() - 1)) + 1;
    let (record_bytes, rules_bytes) = data[1..].split_at(split - 1);

    let (Ok(record), Ok(rules)) = (
        serde_json::from_slice::<Value>(record_bytes),
        serde_json::from_slice::<Value>(rules_bytes),
    ) else {
        return;
    };

    let snapshot = record.clone();
    let first = fieldrules::validate(&record, &rules, Some(&rules));
    let second = fieldrules::validate(&record, &rules, Some(&rules));

    assert_eq!(record, snapshot, "validate mutated its input");
    assert_eq!(first, second, "validate is not deterministic");
    let _ = first.to_value();
});
