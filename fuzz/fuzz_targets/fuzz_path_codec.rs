#![no_main]

use fieldrules::path::{flatten, unflatten};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

/// Path segments never contain `.`; records breaking that are out of scope.
fn has_dotted_key(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k.contains('.') || has_dotted_key(v)),
        _ => false,
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(record) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    if has_dotted_key(&record) {
        return;
    }

    let flat = flatten(&record);
    let rebuilt = unflatten(&flat);

    // Flattening the rebuilt record must reach the same leaves.
    if flatten(&rebuilt) != flat {
        panic!(
            "Path codec failure: flatten(unflatten(flat)) != flat\nflat: {:?}\nrebuilt: {}",
            flat, rebuilt
        );
    }
});
