#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let Ok(schema) = fieldrules::parse_schema(&s) else {
        return;
    };

    let record = serde_json::json!({ "name": "fuzz", "nested": { "value": 1 } });
    let result = schema.validate(&record);
    let _ = fieldrules::serialize::to_json(&result, false);
});
