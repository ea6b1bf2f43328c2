#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use fieldrules::enums::NumericMode;
use fieldrules::path::FlatMap;
use fieldrules::rules::{RULE_REGISTRY, RuleContext};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

/// Generate a simple arbitrary JSON leaf from fuzzer bytes.
fn arbitrary_value(u: &mut Unstructured<'_>) -> arbitrary::Result<Value> {
    match u.int_in_range(0..=4)? {
        0 => Ok(Value::Null),
        1 => Ok(Value::Bool(bool::arbitrary(u)?)),
        2 => {
            let n = f64::arbitrary(u)?;
            Ok(serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        3 => Ok(Value::String(String::arbitrary(u)?)),
        _ => {
            let len = u.int_in_range(0..=4)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(Value::String(String::arbitrary(u)?));
            }
            Ok(Value::Array(items))
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(index) = u.choose_index(RULE_REGISTRY.len()) else {
        return;
    };
    let (Ok(value), Ok(args), Ok(other)) = (
        arbitrary_value(&mut u),
        String::arbitrary(&mut u),
        arbitrary_value(&mut u),
    ) else {
        return;
    };

    let mut form = FlatMap::new();
    form.insert("field".to_string(), value.clone());
    form.insert(args.clone(), other.clone());
    form.insert("field_confirmation".to_string(), other);

    let ctx = RuleContext {
        value: &value,
        args: &args,
        form: &form,
        key: "field",
        numeric: NumericMode::Number,
    };

    // Predicates must never panic, whatever the input.
    let _ = (RULE_REGISTRY[index].predicate)(&ctx);
});
