use serde_json::Value;

use super::format_value;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, first at the top
/// of the result and then one level down, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "best_loan_id",
        "interest_saved",
        "new_tenure_periods",
        "emi",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            let found = map.get(*key).or_else(|| {
                map.values()
                    .filter_map(Value::as_object)
                    .find_map(|nested| nested.get(*key))
            });
            if let Some(val) = found {
                if !val.is_null() {
                    println!("{}", format_value(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
