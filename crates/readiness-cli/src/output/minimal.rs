use serde_json::Value;

use super::format_scalar;

/// Print just the headline figure of the output.
///
/// Looks for the displayed score fields in priority order, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Team reports nest the individual result
    let result_obj = result_obj
        .as_object()
        .and_then(|m| m.get("individual"))
        .unwrap_or(result_obj);

    let priority_keys = [
        "normalized_shifted_score",
        "overall_score",
        "normalized_score",
        "weighted_score",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    match map.get("maturity_level") {
                        Some(Value::String(level)) => {
                            println!("{} {}", format_scalar(val), level)
                        }
                        _ => println!("{}", format_scalar(val)),
                    }
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    if result_obj.is_null() {
        println!("no data");
        return;
    }
    println!("{}", format_scalar(result_obj));
}
