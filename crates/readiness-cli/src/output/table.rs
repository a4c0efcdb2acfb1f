use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format_scalar;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope(map);
            } else {
                print_object("", map);
            }
        }
        _ => println!("{}", format_scalar(value)),
    }
}

fn print_result(result: &Value) {
    match result {
        Value::Null => println!("(no data)"),
        Value::Object(map) if is_row_map(map) => print_rows("", map),
        Value::Object(map) => print_object("", map),
        other => println!("{}", format_scalar(other)),
    }
}

/// Scalars as a Field/Value table, then each nested object as its own
/// table (score maps such as pillars and dimensions as rows).
fn print_object(title: &str, map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalars = 0;
    let mut nested: Vec<(String, &Map<String, Value>)> = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                let path = if title.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", title, key)
                };
                nested.push((path, inner));
            }
            _ => {
                builder.push_record([key.as_str(), &format_scalar(val)]);
                scalars += 1;
            }
        }
    }
    if scalars > 0 {
        if !title.is_empty() {
            println!("\n{}", title);
        }
        println!("{}", Table::from(builder));
    }

    for (path, inner) in nested {
        if is_row_map(inner) {
            print_rows(&path, inner);
        } else {
            print_object(&path, inner);
        }
    }
}

/// A map whose values are all flat objects with the same number of
/// fields, e.g. pillar name to pillar score.
fn is_row_map(map: &Map<String, Value>) -> bool {
    let flat = |o: &Map<String, Value>| o.values().all(|v| !v.is_object());
    let mut rows = map.values();
    let Some(Value::Object(first)) = rows.next() else {
        return false;
    };
    flat(first) && rows.all(|v| matches!(v, Value::Object(o) if o.len() == first.len() && flat(o)))
}

fn print_rows(title: &str, map: &Map<String, Value>) {
    let Some(Value::Object(first)) = map.values().next() else {
        return;
    };
    let headers: Vec<String> = std::iter::once("Name".to_string())
        .chain(first.keys().cloned())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for (name, row) in map {
        if let Value::Object(cols) = row {
            let record: Vec<String> = std::iter::once(name.clone())
                .chain(
                    first
                        .keys()
                        .map(|h| cols.get(h).map(format_scalar).unwrap_or_default()),
                )
                .collect();
            builder.push_record(record);
        }
    }

    if !title.is_empty() {
        println!("\n{}", title);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_map_detection() {
        let pillars = json!({
            "DIGITALIZATION": {"raw_score": "17", "percentage": "85"},
            "TRANSFORMATION": {"raw_score": "15", "percentage": "75"}
        });
        assert!(is_row_map(pillars.as_object().unwrap()));

        // Dimensions grouped by pillar are tables of tables, not rows
        let grouped = json!({
            "DIGITALIZATION": {"Data": {"percentage": "90"}},
            "VALUE_SCALING": {"Unknown": {"percentage": "20"}}
        });
        assert!(!is_row_map(grouped.as_object().unwrap()));
        assert!(is_row_map(grouped["DIGITALIZATION"].as_object().unwrap()));

        let mixed = json!({"a": {"x": 1}, "b": 2});
        assert!(!is_row_map(mixed.as_object().unwrap()));
        assert!(!is_row_map(json!({}).as_object().unwrap()));
    }
}
