use serde_json::Value;
use std::io;

use super::flatten;

/// Write output as two-column CSV (`field,value`) to stdout. Nested score
/// maps flatten into dotted field names such as
/// `pillar_scores.DIGITALIZATION.percentage`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let mut rows = Vec::new();
    flatten("", body, &mut rows);

    let _ = wtr.write_record(["field", "value"]);
    for (field, val) in rows {
        let _ = wtr.write_record([field.as_str(), val.as_str()]);
    }

    let _ = wtr.flush();
}
