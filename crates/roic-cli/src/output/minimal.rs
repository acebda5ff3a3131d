use serde_json::Value;

use super::sections::{percent, result_of, text};

/// Print just the key answer(s) from the output.
///
/// One `method: percentage` line per method for calculations, one line per
/// row for batches, the base case for sensitivity grids. Otherwise the first
/// well-known field, then the first field.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{line}");
    }
}

fn minimal_lines(value: &Value) -> Vec<String> {
    let result = result_of(value);

    if let Some(Value::Array(reports)) = result.get("reports") {
        return reports
            .iter()
            .map(|r| format!("{}: {}", text(&r["result"]["method"]), text(&r["roic_percentage"])))
            .collect();
    }
    if let Some(Value::Array(rows)) = result.get("calculations") {
        return rows
            .iter()
            .map(|r| {
                format!(
                    "{} FY{} {}: {}%",
                    text(&r["company_code"]),
                    text(&r["fiscal_year"]),
                    text(&r["method"]),
                    text(&r["roic_percentage"])
                )
            })
            .collect();
    }
    if let Some(base) = result.get("base_case_value") {
        return vec![percent(base)];
    }

    let priority_keys = ["formatted", "roic_percentage", "level"];
    if let Value::Object(map) = result {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return vec![text(val)];
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return vec![format!("{}: {}", key, text(val))];
        }
    }

    vec![text(result)]
}
