use rust_decimal::Decimal;
use serde_json::Value;

use roic_core::roic::format_percentage;

/// A titled grid of display strings extracted from a command's JSON output.
pub struct Section {
    pub title: Option<&'static str>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    fn new(title: Option<&'static str>, headers: &[&str]) -> Self {
        Self {
            title,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// The `result` object of an envelope, or the value itself when unwrapped.
pub fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Break a command's output into display sections. The first section is the
/// primary one.
pub fn sections(value: &Value) -> Vec<Section> {
    let result = result_of(value);

    if let Some(Value::Array(reports)) = result.get("reports") {
        return vec![report_section(reports)];
    }
    if let Some(Value::Array(rows)) = result.get("calculations") {
        let mut out = vec![calculation_section(rows)];
        if let Some(Value::Array(failures)) = result.get("failures") {
            if !failures.is_empty() {
                out.push(failure_section(failures));
            }
        }
        if let Some(Value::Array(summary)) = result.get("summary") {
            out.push(summary_section(summary));
        }
        return out;
    }
    if result.get("matrix").is_some() {
        return vec![grid_section(result)];
    }

    let mut flat = Section::new(None, &["Field", "Value"]);
    if let Value::Object(map) = result {
        for (key, val) in map {
            flat.rows.push(vec![key.clone(), text(val)]);
        }
    } else {
        flat.rows.push(vec!["value".into(), text(result)]);
    }
    vec![flat]
}

fn report_section(reports: &[Value]) -> Section {
    let mut s = Section::new(
        None,
        &["Method", "ROIC", "NOPAT", "Invested capital", "Level"],
    );
    for r in reports {
        s.rows.push(vec![
            text(&r["result"]["method"]),
            text(&r["roic_percentage"]),
            text(&r["result"]["nopat"]),
            text(&r["result"]["invested_capital"]),
            text(&r["evaluation"]["level"]),
        ]);
    }
    s
}

fn calculation_section(rows: &[Value]) -> Section {
    let mut s = Section::new(
        None,
        &[
            "company_code",
            "fiscal_year",
            "method",
            "nopat",
            "invested_capital",
            "roic_percentage",
            "level",
        ],
    );
    for r in rows {
        s.rows.push(vec![
            text(&r["company_code"]),
            text(&r["fiscal_year"]),
            text(&r["method"]),
            text(&r["nopat"]),
            text(&r["invested_capital"]),
            text(&r["roic_percentage"]),
            text(&r["level"]),
        ]);
    }
    s
}

fn failure_section(failures: &[Value]) -> Section {
    let mut s = Section::new(Some("Failures"), &["company_code", "fiscal_year", "error"]);
    for f in failures {
        s.rows.push(vec![
            text(&f["company_code"]),
            text(&f["fiscal_year"]),
            text(&f["error"]),
        ]);
    }
    s
}

fn summary_section(summary: &[Value]) -> Section {
    let mut s = Section::new(
        Some("Summary"),
        &["method", "count", "mean", "median", "min", "max"],
    );
    for m in summary {
        s.rows.push(vec![
            text(&m["method"]),
            text(&m["count"]),
            percent(&m["mean"]),
            percent(&m["median"]),
            percent(&m["min"]),
            percent(&m["max"]),
        ]);
    }
    s
}

/// Tax rates down, capital adjustments across; the base case cell is starred.
fn grid_section(result: &Value) -> Section {
    let columns = as_slice(&result["capital_adjustment_values"]);
    let mut headers = vec!["tax_rate \\ capital_adjustment".to_string()];
    headers.extend(columns.iter().map(text));

    let base = (
        result["base_case_position"][0].as_u64(),
        result["base_case_position"][1].as_u64(),
    );
    let mut rows = Vec::new();
    for (i, (tax, row)) in as_slice(&result["tax_rate_values"])
        .iter()
        .zip(as_slice(&result["matrix"]))
        .enumerate()
    {
        let mut cells = vec![percent(tax)];
        for (j, cell) in as_slice(row).iter().enumerate() {
            let mark = if base == (Some(i as u64), Some(j as u64)) { "*" } else { "" };
            cells.push(format!("{}{mark}", percent(cell)));
        }
        rows.push(cells);
    }

    Section {
        title: None,
        headers,
        rows,
    }
}

fn as_slice(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Render a decimal-string ratio as a percentage; anything else verbatim.
pub fn percent(value: &Value) -> String {
    match value.as_str().and_then(|s| s.parse::<Decimal>().ok()) {
        Some(d) => format_percentage(d),
        None => text(value),
    }
}

pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_rows() {
        let v = json!({"result": {"reports": [{
            "result": {"method": "basic", "roic": "0.1", "nopat": "70", "invested_capital": "700"},
            "roic_percentage": "10.00%",
            "evaluation": {"level": "good"}
        }]}});
        let s = sections(&v);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].rows[0], vec!["basic", "10.00%", "70", "700", "good"]);
    }

    #[test]
    fn test_grid_marks_base_case() {
        let v = json!({"result": {
            "tax_rate_values": ["0.2", "0.3"],
            "capital_adjustment_values": ["0"],
            "matrix": [["0.12"], ["0.105"]],
            "base_case_position": [1, 0]
        }});
        let s = sections(&v);
        assert_eq!(s[0].headers.len(), 2);
        assert_eq!(s[0].rows[0], vec!["20.00%", "12.00%"]);
        assert_eq!(s[0].rows[1], vec!["30.00%", "10.50%*"]);
    }

    #[test]
    fn test_flat_object() {
        let v = json!({"level": "good", "roic_percentage": "12.00%"});
        let s = sections(&v);
        assert_eq!(s[0].headers, vec!["Field", "Value"]);
        assert_eq!(s[0].rows.len(), 2);
    }
}
