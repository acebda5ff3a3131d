use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::sections::{sections, Section};

/// Format output as one or more tables using the tabled crate.
pub fn print_table(value: &Value) {
    for (i, section) in sections(value).iter().enumerate() {
        if i > 0 {
            println!();
        }
        if let Some(title) = section.title {
            println!("{title}:");
        }
        println!("{}", build_table(section));
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn build_table(section: &Section) -> Table {
    let mut builder = Builder::default();
    builder.push_record(section.headers.iter().map(String::as_str));
    for row in &section.rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    Table::from(builder)
}
