use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use roic_core::roic::{classify, format_currency, format_percentage, UnitTable};

use crate::input;

/// Arguments for classifying a ROIC value
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ClassifyArgs {
    /// ROIC as a ratio (0.12 = 12%)
    pub roic: Decimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatKind {
    /// Ratio to "12.34%"
    Percentage,
    /// Amount in display units, e.g. "1,500億円"
    Currency,
}

/// Arguments for display formatting
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FormatArgs {
    pub kind: FormatKind,

    /// Value to format; an omitted currency amount prints the placeholder
    pub value: Option<Decimal>,

    /// Currency units: a preset (ja, en, short) or a JSON/YAML unit table file
    #[arg(long, default_value = "ja")]
    pub units: String,
}

pub fn run_classify(args: ClassifyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let evaluation = classify(args.roic);
    Ok(json!({
        "roic": args.roic.to_string(),
        "roic_percentage": format_percentage(args.roic),
        "level": evaluation.level,
        "description": evaluation.description,
    }))
}

pub fn run_format(args: FormatArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let formatted = match args.kind {
        FormatKind::Percentage => {
            let value = args.value.ok_or("a value is required for percentage formatting")?;
            format_percentage(value)
        }
        FormatKind::Currency => format_currency(args.value, &load_units(&args.units)?),
    };
    Ok(json!({
        "value": args.value.map(|v| v.to_string()),
        "formatted": formatted,
    }))
}

/// A path ending in .json/.yaml/.yml is read as a unit table; anything else is
/// taken as a preset name.
fn load_units(spec: &str) -> Result<UnitTable, Box<dyn std::error::Error>> {
    let lower = spec.to_ascii_lowercase();
    if lower.ends_with(".json") || lower.ends_with(".yaml") || lower.ends_with(".yml") {
        input::file::read_structured(spec)
    } else {
        Ok(UnitTable::preset(spec)?)
    }
}
