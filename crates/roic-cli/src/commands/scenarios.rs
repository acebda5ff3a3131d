use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use roic_core::roic::{FinancialRecord, RoicMethod};
use roic_core::scenarios::{roic_sensitivity, RoicSensitivityInput};
use roic_core::SensitivityVariable;

use crate::input;

/// Arguments for a ROIC sensitivity grid
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SensitivityArgs {
    /// Path to a JSON or YAML record used as the base case
    #[arg(long)]
    pub base_inputs: String,

    /// Method to sweep
    #[arg(long, default_value = "detailed")]
    pub method: RoicMethod,

    /// Tax rate sweep as min:max:step (e.g. "0.20:0.40:0.05")
    #[arg(long)]
    pub tax_rate: String,

    /// Invested capital adjustment sweep as min:max:step
    #[arg(long)]
    pub capital_adjustment: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::file::read_structured(&args.base_inputs)?;

    let sensitivity = RoicSensitivityInput {
        record,
        method: args.method,
        tax_rate: parse_range("tax_rate", &args.tax_rate)?,
        capital_adjustment: args
            .capital_adjustment
            .as_deref()
            .map(|s| parse_range("capital_adjustment", s))
            .transpose()?,
    };
    debug!(method = %sensitivity.method, "running sensitivity grid");

    let result = roic_sensitivity(&sensitivity)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_range(name: &str, spec: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("--{} must be min:max:step, got '{}'", name.replace('_', "-"), spec).into());
    }
    let parse = |s: &str| -> Result<Decimal, Box<dyn std::error::Error>> {
        s.parse::<Decimal>()
            .map_err(|e| format!("Invalid number '{s}' in --{}: {e}", name.replace('_', "-")).into())
    };
    Ok(SensitivityVariable {
        name: name.to_string(),
        min: parse(parts[0])?,
        max: parse(parts[1])?,
        step: parse(parts[2])?,
    })
}
