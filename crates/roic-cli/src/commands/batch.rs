use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info};

use roic_core::batch::{calculate_batch, BatchInput};
use roic_core::roic::RoicMethod;
use roic_core::statements::{FinancialStatement, TaxRatePolicy};

use crate::input;
use crate::input::file::FileKind;

/// Arguments for a batch of financial statements
#[derive(Args)]
pub struct BatchArgs {
    /// JSON/YAML batch document, or a CSV of statements (one row per company-year)
    #[arg(long)]
    pub input: Option<String>,

    /// Tax rate source: reported, effective or fixed:<rate>
    #[arg(long)]
    pub tax_policy: Option<String>,

    /// Calculation date stamped on every row (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Method to run; repeat for several (default: all four)
    #[arg(long = "method")]
    pub methods: Vec<RoicMethod>,
}

pub fn run_batch(args: BatchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut batch: BatchInput = match args.input.as_deref() {
        Some(path) if FileKind::from_path(path)? == FileKind::Csv => {
            let statements: Vec<FinancialStatement> = input::file::read_csv(path)?;
            BatchInput {
                statements,
                tax_rate_policy: TaxRatePolicy::default(),
                methods: None,
                adjustments: None,
                calculation_date: None,
            }
        }
        Some(path) => input::file::read_structured(path)?,
        None => match input::stdin::read_stdin()? {
            Some(data) => serde_json::from_value(data)?,
            None => return Err("--input is required (or pipe a batch document on stdin)".into()),
        },
    };

    if let Some(ref policy) = args.tax_policy {
        batch.tax_rate_policy = parse_tax_policy(policy)?;
    }
    if args.as_of.is_some() {
        batch.calculation_date = args.as_of;
    }
    if !args.methods.is_empty() {
        batch.methods = Some(args.methods.clone());
    }
    debug!(
        statements = batch.statements.len(),
        policy = ?batch.tax_rate_policy,
        "running batch"
    );

    let result = calculate_batch(&batch)?;
    info!(
        succeeded = result.result.succeeded,
        failed = result.result.failed,
        "batch finished"
    );
    Ok(serde_json::to_value(result)?)
}

/// `reported`, `effective` or `fixed:<rate>`.
fn parse_tax_policy(spec: &str) -> Result<TaxRatePolicy, Box<dyn std::error::Error>> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.split_once(':') {
        None if spec == "reported" => Ok(TaxRatePolicy::Reported),
        None if spec == "effective" => Ok(TaxRatePolicy::Effective),
        Some(("fixed", rate)) => {
            let rate: Decimal = rate
                .trim()
                .parse()
                .map_err(|e| format!("Invalid fixed tax rate '{rate}': {e}"))?;
            Ok(TaxRatePolicy::Fixed(rate))
        }
        _ => Err(format!(
            "Tax policy must be reported, effective or fixed:<rate>, got '{spec}'"
        )
        .into()),
    }
}
