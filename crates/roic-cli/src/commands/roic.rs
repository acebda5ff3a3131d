use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use roic_core::roic::{calculate_roic, FinancialRecord, RoicAdjustments, RoicInput, RoicMethod};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Preset {
    /// Tax rate floored at 35%
    Conservative,
    /// Tax rate capped at 25%
    Aggressive,
}

/// Arguments for a single-record ROIC calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalculateArgs {
    /// Path to a JSON or YAML record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Operating income
    #[arg(long)]
    pub operating_income: Option<Decimal>,

    /// Interest and dividend income
    #[arg(long)]
    pub interest_income: Option<Decimal>,

    /// Effective tax rate (e.g. 0.30 for 30%)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Total assets
    #[arg(long)]
    pub total_assets: Option<Decimal>,

    /// Cash and cash equivalents
    #[arg(long)]
    pub cash: Option<Decimal>,

    /// Shareholders' equity
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// Interest-bearing debt
    #[arg(long)]
    pub debt: Option<Decimal>,

    /// Accounts payable
    #[arg(long)]
    pub accounts_payable: Option<Decimal>,

    /// Accrued expenses
    #[arg(long)]
    pub accrued_expenses: Option<Decimal>,

    /// Operating lease expense
    #[arg(long)]
    pub lease_expense: Option<Decimal>,

    /// Lease liabilities
    #[arg(long)]
    pub lease_debt: Option<Decimal>,

    /// Method to run; repeat for several (default: all four)
    #[arg(long = "method")]
    pub methods: Vec<RoicMethod>,

    /// Replace the record's tax rate
    #[arg(long, conflicts_with = "preset")]
    pub tax_rate_override: Option<Decimal>,

    /// Amount added to every method's invested capital
    #[arg(long)]
    pub capital_adjustment: Option<Decimal>,

    /// Named tax rate scenario
    #[arg(long)]
    pub preset: Option<Preset>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut roic_input: RoicInput = if let Some(ref path) = args.input {
        debug!(path = %path, "reading record from file");
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RoicInput::from(record_from_flags(&args)?)
    };

    if !args.methods.is_empty() {
        roic_input.methods = Some(args.methods.clone());
    }
    roic_input.adjustments = merge_adjustments(&args, &roic_input);
    debug!(
        methods = ?roic_input.methods,
        adjustments = ?roic_input.adjustments,
        "calculating ROIC"
    );

    let result = calculate_roic(&roic_input)?;
    Ok(serde_json::to_value(result)?)
}

fn record_from_flags(args: &CalculateArgs) -> Result<FinancialRecord, Box<dyn std::error::Error>> {
    Ok(FinancialRecord {
        operating_income: args
            .operating_income
            .ok_or("--operating-income is required (or provide --input)")?,
        interest_income: args
            .interest_income
            .ok_or("--interest-income is required (or provide --input)")?,
        tax_rate: args
            .tax_rate
            .ok_or("--tax-rate is required (or provide --input)")?,
        total_assets: args
            .total_assets
            .ok_or("--total-assets is required (or provide --input)")?,
        cash_and_equivalents: args.cash.ok_or("--cash is required (or provide --input)")?,
        shareholders_equity: args.equity.ok_or("--equity is required (or provide --input)")?,
        interest_bearing_debt: args.debt.ok_or("--debt is required (or provide --input)")?,
        accounts_payable: args
            .accounts_payable
            .ok_or("--accounts-payable is required (or provide --input)")?,
        accrued_expenses: args
            .accrued_expenses
            .ok_or("--accrued-expenses is required (or provide --input)")?,
        lease_expense: args.lease_expense,
        lease_debt: args.lease_debt,
    })
}

/// Flags take precedence over adjustments read from the input document.
fn merge_adjustments(args: &CalculateArgs, roic_input: &RoicInput) -> Option<RoicAdjustments> {
    let mut adjustments = roic_input.adjustments.clone().unwrap_or_default();
    match args.preset {
        Some(Preset::Conservative) => {
            adjustments.tax_rate_override =
                RoicAdjustments::conservative(&roic_input.record).tax_rate_override;
        }
        Some(Preset::Aggressive) => {
            adjustments.tax_rate_override =
                RoicAdjustments::aggressive(&roic_input.record).tax_rate_override;
        }
        None => {}
    }
    if args.tax_rate_override.is_some() {
        adjustments.tax_rate_override = args.tax_rate_override;
    }
    if args.capital_adjustment.is_some() {
        adjustments.capital_adjustment = args.capital_adjustment;
    }
    (!adjustments.is_empty()).then_some(adjustments)
}
