use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax_rate::{resolve_tax_rate, TaxRatePolicy};
use crate::error::RoicError;
use crate::roic::FinancialRecord;
use crate::types::{Money, Rate};
use crate::CoreResult;

/// Line items for one company and fiscal year as a filings provider delivers
/// them. Any item may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatement {
    /// EDINET code or securities code
    pub company_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub fiscal_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,

    // Income statement
    #[serde(default)]
    pub operating_income: Option<Money>,
    #[serde(default)]
    pub interest_income: Option<Money>,
    #[serde(default)]
    pub income_tax_expense: Option<Money>,
    #[serde(default)]
    pub pretax_income: Option<Money>,
    /// Effective tax rate as reported or supplied by the provider
    #[serde(default)]
    pub tax_rate: Option<Rate>,
    #[serde(default)]
    pub lease_expense: Option<Money>,

    // Balance sheet
    #[serde(default)]
    pub total_assets: Option<Money>,
    #[serde(default)]
    pub cash_and_equivalents: Option<Money>,
    #[serde(default)]
    pub shareholders_equity: Option<Money>,
    #[serde(default)]
    pub interest_bearing_debt: Option<Money>,
    #[serde(default)]
    pub accounts_payable: Option<Money>,
    #[serde(default)]
    pub accrued_expenses: Option<Money>,
    #[serde(default)]
    pub lease_debt: Option<Money>,
}

impl FinancialStatement {
    /// `CODE FY2024` style label used in error messages.
    pub fn label(&self) -> String {
        format!("{} FY{}", self.company_code, self.fiscal_year)
    }
}

/// Convert a statement into a record the engine can consume.
///
/// Every missing required line item is reported in a single
/// `InsufficientData` error. Nothing is estimated or defaulted apart from the
/// optional lease items.
pub fn to_record(
    statement: &FinancialStatement,
    policy: &TaxRatePolicy,
) -> CoreResult<FinancialRecord> {
    let required: [(&str, Option<Money>); 8] = [
        ("operating_income", statement.operating_income),
        ("interest_income", statement.interest_income),
        ("total_assets", statement.total_assets),
        ("cash_and_equivalents", statement.cash_and_equivalents),
        ("shareholders_equity", statement.shareholders_equity),
        ("interest_bearing_debt", statement.interest_bearing_debt),
        ("accounts_payable", statement.accounts_payable),
        ("accrued_expenses", statement.accrued_expenses),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(RoicError::InsufficientData(format!(
            "{}: missing {}",
            statement.label(),
            missing.join(", ")
        )));
    }

    validate_non_negative(statement)?;
    let tax_rate = resolve_tax_rate(statement, policy)?;

    Ok(FinancialRecord {
        operating_income: statement.operating_income.unwrap_or_default(),
        interest_income: statement.interest_income.unwrap_or_default(),
        tax_rate,
        total_assets: statement.total_assets.unwrap_or_default(),
        cash_and_equivalents: statement.cash_and_equivalents.unwrap_or_default(),
        shareholders_equity: statement.shareholders_equity.unwrap_or_default(),
        interest_bearing_debt: statement.interest_bearing_debt.unwrap_or_default(),
        accounts_payable: statement.accounts_payable.unwrap_or_default(),
        accrued_expenses: statement.accrued_expenses.unwrap_or_default(),
        lease_expense: statement.lease_expense,
        lease_debt: statement.lease_debt,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_non_negative(statement: &FinancialStatement) -> CoreResult<()> {
    let checked: [(&str, Option<Money>); 7] = [
        ("total_assets", statement.total_assets),
        ("cash_and_equivalents", statement.cash_and_equivalents),
        ("interest_bearing_debt", statement.interest_bearing_debt),
        ("accounts_payable", statement.accounts_payable),
        ("accrued_expenses", statement.accrued_expenses),
        ("lease_expense", statement.lease_expense),
        ("lease_debt", statement.lease_debt),
    ];
    for (field, value) in checked {
        if let Some(v) = value {
            if v < Decimal::ZERO {
                return Err(RoicError::InvalidInput {
                    field: field.into(),
                    reason: format!("{}: {field} cannot be negative ({v})", statement.label()),
                });
            }
        }
    }
    Ok(())
}
