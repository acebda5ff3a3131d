use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::breakdown::{labels, Breakdown};
use super::record::FinancialRecord;
use crate::error::RoicError;
use crate::types::{Money, Rate};

/// Tax-rate floor applied by the conservative adjustment preset.
pub const CONSERVATIVE_TAX_FLOOR: Rate = dec!(0.35);

/// Tax-rate cap applied by the aggressive adjustment preset.
pub const AGGRESSIVE_TAX_CAP: Rate = dec!(0.25);

// ---------------------------------------------------------------------------
// Method / result types
// ---------------------------------------------------------------------------

/// The four supported ROIC formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoicMethod {
    /// Operating income after tax over total assets less cash.
    Basic,
    /// Operating plus interest income after tax over equity plus debt.
    Detailed,
    /// Detailed NOPAT over total assets less non-interest-bearing liabilities.
    Asset,
    /// Detailed method with operating leases capitalised (IFRS 16 style).
    Modified,
}

impl RoicMethod {
    /// All methods in canonical order.
    pub const ALL: [RoicMethod; 4] = [
        RoicMethod::Basic,
        RoicMethod::Detailed,
        RoicMethod::Asset,
        RoicMethod::Modified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
            Self::Asset => "asset",
            Self::Modified => "modified",
        }
    }

    /// One-line formula summary, used as methodology text.
    pub fn formula(&self) -> &'static str {
        match self {
            Self::Basic => "OI x (1 - t) / (total assets - cash)",
            Self::Detailed => "(OI + interest income) x (1 - t) / (equity + interest-bearing debt)",
            Self::Asset => {
                "(OI + interest income) x (1 - t) / (total assets - payables - accrued expenses)"
            }
            Self::Modified => {
                "(detailed NOPAT + lease expense x (1 - t)) / (detailed capital + lease debt)"
            }
        }
    }
}

impl fmt::Display for RoicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoicMethod {
    type Err = RoicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "detailed" => Ok(Self::Detailed),
            "asset" => Ok(Self::Asset),
            "modified" => Ok(Self::Modified),
            other => Err(RoicError::InvalidInput {
                field: "method".into(),
                reason: format!(
                    "Unknown ROIC method '{other}'; expected basic, detailed, asset or modified"
                ),
            }),
        }
    }
}

/// Result of one ROIC formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoicResult {
    /// Dimensionless ratio (0.12 = 12%); zero when invested capital <= 0
    pub roic: Rate,
    /// Net operating profit after tax
    pub nopat: Money,
    pub invested_capital: Money,
    pub method: RoicMethod,
    pub breakdown: Breakdown,
    /// An intermediate amount left the Decimal range; that amount and ROIC are 0
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overflowed: bool,
}

impl RoicResult {
    fn new(
        method: RoicMethod,
        nopat: Money,
        invested_capital: Money,
        breakdown: Breakdown,
        overflowed: bool,
    ) -> Self {
        let roic = if overflowed {
            Decimal::ZERO
        } else {
            saturating_ratio(nopat, invested_capital)
        };
        Self {
            roic,
            nopat,
            invested_capital,
            method,
            breakdown,
            overflowed,
        }
    }

    /// True when the capital base was non-positive and ROIC was forced to 0.
    pub fn is_saturated(&self) -> bool {
        !self.overflowed && self.invested_capital <= Decimal::ZERO
    }
}

// ---------------------------------------------------------------------------
// Adjustments
// ---------------------------------------------------------------------------

/// Sensitivity knobs applied on top of the standard formulas.
///
/// The default value leaves every formula untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoicAdjustments {
    /// Replaces the record's tax rate everywhere the formula uses it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_override: Option<Rate>,
    /// Added to the method's invested capital before the zero check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_adjustment: Option<Money>,
}

impl RoicAdjustments {
    /// Tax rate floored at 35%.
    pub fn conservative(record: &FinancialRecord) -> Self {
        Self {
            tax_rate_override: Some(record.tax_rate.max(CONSERVATIVE_TAX_FLOOR)),
            capital_adjustment: None,
        }
    }

    /// Tax rate capped at 25%.
    pub fn aggressive(record: &FinancialRecord) -> Self {
        Self {
            tax_rate_override: Some(record.tax_rate.min(AGGRESSIVE_TAX_CAP)),
            capital_adjustment: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tax_rate_override.is_none() && self.capital_adjustment.is_none()
    }

    pub fn tax_rate(&self, record: &FinancialRecord) -> Rate {
        self.tax_rate_override.unwrap_or(record.tax_rate)
    }

    fn apply_capital(
        &self,
        invested_capital: Money,
        breakdown: &mut Breakdown,
        calc: &mut Checked,
    ) -> Money {
        match self.capital_adjustment {
            Some(adjustment) => {
                breakdown.push(labels::CAPITAL_ADJUSTMENT, adjustment);
                calc.add(invested_capital, adjustment)
            }
            None => invested_capital,
        }
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Basic method: operating income after tax over total assets less cash.
pub fn basic(record: &FinancialRecord) -> RoicResult {
    basic_with(record, &RoicAdjustments::default())
}

/// Detailed method: adds interest income to operating income and measures it
/// against equity plus interest-bearing debt.
pub fn detailed(record: &FinancialRecord) -> RoicResult {
    detailed_with(record, &RoicAdjustments::default())
}

/// Asset method: detailed NOPAT over total assets less accounts payable and
/// accrued expenses.
pub fn asset(record: &FinancialRecord) -> RoicResult {
    asset_with(record, &RoicAdjustments::default())
}

/// Modified method: the detailed method with lease expense (after tax) added
/// back to NOPAT and lease debt added to invested capital.
///
/// Absent lease fields count as zero, in which case the figures equal the
/// detailed method's exactly.
pub fn modified(record: &FinancialRecord) -> RoicResult {
    modified_with(record, &RoicAdjustments::default())
}

/// Run a single method.
pub fn compute(record: &FinancialRecord, method: RoicMethod) -> RoicResult {
    compute_with(record, method, &RoicAdjustments::default())
}

/// Run a single method with sensitivity adjustments applied.
pub fn compute_with(
    record: &FinancialRecord,
    method: RoicMethod,
    adjustments: &RoicAdjustments,
) -> RoicResult {
    match method {
        RoicMethod::Basic => basic_with(record, adjustments),
        RoicMethod::Detailed => detailed_with(record, adjustments),
        RoicMethod::Asset => asset_with(record, adjustments),
        RoicMethod::Modified => modified_with(record, adjustments),
    }
}

fn basic_with(record: &FinancialRecord, adjustments: &RoicAdjustments) -> RoicResult {
    let mut calc = Checked::default();
    let tax_rate = adjustments.tax_rate(record);
    let nopat = calc.after_tax(record.operating_income, tax_rate);
    let invested_capital = calc.sub(record.total_assets, record.cash_and_equivalents);

    let mut breakdown = Breakdown::new();
    breakdown.push(labels::OPERATING_INCOME, record.operating_income);
    breakdown.push(labels::TAX_RATE, tax_rate);
    breakdown.push(labels::NOPAT, nopat);
    breakdown.push(labels::TOTAL_ASSETS, record.total_assets);
    breakdown.push(labels::CASH_AND_EQUIVALENTS, record.cash_and_equivalents);
    let invested_capital = adjustments.apply_capital(invested_capital, &mut breakdown, &mut calc);
    breakdown.push(labels::INVESTED_CAPITAL, invested_capital);

    RoicResult::new(RoicMethod::Basic, nopat, invested_capital, breakdown, calc.overflowed)
}

fn detailed_with(record: &FinancialRecord, adjustments: &RoicAdjustments) -> RoicResult {
    let mut calc = Checked::default();
    let tax_rate = adjustments.tax_rate(record);
    let adjusted_operating_income = calc.add(record.operating_income, record.interest_income);
    let nopat = calc.after_tax(adjusted_operating_income, tax_rate);
    let invested_capital = calc.add(record.shareholders_equity, record.interest_bearing_debt);

    let mut breakdown = Breakdown::new();
    breakdown.push(labels::OPERATING_INCOME, record.operating_income);
    breakdown.push(labels::INTEREST_INCOME, record.interest_income);
    breakdown.push(labels::ADJUSTED_OPERATING_INCOME, adjusted_operating_income);
    breakdown.push(labels::NOPAT, nopat);
    breakdown.push(labels::SHAREHOLDERS_EQUITY, record.shareholders_equity);
    breakdown.push(labels::INTEREST_BEARING_DEBT, record.interest_bearing_debt);
    let invested_capital = adjustments.apply_capital(invested_capital, &mut breakdown, &mut calc);
    breakdown.push(labels::INVESTED_CAPITAL, invested_capital);

    RoicResult::new(RoicMethod::Detailed, nopat, invested_capital, breakdown, calc.overflowed)
}

fn asset_with(record: &FinancialRecord, adjustments: &RoicAdjustments) -> RoicResult {
    let mut calc = Checked::default();
    let tax_rate = adjustments.tax_rate(record);
    let adjusted_operating_income = calc.add(record.operating_income, record.interest_income);
    let nopat = calc.after_tax(adjusted_operating_income, tax_rate);
    let non_interest_bearing = calc.add(record.accounts_payable, record.accrued_expenses);
    let invested_capital = calc.sub(record.total_assets, non_interest_bearing);

    let mut breakdown = Breakdown::new();
    breakdown.push(labels::OPERATING_INCOME, record.operating_income);
    breakdown.push(labels::INTEREST_INCOME, record.interest_income);
    breakdown.push(labels::NOPAT, nopat);
    breakdown.push(labels::TOTAL_ASSETS, record.total_assets);
    breakdown.push(labels::ACCOUNTS_PAYABLE, record.accounts_payable);
    breakdown.push(labels::ACCRUED_EXPENSES, record.accrued_expenses);
    breakdown.push(labels::NON_INTEREST_BEARING_LIABILITIES, non_interest_bearing);
    let invested_capital = adjustments.apply_capital(invested_capital, &mut breakdown, &mut calc);
    breakdown.push(labels::INVESTED_CAPITAL, invested_capital);

    RoicResult::new(RoicMethod::Asset, nopat, invested_capital, breakdown, calc.overflowed)
}

fn modified_with(record: &FinancialRecord, adjustments: &RoicAdjustments) -> RoicResult {
    let base = detailed_with(record, adjustments);
    let mut calc = Checked {
        overflowed: base.overflowed,
    };
    let tax_rate = adjustments.tax_rate(record);

    let lease_expense = record.lease_expense_or_zero();
    let lease_debt = record.lease_debt_or_zero();
    let lease_nopat = calc.after_tax(lease_expense, tax_rate);
    let nopat = calc.add(base.nopat, lease_nopat);
    let invested_capital = calc.add(base.invested_capital, lease_debt);

    let mut breakdown = base.breakdown;
    breakdown.push(labels::LEASE_EXPENSE, lease_expense);
    breakdown.push(labels::LEASE_DEBT, lease_debt);
    breakdown.push(labels::MODIFIED_NOPAT, nopat);
    breakdown.push(labels::MODIFIED_INVESTED_CAPITAL, invested_capital);

    RoicResult::new(RoicMethod::Modified, nopat, invested_capital, breakdown, calc.overflowed)
}

// ---------------------------------------------------------------------------
// Suite
// ---------------------------------------------------------------------------

/// All four methods computed on the same record, keyed by method name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoicSuite {
    pub basic: RoicResult,
    pub detailed: RoicResult,
    pub asset: RoicResult,
    pub modified: RoicResult,
}

impl RoicSuite {
    pub fn get(&self, method: RoicMethod) -> &RoicResult {
        match method {
            RoicMethod::Basic => &self.basic,
            RoicMethod::Detailed => &self.detailed,
            RoicMethod::Asset => &self.asset,
            RoicMethod::Modified => &self.modified,
        }
    }

    /// Results in canonical method order.
    pub fn iter(&self) -> impl Iterator<Item = &RoicResult> {
        [&self.basic, &self.detailed, &self.asset, &self.modified].into_iter()
    }
}

/// Compute every method on one record.
pub fn compute_all(record: &FinancialRecord) -> RoicSuite {
    compute_all_with(record, &RoicAdjustments::default())
}

pub fn compute_all_with(record: &FinancialRecord, adjustments: &RoicAdjustments) -> RoicSuite {
    RoicSuite {
        basic: basic_with(record, adjustments),
        detailed: detailed_with(record, adjustments),
        asset: asset_with(record, adjustments),
        modified: modified_with(record, adjustments),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Checked arithmetic for one formula. A step that leaves the Decimal range
/// yields zero and marks the result as overflowed.
#[derive(Debug, Default)]
struct Checked {
    overflowed: bool,
}

impl Checked {
    fn value(&mut self, value: Option<Decimal>) -> Decimal {
        value.unwrap_or_else(|| {
            self.overflowed = true;
            Decimal::ZERO
        })
    }

    fn add(&mut self, a: Decimal, b: Decimal) -> Decimal {
        self.value(a.checked_add(b))
    }

    fn sub(&mut self, a: Decimal, b: Decimal) -> Decimal {
        self.value(a.checked_sub(b))
    }

    /// amount x (1 - tax_rate)
    fn after_tax(&mut self, amount: Money, tax_rate: Rate) -> Money {
        let kept = Decimal::ONE
            .checked_sub(tax_rate)
            .and_then(|share| amount.checked_mul(share));
        self.value(kept)
    }
}

/// NOPAT / invested capital, or zero when the capital base is non-positive
/// or the quotient does not fit in a Decimal.
fn saturating_ratio(nopat: Money, invested_capital: Money) -> Rate {
    if invested_capital <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    nopat.checked_div(invested_capital).unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
