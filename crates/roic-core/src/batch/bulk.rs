use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use super::summary::{summarize, MethodSummary};
use crate::error::RoicError;
use crate::roic::analysis::resolve_methods;
use crate::roic::{
    classify, compute_with, FinancialRecord, RoicAdjustments, RoicLevel, RoicMethod,
};
use crate::statements::{to_record, FinancialStatement, TaxRatePolicy};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CoreResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub statements: Vec<FinancialStatement>,
    #[serde(default)]
    pub tax_rate_policy: TaxRatePolicy,
    /// Subset of methods to run; all four when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<RoicMethod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<RoicAdjustments>,
    /// Stamped on every row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_date: Option<NaiveDate>,
}

/// One persisted-shape row: a company, a fiscal year and one method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoicCalculation {
    pub company_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub fiscal_year: i32,
    pub method: RoicMethod,
    pub nopat: Money,
    pub invested_capital: Money,
    pub roic: Rate,
    /// ROIC x 100 rounded to two places
    pub roic_percentage: Decimal,
    pub level: RoicLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub company_code: String,
    pub fiscal_year: i32,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub calculations: Vec<RoicCalculation>,
    pub failures: Vec<BatchFailure>,
    pub succeeded: usize,
    pub failed: usize,
    pub summary: Vec<MethodSummary>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate ROIC for every statement in the batch.
///
/// A statement that cannot be turned into a record is recorded as a
/// [`BatchFailure`] and the batch carries on with the next one.
pub fn calculate_batch(input: &BatchInput) -> CoreResult<ComputationOutput<BatchOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.statements.is_empty() {
        return Err(RoicError::InsufficientData(
            "Batch contains no statements".into(),
        ));
    }
    let methods = resolve_methods(input.methods.as_deref())?;
    let adjustments = input.adjustments.clone().unwrap_or_default();

    let mut seen: HashSet<(&str, i32)> = HashSet::new();
    let mut calculations = Vec::with_capacity(input.statements.len() * methods.len());
    let mut failures = Vec::new();

    for statement in &input.statements {
        if !seen.insert((statement.company_code.as_str(), statement.fiscal_year)) {
            warnings.push(format!(
                "Duplicate statement for {}; each copy is calculated",
                statement.label()
            ));
        }

        let record = match to_record(statement, &input.tax_rate_policy) {
            Ok(record) => record,
            Err(e) => {
                failures.push(BatchFailure {
                    company_code: statement.company_code.clone(),
                    fiscal_year: statement.fiscal_year,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let rows = statement_rows(
            statement,
            &record,
            &methods,
            &adjustments,
            input.calculation_date,
        );
        match rows {
            Ok((rows, row_warnings)) => {
                warnings.extend(row_warnings);
                calculations.extend(rows);
            }
            Err(e) => failures.push(BatchFailure {
                company_code: statement.company_code.clone(),
                fiscal_year: statement.fiscal_year,
                error: e.to_string(),
            }),
        }
    }

    let failed = failures.len();
    let succeeded = input.statements.len() - failed;
    if failed > 0 {
        warnings.push(format!(
            "{failed} of {} statements could not be calculated",
            input.statements.len()
        ));
    }

    let summary = summarize(&calculations);
    let assumptions = serde_json::json!({
        "methods": methods,
        "tax_rate_policy": input.tax_rate_policy,
        "adjustments": adjustments,
        "calculation_date": input.calculation_date,
        "statements": input.statements.len(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bulk ROIC calculation with per-statement error capture",
        &assumptions,
        warnings,
        elapsed,
        BatchOutput {
            calculations,
            failures,
            succeeded,
            failed,
            summary,
        },
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// One row per method for a statement, plus its warnings. All or nothing:
/// a row that cannot be represented fails the whole statement.
fn statement_rows(
    statement: &FinancialStatement,
    record: &FinancialRecord,
    methods: &[RoicMethod],
    adjustments: &RoicAdjustments,
    calculation_date: Option<NaiveDate>,
) -> CoreResult<(Vec<RoicCalculation>, Vec<String>)> {
    let mut rows = Vec::with_capacity(methods.len());
    let mut warnings = Vec::new();
    for method in methods {
        let result = compute_with(record, *method, adjustments);
        if result.overflowed {
            warnings.push(format!(
                "{} {method}: an intermediate amount exceeds the decimal range; ROIC set to 0",
                statement.label()
            ));
        }
        if result.is_saturated() {
            warnings.push(format!(
                "{} {method}: invested capital {} is not positive; ROIC set to 0",
                statement.label(),
                result.invested_capital
            ));
        }
        rows.push(RoicCalculation {
            company_code: statement.company_code.clone(),
            company_name: statement.company_name.clone(),
            fiscal_year: statement.fiscal_year,
            method: *method,
            nopat: result.nopat,
            invested_capital: result.invested_capital,
            roic: result.roic,
            roic_percentage: percentage_points(result.roic, *method)?,
            level: classify(result.roic).level,
            calculation_date,
        });
    }
    Ok((rows, warnings))
}

fn percentage_points(roic: Rate, method: RoicMethod) -> CoreResult<Decimal> {
    roic.checked_mul(dec!(100))
        .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| RoicError::InvalidInput {
            field: "roic".into(),
            reason: format!("{method} ROIC {roic} is too large to express as a percentage"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_statement(code: &str, year: i32) -> FinancialStatement {
        FinancialStatement {
            company_code: code.into(),
            company_name: Some(format!("{code} Holdings")),
            fiscal_year: year,
            operating_income: Some(dec!(150_000)),
            interest_income: Some(dec!(5_000)),
            tax_rate: Some(dec!(0.30)),
            total_assets: Some(dec!(2_000_000)),
            cash_and_equivalents: Some(dec!(200_000)),
            shareholders_equity: Some(dec!(800_000)),
            interest_bearing_debt: Some(dec!(400_000)),
            accounts_payable: Some(dec!(100_000)),
            accrued_expenses: Some(dec!(50_000)),
            lease_expense: Some(dec!(20_000)),
            lease_debt: Some(dec!(180_000)),
            ..Default::default()
        }
    }

    fn sample_input() -> BatchInput {
        BatchInput {
            statements: vec![sample_statement("E00001", 2024), sample_statement("E00002", 2024)],
            tax_rate_policy: TaxRatePolicy::Reported,
            methods: None,
            adjustments: None,
            calculation_date: NaiveDate::from_ymd_opt(2025, 6, 30),
        }
    }

    #[test]
    fn test_one_row_per_statement_and_method() {
        let out = calculate_batch(&sample_input()).unwrap();
        assert_eq!(out.result.calculations.len(), 8);
        assert_eq!(out.result.succeeded, 2);
        assert_eq!(out.result.failed, 0);
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_row_values() {
        let out = calculate_batch(&sample_input()).unwrap();
        let row = &out.result.calculations[0];
        assert_eq!(row.method, RoicMethod::Basic);
        assert_eq!(row.nopat, dec!(105_000));
        assert_eq!(row.invested_capital, dec!(1_800_000));
        // 105k / 1.8M = 5.8333...%
        assert_eq!(row.roic_percentage, dec!(5.83));
        assert_eq!(row.level, RoicLevel::Average);
        assert_eq!(row.calculation_date, NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let mut input = sample_input();
        input.statements[0].shareholders_equity = None;
        let out = calculate_batch(&input).unwrap();
        assert_eq!(out.result.failed, 1);
        assert_eq!(out.result.succeeded, 1);
        assert_eq!(out.result.calculations.len(), 4);
        assert_eq!(out.result.failures[0].company_code, "E00001");
        assert!(out.result.failures[0].error.contains("shareholders_equity"));
        assert!(out.warnings.iter().any(|w| w.contains("1 of 2 statements")));
    }

    #[test]
    fn test_unrepresentable_percentage_fails_statement() {
        let mut input = sample_input();
        input.statements[1].operating_income = Some(dec!(10_000_000_000_000_000_000_000_000_000));
        input.statements[1].total_assets = Some(Decimal::ONE);
        input.statements[1].cash_and_equivalents = Some(Decimal::ZERO);
        let out = calculate_batch(&input).unwrap();
        assert_eq!(out.result.failed, 1);
        assert_eq!(out.result.failures[0].company_code, "E00002");
        assert!(out.result.failures[0].error.contains("too large"));
        // No partial rows for the failed statement
        assert!(out.result.calculations.iter().all(|r| r.company_code == "E00001"));
        assert_eq!(out.result.calculations.len(), 4);
    }

    #[test]
    fn test_overflow_warns_per_method() {
        let mut input = sample_input();
        input.statements[0].operating_income = Some(dec!(50_000_000_000_000_000_000_000_000_000));
        input.adjustments = Some(RoicAdjustments {
            tax_rate_override: Some(dec!(-1)),
            capital_adjustment: None,
        });
        input.methods = Some(vec![RoicMethod::Basic]);
        let out = calculate_batch(&input).unwrap();
        assert_eq!(out.result.calculations[0].roic, Decimal::ZERO);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("E00001 FY2024 basic: an intermediate amount exceeds")));
    }

    #[test]
    fn test_duplicate_statement_warns() {
        let mut input = sample_input();
        input.statements.push(sample_statement("E00001", 2024));
        let out = calculate_batch(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.starts_with("Duplicate statement for E00001 FY2024")));
        assert_eq!(out.result.succeeded, 3);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut input = sample_input();
        input.statements.clear();
        match calculate_batch(&input).unwrap_err() {
            RoicError::InsufficientData(msg) => assert!(msg.contains("no statements")),
            other => panic!("Expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_summary_covers_requested_methods() {
        let mut input = sample_input();
        input.methods = Some(vec![RoicMethod::Detailed]);
        let out = calculate_batch(&input).unwrap();
        assert_eq!(out.result.summary.len(), 1);
        assert_eq!(out.result.summary[0].count, 2);
    }

    #[test]
    fn test_fixed_policy_applies_to_every_statement() {
        let mut input = sample_input();
        input.tax_rate_policy = TaxRatePolicy::Fixed(dec!(0.40));
        input.methods = Some(vec![RoicMethod::Basic]);
        let out = calculate_batch(&input).unwrap();
        for row in &out.result.calculations {
            assert_eq!(row.nopat, dec!(90_000));
        }
    }
}
