use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::evaluation::{classify, RoicEvaluation};
use super::formatting::format_percentage;
use super::methods::{compute_with, RoicAdjustments, RoicMethod, RoicResult};
use super::record::FinancialRecord;
use crate::error::RoicError;
use crate::types::{with_metadata, ComputationOutput};
use crate::CoreResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoicInput {
    #[serde(flatten)]
    pub record: FinancialRecord,
    /// Subset of methods to run; all four when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<RoicMethod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<RoicAdjustments>,
}

impl From<FinancialRecord> for RoicInput {
    fn from(record: FinancialRecord) -> Self {
        Self {
            record,
            methods: None,
            adjustments: None,
        }
    }
}

/// One method's result together with its display form and band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodReport {
    pub result: RoicResult,
    pub roic_percentage: String,
    pub evaluation: RoicEvaluation,
}

impl From<RoicResult> for MethodReport {
    fn from(result: RoicResult) -> Self {
        Self {
            roic_percentage: format_percentage(result.roic),
            evaluation: classify(result.roic),
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoicAnalysis {
    /// Reports in canonical method order
    pub reports: Vec<MethodReport>,
}

impl RoicAnalysis {
    pub fn get(&self, method: RoicMethod) -> Option<&MethodReport> {
        self.reports.iter().find(|r| r.result.method == method)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the requested ROIC methods on one record and wrap the reports in the
/// standard output envelope.
///
/// The formulas never fail; conditions worth a second look (non-positive
/// capital, amounts beyond the decimal range, tax rate outside [0, 1],
/// negative operating income, missing lease data for the modified method)
/// are reported as warnings.
pub fn calculate_roic(input: &RoicInput) -> CoreResult<ComputationOutput<RoicAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let methods = resolve_methods(input.methods.as_deref())?;
    let adjustments = input.adjustments.clone().unwrap_or_default();
    let record = &input.record;

    // -- Diagnostics -----------------------------------------------------------
    let tax_rate = adjustments.tax_rate(record);
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
        warnings.push(format!(
            "Tax rate {tax_rate} lies outside [0, 1]; NOPAT computed as given"
        ));
    }
    if record.operating_income < Decimal::ZERO {
        warnings.push(format!(
            "Operating income is negative ({}); ROIC will be negative wherever capital is positive",
            record.operating_income
        ));
    }
    if methods.contains(&RoicMethod::Modified) && !record.has_lease_data() {
        warnings.push(
            "No lease expense or lease debt supplied; modified method equals detailed method"
                .into(),
        );
    }

    // -- Formulas --------------------------------------------------------------
    let mut reports = Vec::with_capacity(methods.len());
    for method in &methods {
        let result = compute_with(record, *method, &adjustments);
        if result.overflowed {
            warnings.push(format!(
                "{method}: an intermediate amount exceeds the decimal range; ROIC set to 0"
            ));
        }
        if result.is_saturated() {
            warnings.push(format!(
                "{method}: invested capital {} is not positive; ROIC set to 0",
                result.invested_capital
            ));
        }
        reports.push(MethodReport::from(result));
    }

    let assumptions = serde_json::json!({
        "methods": methods,
        "tax_rate": tax_rate.to_string(),
        "tax_rate_overridden": adjustments.tax_rate_override.is_some(),
        "capital_adjustment": adjustments.capital_adjustment.map(|a| a.to_string()),
        "formulas": methods
            .iter()
            .map(|m| (m.as_str(), m.formula()))
            .collect::<std::collections::BTreeMap<_, _>>(),
        "non_positive_capital": "ROIC reported as 0",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ROIC = NOPAT / invested capital",
        &assumptions,
        warnings,
        elapsed,
        RoicAnalysis { reports },
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Deduplicate and order the requested methods; `None` means all four.
pub(crate) fn resolve_methods(requested: Option<&[RoicMethod]>) -> CoreResult<Vec<RoicMethod>> {
    match requested {
        None => Ok(RoicMethod::ALL.to_vec()),
        Some([]) => Err(RoicError::InvalidInput {
            field: "methods".into(),
            reason: "At least one ROIC method must be requested".into(),
        }),
        Some(list) => {
            let mut methods = list.to_vec();
            methods.sort();
            methods.dedup();
            Ok(methods)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roic::evaluation::RoicLevel;
    use rust_decimal_macros::dec;

    fn sample_input() -> RoicInput {
        RoicInput::from(FinancialRecord {
            operating_income: dec!(150_000),
            interest_income: dec!(5_000),
            tax_rate: dec!(0.30),
            total_assets: dec!(2_000_000),
            cash_and_equivalents: dec!(200_000),
            shareholders_equity: dec!(800_000),
            interest_bearing_debt: dec!(400_000),
            accounts_payable: dec!(100_000),
            accrued_expenses: dec!(50_000),
            lease_expense: Some(dec!(20_000)),
            lease_debt: Some(dec!(180_000)),
        })
    }

    #[test]
    fn test_all_methods_by_default() {
        let out = calculate_roic(&sample_input()).unwrap();
        let methods: Vec<RoicMethod> = out.result.reports.iter().map(|r| r.result.method).collect();
        assert_eq!(methods, RoicMethod::ALL.to_vec());
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_report_formats_and_classifies() {
        let out = calculate_roic(&sample_input()).unwrap();
        let detailed = out.result.get(RoicMethod::Detailed).unwrap();
        // (150k + 5k) x 0.7 / 1.2M = 0.0904166...
        assert_eq!(detailed.roic_percentage, "9.04%");
        assert_eq!(detailed.evaluation.level, RoicLevel::Average);
    }

    #[test]
    fn test_method_subset_is_ordered_and_deduplicated() {
        let mut input = sample_input();
        input.methods = Some(vec![
            RoicMethod::Modified,
            RoicMethod::Basic,
            RoicMethod::Modified,
        ]);
        let out = calculate_roic(&input).unwrap();
        let methods: Vec<RoicMethod> = out.result.reports.iter().map(|r| r.result.method).collect();
        assert_eq!(methods, vec![RoicMethod::Basic, RoicMethod::Modified]);
    }

    #[test]
    fn test_empty_method_list_rejected() {
        let mut input = sample_input();
        input.methods = Some(vec![]);
        match calculate_roic(&input).unwrap_err() {
            RoicError::InvalidInput { field, .. } => assert_eq!(field, "methods"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_saturation_warning() {
        let mut input = sample_input();
        input.record.cash_and_equivalents = dec!(2_000_000);
        let out = calculate_roic(&input).unwrap();
        assert_eq!(out.result.get(RoicMethod::Basic).unwrap().result.roic, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.starts_with("basic: invested capital")));
    }

    #[test]
    fn test_extreme_amounts_do_not_panic() {
        let mut input = sample_input();
        input.record.operating_income = dec!(10_000_000_000_000_000_000_000_000_000);
        input.record.total_assets = Decimal::ONE;
        input.record.cash_and_equivalents = Decimal::ZERO;
        input.methods = Some(vec![RoicMethod::Basic]);
        let out = calculate_roic(&input).unwrap();
        let basic = &out.result.reports[0];
        assert_eq!(basic.result.roic, dec!(7_000_000_000_000_000_000_000_000_000));
        assert_eq!(basic.roic_percentage, format!("7{}.00%", "0".repeat(29)));
    }

    #[test]
    fn test_overflow_warning() {
        let mut input = sample_input();
        input.record.operating_income = dec!(50_000_000_000_000_000_000_000_000_000);
        input.record.tax_rate = dec!(-1);
        let out = calculate_roic(&input).unwrap();
        for report in &out.result.reports {
            assert_eq!(report.result.roic, Decimal::ZERO);
        }
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("basic: an intermediate amount exceeds the decimal range")));
    }

    #[test]
    fn test_tax_rate_and_lease_warnings() {
        let mut input = sample_input();
        input.record.tax_rate = dec!(1.05);
        input.record.lease_expense = None;
        input.record.lease_debt = None;
        let out = calculate_roic(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("outside [0, 1]")));
        assert!(out.warnings.iter().any(|w| w.contains("No lease expense")));
    }

    #[test]
    fn test_adjustments_flow_through() {
        let mut input = sample_input();
        input.adjustments = Some(RoicAdjustments {
            tax_rate_override: Some(dec!(0.40)),
            capital_adjustment: None,
        });
        input.methods = Some(vec![RoicMethod::Basic]);
        let out = calculate_roic(&input).unwrap();
        // 150k x 0.6 = 90k
        assert_eq!(out.result.reports[0].result.nopat, dec!(90_000));
        assert_eq!(out.assumptions["tax_rate_overridden"], true);
    }

    #[test]
    fn test_input_deserializes_flattened_record() {
        let json = r#"{
            "operatingIncome": "100",
            "interestIncome": "0",
            "taxRate": "0.3",
            "totalAssets": "1000",
            "cashAndEquivalents": "100",
            "shareholdersEquity": "400",
            "interestBearingDebt": "300",
            "accountsPayable": "50",
            "accruedExpenses": "30",
            "methods": ["basic", "asset"]
        }"#;
        let input: RoicInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.record.total_assets, dec!(1000));
        assert_eq!(
            input.methods,
            Some(vec![RoicMethod::Basic, RoicMethod::Asset])
        );
    }

    #[test]
    fn test_metadata_populated() {
        let out = calculate_roic(&sample_input()).unwrap();
        assert_eq!(out.methodology, "ROIC = NOPAT / invested capital");
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
