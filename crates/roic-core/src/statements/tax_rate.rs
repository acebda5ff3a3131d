use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::statement::FinancialStatement;
use crate::error::RoicError;
use crate::types::{Money, Rate};
use crate::CoreResult;

/// Upper bound accepted for a derived effective tax rate.
pub const EFFECTIVE_TAX_RATE_CEILING: Rate = dec!(0.5);

/// Where the record's tax rate comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "rate")]
pub enum TaxRatePolicy {
    /// The statement's own `tax_rate`; required
    #[default]
    Reported,
    /// A caller-supplied rate, e.g. the statutory rate
    Fixed(Rate),
    /// Income tax expense over pretax income
    Effective,
}

/// Income tax expense / pretax income, accepted only within
/// `[0, EFFECTIVE_TAX_RATE_CEILING]`.
pub fn effective_tax_rate(tax_expense: Money, pretax_income: Money) -> CoreResult<Rate> {
    if pretax_income.is_zero() {
        return Err(RoicError::DivisionByZero {
            context: "effective tax rate (pretax income is zero)".into(),
        });
    }
    if pretax_income < Decimal::ZERO {
        return Err(RoicError::InsufficientData(format!(
            "Effective tax rate needs positive pretax income, got {pretax_income}"
        )));
    }
    tax_expense
        .checked_div(pretax_income)
        .filter(|rate| *rate >= Decimal::ZERO && *rate <= EFFECTIVE_TAX_RATE_CEILING)
        .ok_or_else(|| RoicError::InvalidInput {
            field: "income_tax_expense".into(),
            reason: format!(
                "Tax expense {tax_expense} over pretax income {pretax_income} is outside \
                 [0, {EFFECTIVE_TAX_RATE_CEILING}]"
            ),
        })
}

/// Resolve the tax rate for a statement under `policy`, rejecting any result
/// outside `[0, 1]`.
pub fn resolve_tax_rate(statement: &FinancialStatement, policy: &TaxRatePolicy) -> CoreResult<Rate> {
    let rate = match policy {
        TaxRatePolicy::Reported => statement.tax_rate.ok_or_else(|| {
            RoicError::InsufficientData(format!("{}: missing tax_rate", statement.label()))
        })?,
        TaxRatePolicy::Fixed(rate) => *rate,
        TaxRatePolicy::Effective => match (statement.income_tax_expense, statement.pretax_income) {
            (Some(expense), Some(pretax)) => effective_tax_rate(expense, pretax)?,
            _ => {
                return Err(RoicError::InsufficientData(format!(
                    "{}: effective tax rate needs income_tax_expense and pretax_income",
                    statement.label()
                )))
            }
        },
    };

    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RoicError::InvalidInput {
            field: "tax_rate".into(),
            reason: format!("{}: tax rate {rate} must be between 0 and 1", statement.label()),
        });
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> FinancialStatement {
        FinancialStatement {
            company_code: "E00001".into(),
            fiscal_year: 2023,
            income_tax_expense: Some(dec!(30)),
            pretax_income: Some(dec!(100)),
            tax_rate: Some(dec!(0.28)),
            ..Default::default()
        }
    }

    #[test]
    fn test_reported_policy() {
        assert_eq!(resolve_tax_rate(&statement(), &TaxRatePolicy::Reported).unwrap(), dec!(0.28));
    }

    #[test]
    fn test_reported_policy_requires_rate() {
        let mut s = statement();
        s.tax_rate = None;
        assert!(matches!(
            resolve_tax_rate(&s, &TaxRatePolicy::Reported),
            Err(RoicError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_fixed_policy_ignores_statement() {
        let rate = resolve_tax_rate(&statement(), &TaxRatePolicy::Fixed(dec!(0.3062))).unwrap();
        assert_eq!(rate, dec!(0.3062));
    }

    #[test]
    fn test_fixed_policy_out_of_range() {
        let err = resolve_tax_rate(&statement(), &TaxRatePolicy::Fixed(dec!(1.5))).unwrap_err();
        assert!(matches!(err, RoicError::InvalidInput { ref field, .. } if field == "tax_rate"));
    }

    #[test]
    fn test_effective_policy() {
        assert_eq!(resolve_tax_rate(&statement(), &TaxRatePolicy::Effective).unwrap(), dec!(0.3));
    }

    #[test]
    fn test_effective_policy_has_no_fallback() {
        let mut s = statement();
        s.pretax_income = None;
        assert!(matches!(
            resolve_tax_rate(&s, &TaxRatePolicy::Effective),
            Err(RoicError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_effective_rate_bounds() {
        assert!(effective_tax_rate(dec!(60), dec!(100)).is_err());
        assert!(effective_tax_rate(dec!(-1), dec!(100)).is_err());
        assert!(effective_tax_rate(dec!(10), dec!(-100)).is_err());
        assert_eq!(effective_tax_rate(dec!(50), dec!(100)).unwrap(), dec!(0.5));
        assert_eq!(effective_tax_rate(Decimal::ZERO, dec!(100)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_quotient_beyond_decimal_range() {
        match effective_tax_rate(Decimal::MAX, dec!(0.001)).unwrap_err() {
            RoicError::InvalidInput { field, .. } => assert_eq!(field, "income_tax_expense"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_pretax_income() {
        assert!(matches!(
            effective_tax_rate(dec!(10), Decimal::ZERO),
            Err(RoicError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_policy_serde() {
        let fixed: TaxRatePolicy = serde_json::from_str(r#"{"policy":"fixed","rate":"0.3"}"#).unwrap();
        assert_eq!(fixed, TaxRatePolicy::Fixed(dec!(0.3)));
        let eff: TaxRatePolicy = serde_json::from_str(r#"{"policy":"effective"}"#).unwrap();
        assert_eq!(eff, TaxRatePolicy::Effective);
    }
}
