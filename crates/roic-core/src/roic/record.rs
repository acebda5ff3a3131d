use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Normalised financial data for one company and fiscal year.
///
/// Every monetary field must be expressed in the same currency unit. The
/// engine performs no sign or range checks: negative operating income, zero
/// totals and tax rates outside `[0, 1]` all flow through the arithmetic
/// unchanged. Validation belongs to whoever builds the record (see
/// `statements::to_record`).
///
/// Field names serialise as snake_case; the camelCase names used by the
/// web dashboard are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Operating profit for the period
    #[serde(alias = "operatingIncome")]
    pub operating_income: Money,
    /// Interest and dividend income received
    #[serde(alias = "interestIncome")]
    pub interest_income: Money,
    /// Effective tax rate (0.30 = 30%)
    #[serde(alias = "taxRate")]
    pub tax_rate: Rate,
    #[serde(alias = "totalAssets")]
    pub total_assets: Money,
    #[serde(alias = "cashAndEquivalents")]
    pub cash_and_equivalents: Money,
    #[serde(alias = "shareholdersEquity")]
    pub shareholders_equity: Money,
    #[serde(alias = "interestBearingDebt")]
    pub interest_bearing_debt: Money,
    #[serde(alias = "accountsPayable")]
    pub accounts_payable: Money,
    #[serde(alias = "accruedExpenses")]
    pub accrued_expenses: Money,
    /// Operating lease expense (IFRS 16 add-back)
    #[serde(
        default,
        alias = "leaseExpense",
        skip_serializing_if = "Option::is_none"
    )]
    pub lease_expense: Option<Money>,
    /// Capitalised lease liabilities
    #[serde(default, alias = "leaseDebt", skip_serializing_if = "Option::is_none")]
    pub lease_debt: Option<Money>,
}

impl FinancialRecord {
    /// Lease expense, treating an absent value as zero.
    pub fn lease_expense_or_zero(&self) -> Money {
        self.lease_expense.unwrap_or(Decimal::ZERO)
    }

    /// Lease debt, treating an absent value as zero.
    pub fn lease_debt_or_zero(&self) -> Money {
        self.lease_debt.unwrap_or(Decimal::ZERO)
    }

    pub fn has_lease_data(&self) -> bool {
        self.lease_expense.is_some() || self.lease_debt.is_some()
    }

    /// Multiply every monetary field by `factor`, leaving the tax rate alone.
    /// `None` when a product leaves the Decimal range.
    pub fn scaled(&self, factor: Decimal) -> Option<Self> {
        let scale = |v: Option<Decimal>| match v {
            Some(v) => v.checked_mul(factor).map(Some),
            None => Some(None),
        };
        Some(Self {
            operating_income: self.operating_income.checked_mul(factor)?,
            interest_income: self.interest_income.checked_mul(factor)?,
            tax_rate: self.tax_rate,
            total_assets: self.total_assets.checked_mul(factor)?,
            cash_and_equivalents: self.cash_and_equivalents.checked_mul(factor)?,
            shareholders_equity: self.shareholders_equity.checked_mul(factor)?,
            interest_bearing_debt: self.interest_bearing_debt.checked_mul(factor)?,
            accounts_payable: self.accounts_payable.checked_mul(factor)?,
            accrued_expenses: self.accrued_expenses.checked_mul(factor)?,
            lease_expense: scale(self.lease_expense)?,
            lease_debt: scale(self.lease_debt)?,
        })
    }
}
