use std::fmt;

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Human-readable labels used as breakdown keys.
pub mod labels {
    pub const OPERATING_INCOME: &str = "Operating income";
    pub const INTEREST_INCOME: &str = "Interest income";
    pub const ADJUSTED_OPERATING_INCOME: &str = "Adjusted operating income";
    pub const TAX_RATE: &str = "Tax rate";
    pub const NOPAT: &str = "NOPAT";
    pub const TOTAL_ASSETS: &str = "Total assets";
    pub const CASH_AND_EQUIVALENTS: &str = "Cash and equivalents";
    pub const SHAREHOLDERS_EQUITY: &str = "Shareholders' equity";
    pub const INTEREST_BEARING_DEBT: &str = "Interest-bearing debt";
    pub const ACCOUNTS_PAYABLE: &str = "Accounts payable";
    pub const ACCRUED_EXPENSES: &str = "Accrued expenses";
    pub const NON_INTEREST_BEARING_LIABILITIES: &str = "Non-interest-bearing liabilities";
    pub const CAPITAL_ADJUSTMENT: &str = "Capital adjustment";
    pub const INVESTED_CAPITAL: &str = "Invested capital";
    pub const LEASE_EXPENSE: &str = "Lease expense";
    pub const LEASE_DEBT: &str = "Lease debt";
    pub const MODIFIED_NOPAT: &str = "Modified NOPAT";
    pub const MODIFIED_INVESTED_CAPITAL: &str = "Modified invested capital";
}

/// Ordered label -> value mapping of every intermediate quantity a formula
/// used. Iteration and serialisation follow insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    entries: Vec<(String, Decimal)>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A repeated label overwrites the earlier value in place.
    pub fn push(&mut self, label: &str, value: Decimal) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label.to_string(), value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

struct BreakdownVisitor;

impl<'de> Visitor<'de> for BreakdownVisitor {
    type Value = Breakdown;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of breakdown labels to decimal values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut breakdown = Breakdown::new();
        while let Some((label, value)) = access.next_entry::<String, Decimal>()? {
            breakdown.push(&label, value);
        }
        Ok(breakdown)
    }
}

impl<'de> Deserialize<'de> for Breakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BreakdownVisitor)
    }
}
