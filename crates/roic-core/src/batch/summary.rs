use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::bulk::RoicCalculation;
use crate::roic::RoicMethod;
use crate::types::Rate;

/// Distribution of ROIC across the successful rows of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub method: RoicMethod,
    pub count: usize,
    pub mean: Rate,
    pub median: Rate,
    pub min: Rate,
    pub max: Rate,
}

/// One summary per method that produced at least one row, in canonical
/// method order.
pub fn summarize(rows: &[RoicCalculation]) -> Vec<MethodSummary> {
    RoicMethod::ALL
        .iter()
        .filter_map(|method| {
            let mut values: Vec<Rate> = rows
                .iter()
                .filter(|r| r.method == *method)
                .map(|r| r.roic)
                .collect();
            if values.is_empty() {
                return None;
            }
            values.sort();
            let count = values.len();
            Some(MethodSummary {
                method: *method,
                count,
                mean: mean(&values),
                median: median_sorted(&values),
                min: values[0],
                max: values[count - 1],
            })
        })
        .collect()
}

/// Mean of a non-empty slice. Falls back to summing `x / n` when the plain
/// sum leaves the Decimal range.
fn mean(values: &[Decimal]) -> Decimal {
    let n = Decimal::from(values.len() as u64);
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .map(|sum| sum / n)
        .unwrap_or_else(|| values.iter().map(|v| *v / n).sum())
}

/// Median of a sorted, non-empty slice.
fn median_sorted(sorted: &[Decimal]) -> Decimal {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
        lo.checked_add(hi)
            .map(|sum| sum / dec!(2))
            .unwrap_or_else(|| lo / dec!(2) + hi / dec!(2))
    }
}
