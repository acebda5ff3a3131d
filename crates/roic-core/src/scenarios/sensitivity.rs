use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RoicError;
use crate::roic::{compute, compute_with, FinancialRecord, RoicAdjustments, RoicMethod};
use crate::types::*;
use crate::CoreResult;

/// Largest grid `roic_sensitivity` will evaluate.
pub const MAX_GRID_CELLS: usize = 10_000;

/// Input for a tax rate x capital adjustment ROIC grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoicSensitivityInput {
    /// Base case record
    pub record: FinancialRecord,
    pub method: RoicMethod,
    /// Rows: tax rate override
    pub tax_rate: SensitivityVariable,
    /// Columns: amount added to invested capital; a single zero column when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_adjustment: Option<SensitivityVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoicSensitivityOutput {
    pub method: RoicMethod,
    pub tax_rate_values: Vec<Rate>,
    pub capital_adjustment_values: Vec<Money>,
    /// matrix[i][j] = ROIC at tax_rate_values[i] and capital_adjustment_values[j]
    pub matrix: Vec<Vec<Rate>>,
    /// ROIC of the unadjusted record
    pub base_case_value: Rate,
    /// Cell closest to the record's own tax rate and a zero adjustment (row, col)
    pub base_case_position: (usize, usize),
}

/// Sweep one ROIC method across tax rates and capital adjustments.
pub fn roic_sensitivity(
    input: &RoicSensitivityInput,
) -> CoreResult<ComputationOutput<RoicSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let tax_values = generate_sweep_values(&input.tax_rate, MAX_GRID_CELLS)?;
    let capital_values = match &input.capital_adjustment {
        Some(var) => generate_sweep_values(var, MAX_GRID_CELLS / tax_values.len())?,
        None => vec![Decimal::ZERO],
    };

    let cells = tax_values.len() * capital_values.len();
    if cells > MAX_GRID_CELLS {
        return Err(RoicError::InvalidInput {
            field: "grid".into(),
            reason: format!("{cells} cells exceeds the limit of {MAX_GRID_CELLS}"),
        });
    }

    if tax_values.iter().any(|t| *t < Decimal::ZERO || *t > Decimal::ONE) {
        warnings.push("Tax rate sweep extends outside [0, 1]".into());
    }

    let mut saturated = 0usize;
    let mut overflowed = 0usize;
    let mut matrix = Vec::with_capacity(tax_values.len());
    for tax_rate in &tax_values {
        let mut row = Vec::with_capacity(capital_values.len());
        for adjustment in &capital_values {
            let adjustments = RoicAdjustments {
                tax_rate_override: Some(*tax_rate),
                capital_adjustment: input.capital_adjustment.as_ref().map(|_| *adjustment),
            };
            let result = compute_with(&input.record, input.method, &adjustments);
            if result.is_saturated() {
                saturated += 1;
            }
            if result.overflowed {
                overflowed += 1;
            }
            row.push(result.roic);
        }
        matrix.push(row);
    }
    if saturated > 0 {
        warnings.push(format!(
            "{saturated} of {cells} cells have non-positive invested capital; ROIC set to 0"
        ));
    }
    if overflowed > 0 {
        warnings.push(format!(
            "{overflowed} of {cells} cells exceed the decimal range; ROIC set to 0"
        ));
    }

    let base_case_value = compute(&input.record, input.method).roic;
    let base_row = closest_index(&tax_values, input.record.tax_rate);
    let base_col = closest_index(&capital_values, Decimal::ZERO);
    if tax_values[base_row] != input.record.tax_rate {
        warnings.push(format!(
            "Record tax rate {} is not on the sweep; nearest row is {}",
            input.record.tax_rate, tax_values[base_row]
        ));
    }
    if !capital_values[base_col].is_zero() {
        warnings.push(format!(
            "Zero capital adjustment is not on the sweep; nearest column is {}",
            capital_values[base_col]
        ));
    }

    let output = RoicSensitivityOutput {
        method: input.method,
        tax_rate_values: tax_values,
        capital_adjustment_values: capital_values,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ROIC sensitivity: tax rate x invested capital adjustment",
        &serde_json::json!({
            "method": input.method,
            "rows": input.tax_rate.name,
            "columns": input.capital_adjustment.as_ref().map(|v| v.name.clone()),
            "base_tax_rate": input.record.tax_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Sweep values from min to max by step. Max is always included.
fn generate_sweep_values(var: &SensitivityVariable, limit: usize) -> CoreResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(RoicError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(RoicError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    // Checked before allocating so a tiny step cannot run away.
    let steps = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .and_then(|n| n.ceil().to_usize());
    match steps {
        Some(n) if n < limit => {}
        _ => {
            return Err(RoicError::InvalidInput {
                field: format!("variable:{}", var.name),
                reason: format!("Sweep exceeds the grid limit of {MAX_GRID_CELLS} cells"),
            })
        }
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        current = match current.checked_add(var.step) {
            Some(next) => next,
            None => break,
        };
    }
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }
    Ok(values)
}

fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| v.checked_sub(target).map_or(Decimal::MAX, |d| d.abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
