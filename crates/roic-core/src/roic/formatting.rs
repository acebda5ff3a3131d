//! Display helpers for ROIC figures.
//!
//! Currency units are data, not code: a [`UnitTable`] lists the display units
//! (e.g. 兆 / 億 / 万 for yen, T / B / M / K for short-scale currencies) and can
//! be loaded from configuration.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RoicError;
use crate::types::{Money, Rate};
use crate::CoreResult;

/// Render a ratio as a percentage with exactly two decimals (`0.1234` -> `12.34%`).
///
/// Rounds half away from zero. A value that rounds to zero prints `0.00%`.
pub fn format_percentage(roic: Rate) -> String {
    match roic.checked_mul(dec!(100)) {
        Some(pct) => {
            let pct = pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let pct = if pct.is_zero() { Decimal::ZERO } else { pct };
            format!("{pct:.2}%")
        }
        None => {
            // Ratios this large carry at most two fraction digits; move them
            // in front of the point instead of multiplying.
            let text = format!("{roic:.2}");
            let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
            format!("{int_part}{frac_part}.00%")
        }
    }
}

/// One display unit, e.g. 億 = 10^8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayUnit {
    pub scale: Decimal,
    pub suffix: String,
    /// Fraction digits kept after scaling; trailing zeros are trimmed
    #[serde(default)]
    pub max_fraction_digits: u32,
}

impl DisplayUnit {
    pub fn new(scale: Decimal, suffix: &str, max_fraction_digits: u32) -> Self {
        Self {
            scale,
            suffix: suffix.to_string(),
            max_fraction_digits,
        }
    }
}

/// Unit table used by [`format_currency`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTable {
    /// Printed before the number, after any minus sign (e.g. `$`)
    #[serde(default)]
    pub prefix: String,
    pub units: Vec<DisplayUnit>,
    /// Suffix for amounts below every unit
    #[serde(default)]
    pub base_suffix: String,
    /// Returned for zero or missing amounts
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_placeholder() -> String {
    "-".to_string()
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::japanese_yen()
    }
}

impl UnitTable {
    /// 兆円 / 億円 / 万円 / 円.
    pub fn japanese_yen() -> Self {
        Self {
            prefix: String::new(),
            units: vec![
                DisplayUnit::new(dec!(1_000_000_000_000), "兆円", 1),
                DisplayUnit::new(dec!(100_000_000), "億円", 1),
                DisplayUnit::new(dec!(10_000), "万円", 0),
            ],
            base_suffix: "円".to_string(),
            placeholder: default_placeholder(),
        }
    }

    /// Short-scale units (T / B / M / K) with a currency prefix such as `$`.
    pub fn short_scale(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            units: vec![
                DisplayUnit::new(dec!(1_000_000_000_000), "T", 1),
                DisplayUnit::new(dec!(1_000_000_000), "B", 1),
                DisplayUnit::new(dec!(1_000_000), "M", 1),
                DisplayUnit::new(dec!(1_000), "K", 1),
            ],
            base_suffix: String::new(),
            placeholder: default_placeholder(),
        }
    }

    /// Look up a named preset: `ja`/`jpy` or `en`/`usd`.
    pub fn preset(name: &str) -> CoreResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ja" | "jpy" | "yen" => Ok(Self::japanese_yen()),
            "en" | "usd" => Ok(Self::short_scale("$")),
            "short" => Ok(Self::short_scale("")),
            other => Err(RoicError::InvalidInput {
                field: "units".into(),
                reason: format!("Unknown unit preset '{other}'; expected ja, en or short"),
            }),
        }
    }

    /// Largest unit whose scale does not exceed `magnitude`. Units with a
    /// scale below one are ignored.
    fn unit_for(&self, magnitude: Decimal) -> Option<&DisplayUnit> {
        self.units
            .iter()
            .filter(|u| u.scale >= Decimal::ONE && u.scale <= magnitude)
            .max_by_key(|u| u.scale)
    }
}

/// Render a monetary amount in the largest applicable unit of `units`.
///
/// `None` and zero render as the table's placeholder. Amounts below every
/// unit print as whole numbers, or with two decimals when smaller than one.
pub fn format_currency(amount: Option<Money>, units: &UnitTable) -> String {
    let amount = match amount {
        Some(a) if !a.is_zero() => a,
        _ => return units.placeholder.clone(),
    };
    let magnitude = amount.abs();

    let mut unit = units.unit_for(magnitude);
    let mut rounded = round_in_unit(magnitude, unit);
    // Rounding can carry into the next unit (9,999.6 -> 1万, not 10,000円).
    let carried = match unit {
        Some(u) => rounded.checked_mul(u.scale),
        None => Some(rounded),
    };
    if let Some(carried) = carried {
        let larger = units.unit_for(carried);
        if larger.map(|u| u.scale) > unit.map(|u| u.scale) {
            unit = larger;
            rounded = round_in_unit(carried, unit);
        }
    }

    let body = match unit {
        Some(u) => format!("{}{}", group_thousands(rounded.normalize()), u.suffix),
        None if magnitude >= Decimal::ONE => {
            format!("{}{}", group_thousands(rounded), units.base_suffix)
        }
        None => format!("{rounded:.2}{}", units.base_suffix),
    };

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{body}", units.prefix)
}

/// `magnitude` expressed in `unit` and rounded for display. Without a unit,
/// whole numbers from one upwards and cents below one.
fn round_in_unit(magnitude: Decimal, unit: Option<&DisplayUnit>) -> Decimal {
    let (value, digits) = match unit {
        // scale >= 1, so the quotient cannot overflow
        Some(u) => (magnitude / u.scale, u.max_fraction_digits),
        None if magnitude >= Decimal::ONE => (magnitude, 0),
        None => (magnitude, 2),
    };
    value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Insert `,` every three digits of the integer part of a non-negative value.
fn group_thousands(value: Decimal) -> String {
    let text = value.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
