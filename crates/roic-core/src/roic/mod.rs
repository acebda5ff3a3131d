//! ROIC engine.
//!
//! Four formulas over one [`FinancialRecord`]:
//! - basic:    OI x (1 - t) / (total assets - cash)
//! - detailed: (OI + interest income) x (1 - t) / (equity + interest-bearing debt)
//! - asset:    detailed NOPAT / (total assets - payables - accrued expenses)
//! - modified: detailed plus after-tax lease expense and lease debt
//!
//! Every formula reports ROIC = 0 when its invested capital is not positive.
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

pub mod analysis;
pub mod breakdown;
pub mod evaluation;
pub mod formatting;
pub mod methods;
pub mod record;

pub use analysis::{calculate_roic, MethodReport, RoicAnalysis, RoicInput};
pub use breakdown::{labels, Breakdown};
pub use evaluation::{classify, RoicEvaluation, RoicLevel};
pub use formatting::{format_currency, format_percentage, DisplayUnit, UnitTable};
pub use methods::{
    asset, basic, compute, compute_all, compute_all_with, compute_with, detailed, modified,
    RoicAdjustments, RoicMethod, RoicResult, RoicSuite,
};
pub use record::FinancialRecord;
