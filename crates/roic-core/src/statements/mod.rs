//! Boundary between a filings data provider and the ROIC engine.
//!
//! A provider hands over partially populated statements; this module turns
//! them into validated [`FinancialRecord`](crate::roic::FinancialRecord)s or
//! fails with an error that names what is missing. It never substitutes
//! estimated figures.

pub mod statement;
pub mod tax_rate;

pub use statement::{to_record, FinancialStatement};
pub use tax_rate::{effective_tax_rate, resolve_tax_rate, TaxRatePolicy, EFFECTIVE_TAX_RATE_CEILING};
