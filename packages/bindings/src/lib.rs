use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use roic_core::roic::{self, FinancialRecord, RoicMethod, UnitTable};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, value: &str) -> NapiResult<Decimal> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| to_napi_error(format!("{field}: '{value}' is not a decimal ({e})")))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Full analysis envelope: every requested method with formatting and bands.
#[napi]
pub fn calculate_roic(input_json: String) -> NapiResult<String> {
    let input: roic::RoicInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = roic::calculate_roic(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_roic_method(record_json: String, method: String) -> NapiResult<String> {
    let record: FinancialRecord = serde_json::from_str(&record_json).map_err(to_napi_error)?;
    let method: RoicMethod = method.parse().map_err(to_napi_error)?;
    serde_json::to_string(&roic::compute(&record, method)).map_err(to_napi_error)
}

#[napi]
pub fn compute_all_roic(record_json: String) -> NapiResult<String> {
    let record: FinancialRecord = serde_json::from_str(&record_json).map_err(to_napi_error)?;
    serde_json::to_string(&roic::compute_all(&record)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[napi]
pub fn classify_roic(roic: String) -> NapiResult<String> {
    let value = parse_decimal("roic", &roic)?;
    serde_json::to_string(&roic::classify(value)).map_err(to_napi_error)
}

#[napi]
pub fn format_roic_percentage(roic: String) -> NapiResult<String> {
    Ok(roic::format_percentage(parse_decimal("roic", &roic)?))
}

/// `units` is a preset name (`ja`, `en`, `short`) or a JSON unit table;
/// yen units when omitted.
#[napi]
pub fn format_roic_currency(amount: Option<String>, units: Option<String>) -> NapiResult<String> {
    let amount = amount
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_decimal("amount", s))
        .transpose()?;
    let table = match units.as_deref().map(str::trim) {
        None | Some("") => UnitTable::default(),
        Some(json) if json.starts_with('{') => {
            serde_json::from_str::<UnitTable>(json).map_err(to_napi_error)?
        }
        Some(name) => UnitTable::preset(name).map_err(to_napi_error)?,
    };
    Ok(roic::format_currency(amount, &table))
}

// ---------------------------------------------------------------------------
// Scenarios and batch
// ---------------------------------------------------------------------------

#[napi]
pub fn roic_sensitivity(input_json: String) -> NapiResult<String> {
    let input: roic_core::scenarios::RoicSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = roic_core::scenarios::roic_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_roic_batch(input_json: String) -> NapiResult<String> {
    let input: roic_core::batch::BatchInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = roic_core::batch::calculate_batch(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
