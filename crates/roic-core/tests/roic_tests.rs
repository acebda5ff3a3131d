use pretty_assertions::assert_eq;
use roic_core::roic::{
    self, calculate_roic, classify, compute_all, format_currency, format_percentage,
    FinancialRecord, RoicAdjustments, RoicInput, RoicLevel, RoicMethod, UnitTable,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference scenarios
// ===========================================================================

fn scenario_record() -> FinancialRecord {
    FinancialRecord {
        operating_income: dec!(100_000_000),
        interest_income: dec!(5_000_000),
        tax_rate: dec!(0.30),
        total_assets: dec!(1_000_000_000),
        cash_and_equivalents: dec!(100_000_000),
        shareholders_equity: dec!(400_000_000),
        interest_bearing_debt: dec!(300_000_000),
        accounts_payable: dec!(50_000_000),
        accrued_expenses: dec!(30_000_000),
        lease_expense: Some(dec!(10_000_000)),
        lease_debt: Some(dec!(80_000_000)),
    }
}

/// Mid-sized manufacturer used by the dashboard's demo screen
fn sample_company() -> FinancialRecord {
    FinancialRecord {
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
    }
}

#[test]
fn test_basic_scenario() {
    let r = roic::basic(&scenario_record());
    assert_eq!(r.nopat, dec!(70_000_000));
    assert_eq!(r.invested_capital, dec!(900_000_000));
    assert_eq!(r.roic.round_dp(4), dec!(0.0778));
    assert_eq!(format_percentage(r.roic), "7.78%");
}

#[test]
fn test_detailed_scenario() {
    let r = roic::detailed(&scenario_record());
    assert_eq!(r.nopat, dec!(73_500_000));
    assert_eq!(r.invested_capital, dec!(700_000_000));
    assert_eq!(r.roic, dec!(0.105));
    assert_eq!(classify(r.roic).level, RoicLevel::Good);
}

#[test]
fn test_asset_scenario() {
    let r = roic::asset(&scenario_record());
    assert_eq!(r.nopat, dec!(73_500_000));
    // 1B - 50M - 30M
    assert_eq!(r.invested_capital, dec!(920_000_000));
}

#[test]
fn test_modified_scenario() {
    let r = roic::modified(&scenario_record());
    assert_eq!(r.nopat, dec!(80_500_000));
    assert_eq!(r.invested_capital, dec!(780_000_000));
    assert_eq!(r.roic.round_dp(4), dec!(0.1032));
}

// ===========================================================================
// Structural properties
// ===========================================================================

#[test]
fn test_compute_all_tags_each_method() {
    let suite = compute_all(&sample_company());
    let methods: Vec<RoicMethod> = suite.iter().map(|r| r.method).collect();
    assert_eq!(methods, RoicMethod::ALL.to_vec());
    for method in RoicMethod::ALL {
        assert_eq!(suite.get(method).method, method);
    }
}

#[test]
fn test_non_positive_capital_gives_zero_for_every_method() {
    let record = FinancialRecord {
        operating_income: dec!(50),
        interest_income: dec!(5),
        tax_rate: dec!(0.3),
        total_assets: dec!(100),
        cash_and_equivalents: dec!(150),
        shareholders_equity: dec!(-40),
        interest_bearing_debt: dec!(10),
        accounts_payable: dec!(60),
        accrued_expenses: dec!(40),
        lease_expense: None,
        lease_debt: Some(dec!(20)),
    };
    for r in compute_all(&record).iter() {
        assert!(r.invested_capital <= Decimal::ZERO, "{}", r.method);
        assert_eq!(r.roic, Decimal::ZERO, "{}", r.method);
    }
}

#[test]
fn test_absent_lease_fields_make_modified_equal_detailed() {
    let mut record = sample_company();
    record.lease_expense = None;
    record.lease_debt = None;
    let suite = compute_all(&record);
    let d = suite.get(RoicMethod::Detailed);
    let m = suite.get(RoicMethod::Modified);
    assert_eq!(m.nopat, d.nopat);
    assert_eq!(m.invested_capital, d.invested_capital);
    assert_eq!(m.roic, d.roic);
}

#[test]
fn test_breakdown_is_in_computation_order() {
    let r = roic::basic(&sample_company());
    let labels: Vec<&str> = r.breakdown.labels().collect();
    assert_eq!(
        labels,
        vec![
            "Operating income",
            "Tax rate",
            "NOPAT",
            "Total assets",
            "Cash and equivalents",
            "Invested capital",
        ]
    );
}

#[test]
fn test_breakdown_serialises_in_order() {
    let r = roic::detailed(&sample_company());
    let json = serde_json::to_string(&r.breakdown).unwrap();
    let op = json.find("Operating income").unwrap();
    let nopat = json.find("NOPAT").unwrap();
    let ic = json.find("Invested capital").unwrap();
    assert!(op < nopat && nopat < ic);
}

// ===========================================================================
// Presets and analysis envelope
// ===========================================================================

#[test]
fn test_conservative_and_aggressive_presets() {
    let record = sample_company();
    let conservative = roic::compute_with(
        &record,
        RoicMethod::Basic,
        &RoicAdjustments::conservative(&record),
    );
    let aggressive = roic::compute_with(
        &record,
        RoicMethod::Basic,
        &RoicAdjustments::aggressive(&record),
    );
    let standard = roic::basic(&record);
    // 150k x 0.65 and 150k x 0.75
    assert_eq!(conservative.nopat, dec!(97_500));
    assert_eq!(aggressive.nopat, dec!(112_500));
    assert!(conservative.roic < standard.roic && standard.roic < aggressive.roic);
}

#[test]
fn test_calculate_roic_envelope_json() {
    let out = calculate_roic(&RoicInput::from(sample_company())).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    let reports = value["result"]["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0]["result"]["method"], "basic");
    assert_eq!(reports[0]["roic_percentage"], "5.83%");
    assert_eq!(reports[0]["evaluation"]["level"], "average");
    assert_eq!(value["methodology"], "ROIC = NOPAT / invested capital");
}

#[test]
fn test_method_names_parse() {
    assert_eq!("Detailed".parse::<RoicMethod>().unwrap(), RoicMethod::Detailed);
    assert_eq!(" asset ".parse::<RoicMethod>().unwrap(), RoicMethod::Asset);
    assert!("ebitda".parse::<RoicMethod>().is_err());
}

// ===========================================================================
// Display helpers
// ===========================================================================

#[test]
fn test_percentage_examples() {
    assert_eq!(format_percentage(dec!(0.1234)), "12.34%");
    assert_eq!(format_percentage(dec!(-0.05)), "-5.00%");
    assert_eq!(format_percentage(Decimal::ZERO), "0.00%");
}

#[test]
fn test_classification_boundaries() {
    assert_eq!(classify(dec!(0.15)).level, RoicLevel::Excellent);
    assert_eq!(classify(dec!(0.1499)).level, RoicLevel::Good);
    assert_eq!(classify(dec!(0.10)).level, RoicLevel::Good);
    assert_eq!(classify(dec!(0.05)).level, RoicLevel::Average);
    assert_eq!(classify(dec!(0.0499)).level, RoicLevel::Poor);
    assert_eq!(classify(dec!(-0.05)).level, RoicLevel::Poor);
}

#[test]
fn test_currency_in_yen() {
    let ja = UnitTable::default();
    assert_eq!(format_currency(Some(dec!(1_500_000_000_000)), &ja), "1.5兆円");
    assert_eq!(format_currency(Some(dec!(150_000_000_000)), &ja), "1,500億円");
    assert_eq!(format_currency(None, &ja), "-");
}
