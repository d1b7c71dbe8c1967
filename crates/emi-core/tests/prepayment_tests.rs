use emi_core::prepayment::{self, PrepaymentPolicy, PrepaymentRequest};
use emi_core::types::{LoanTerms, Rounded};
use emi_core::EmiError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn scenario_one() -> LoanTerms {
    LoanTerms::new(dec!(1_000_000), dec!(10), 12, None).unwrap()
}

fn home_loan() -> LoanTerms {
    LoanTerms::new(dec!(2_500_000), dec!(8.5), 240, None).unwrap()
}

// ===========================================================================
// Extra per-period payments
// ===========================================================================

#[test]
fn test_extra_payment_shortens_tenure() {
    let policy = PrepaymentPolicy::ExtraPerPeriod {
        amount: dec!(10_000),
    };
    let result = prepayment::simulate(&scenario_one(), &policy).unwrap();

    assert!(result.new_tenure_periods < 12);
    assert_eq!(result.new_tenure_periods, 11);
    assert_eq!(result.tenure_reduced_by, 1);
    assert!(result.interest_saved > Decimal::ZERO);
    assert_eq!(
        result.interest_saved,
        result.baseline_interest - result.new_interest
    );
}

#[test]
fn test_extra_payment_on_twenty_year_loan() {
    let policy = PrepaymentPolicy::ExtraPerPeriod {
        amount: dec!(5_000),
    };
    let sim = prepayment::simulate_detailed(&home_loan(), &policy).unwrap();

    // 21,695.58 + 5,000 retires the loan in 155 months
    assert_eq!(sim.result.new_tenure_periods, 155);
    assert_eq!(sim.result.tenure_reduced_by, 85);
    assert_eq!(sim.baseline.len(), 240);

    let adjusted = sim.adjusted.entries();
    assert_eq!(adjusted.last().unwrap().remaining_balance, Decimal::ZERO);
    // Every full period pays EMI plus the extra amount
    assert!((adjusted[0].payment - (sim.emi + dec!(5_000))).abs() < dec!(0.000001));
    for e in adjusted {
        assert_eq!(e.principal_component + e.interest_component, e.payment);
    }
}

// ===========================================================================
// Lump-sum payments
// ===========================================================================

#[test]
fn test_lump_sum_keeps_emi_and_shortens_tenure() {
    let policy = PrepaymentPolicy::LumpSum {
        amount: dec!(200_000),
        after_period: 3,
    };
    let sim = prepayment::simulate_detailed(&scenario_one(), &policy).unwrap();

    assert_eq!(sim.result.new_tenure_periods, 10);
    assert_eq!(sim.result.tenure_reduced_by, 2);
    assert!(sim.result.interest_saved > dec!(14_000));

    let entries = sim.adjusted.entries();
    assert_eq!(entries[2].prepayment, dec!(200_000));
    assert!(entries.iter().filter(|e| !e.prepayment.is_zero()).count() == 1);
    // EMI is held constant through the period after the lump sum
    assert!((entries[3].payment - sim.emi).abs() < dec!(0.000001));
}

#[test]
fn test_lump_sum_larger_than_balance_retires_loan() {
    let policy = PrepaymentPolicy::LumpSum {
        amount: dec!(5_000_000),
        after_period: 6,
    };
    let out = prepayment::simulate_prepayment(&scenario_one(), &policy).unwrap();
    let result = &out.result.prepayment_result;

    assert_eq!(result.new_tenure_periods, 6);
    assert_eq!(result.tenure_reduced_by, 6);
    let last = out.result.adjusted_schedule.entries().last().unwrap();
    assert_eq!(last.remaining_balance, Decimal::ZERO);
    assert!(last.prepayment < dec!(5_000_000));
    assert!(out.warnings.iter().any(|w| w.contains("exceeds the outstanding balance")));
}

#[test]
fn test_lump_sum_in_final_period_saves_nothing() {
    let policy = PrepaymentPolicy::LumpSum {
        amount: dec!(1_000),
        after_period: 12,
    };
    let result = prepayment::simulate(&scenario_one(), &policy).unwrap();
    assert_eq!(result.tenure_reduced_by, 0);
    assert_eq!(result.interest_saved, Decimal::ZERO);
}

#[test]
fn test_lump_sum_on_home_loan() {
    let policy = PrepaymentPolicy::LumpSum {
        amount: dec!(500_000),
        after_period: 24,
    };
    let result = prepayment::simulate(&home_loan(), &policy)
        .unwrap()
        .rounded(2);
    assert_eq!(result.new_tenure_periods, 161);
    assert!(result.interest_saved > dec!(1_000_000));
}

#[test]
fn test_zero_rate_prepayment() {
    let loan = LoanTerms::new(dec!(500_000), Decimal::ZERO, 10, None).unwrap();
    let policy = PrepaymentPolicy::LumpSum {
        amount: dec!(100_000),
        after_period: 2,
    };
    let result = prepayment::simulate(&loan, &policy).unwrap();
    // 2 x 50,000 + 100,000 leaves 300,000 = 6 more periods
    assert_eq!(result.new_tenure_periods, 8);
    assert_eq!(result.interest_saved, Decimal::ZERO);
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_policy_validation() {
    let loan = scenario_one();
    let bad = [
        PrepaymentPolicy::LumpSum {
            amount: dec!(100),
            after_period: 0,
        },
        PrepaymentPolicy::LumpSum {
            amount: dec!(-100),
            after_period: 2,
        },
        PrepaymentPolicy::ExtraPerPeriod { amount: dec!(0) },
    ];
    for policy in bad {
        assert!(
            matches!(
                prepayment::simulate(&loan, &policy),
                Err(EmiError::InvalidPrepayment { .. })
            ),
            "policy {policy:?} should be rejected"
        );
    }
}

#[test]
fn test_request_conflict_reported_before_simulation() {
    let req: PrepaymentRequest = serde_json::from_str(
        r#"{"principal": 1000000, "rate": 10, "tenure": 12,
            "lump_sum": 50000, "after_month": 4, "extra_monthly": 2000}"#,
    )
    .unwrap();
    assert!(matches!(
        prepayment::simulate_request(&req),
        Err(EmiError::ConflictingPrepaymentInputs { .. })
    ));
}

#[test]
fn test_request_with_years_unit() {
    let req: PrepaymentRequest = serde_json::from_str(
        r#"{"principal": "2500000", "rate": "8.5", "tenure": 20, "unit": "years",
            "extra_monthly": 5000}"#,
    )
    .unwrap();
    let out = prepayment::simulate_request(&req).unwrap();
    assert_eq!(out.result.original.tenure_periods, 240);
    assert_eq!(out.result.prepayment_result.new_tenure_periods, 155);
}

#[test]
fn test_policy_serializes_as_tagged_variant() {
    let policy = PrepaymentPolicy::LumpSum {
        amount: dec!(1000),
        after_period: 3,
    };
    let json = serde_json::to_value(policy).unwrap();
    assert_eq!(json["type"], "lump_sum");
    assert_eq!(json["after_period"], 3);
}

// ===========================================================================
// Extreme inputs
// ===========================================================================

#[test]
fn test_extra_payment_overflow_is_an_error() {
    let policy = PrepaymentPolicy::ExtraPerPeriod {
        amount: Decimal::MAX,
    };
    assert!(matches!(
        prepayment::simulate(&scenario_one(), &policy),
        Err(EmiError::InvalidLoanTerms { ref field, .. }) if field == "extra_per_period"
    ));
}

#[test]
fn test_largest_lump_sum_retires_loan() {
    let policy = PrepaymentPolicy::LumpSum {
        amount: Decimal::MAX,
        after_period: 1,
    };
    let out = prepayment::simulate_prepayment(&scenario_one(), &policy).unwrap();
    assert_eq!(out.result.prepayment_result.new_tenure_periods, 1);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_oversized_loan_is_an_error() {
    let loan = LoanTerms::new(dec!(1e26), dec!(24), 600, None).unwrap();
    let policy = PrepaymentPolicy::ExtraPerPeriod {
        amount: dec!(1_000),
    };
    assert!(matches!(
        prepayment::simulate(&loan, &policy),
        Err(EmiError::InvalidLoanTerms { .. })
    ));
}
