use emi_core::comparison::{self, ComparisonRequest};
use emi_core::config::EngineLimits;
use emi_core::types::{LoanTerms, Rounded};
use emi_core::EmiError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(principal: Decimal, rate: Decimal, tenure: u32) -> LoanTerms {
    LoanTerms::new(principal, rate, tenure, None).unwrap()
}

// ===========================================================================
// Ranking
// ===========================================================================

#[test]
fn test_cheaper_rate_is_best_option() {
    let entries = comparison::compare(&[
        loan(dec!(100_000), dec!(8), 24),
        loan(dec!(100_000), dec!(12), 24),
    ])
    .unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_best_option, "loan A should win");
    assert!(!entries[1].is_best_option);

    // A: EMI ~4,522.73, interest ~8,545.50; B: EMI ~4,707.35, interest ~12,976.33
    let a = entries[0].clone().rounded(2);
    let b = entries[1].clone().rounded(2);
    assert_eq!(a.emi, dec!(4522.73));
    assert_eq!(b.emi, dec!(4707.35));
    assert_eq!(a.total_interest, dec!(8545.50));
    assert_eq!(b.total_interest, dec!(12976.33));
    assert_eq!(a.efficiency_score, dec!(92.13));
    assert_eq!(b.efficiency_score, dec!(88.51));
}

#[test]
fn test_shorter_tenure_beats_longer_at_same_rate() {
    let entries = comparison::compare(&[
        loan(dec!(1_000_000), dec!(8.5), 240),
        loan(dec!(1_000_000), dec!(8.5), 120),
        loan(dec!(1_000_000), dec!(8.2), 240),
    ])
    .unwrap();

    let best: Vec<usize> = entries
        .iter()
        .filter(|e| e.is_best_option)
        .map(|e| e.loan_id)
        .collect();
    assert_eq!(best, vec![2]);
    assert_eq!(entries[1].rank, 1);
    assert_eq!(entries[2].rank, 2);
    assert_eq!(entries[0].rank, 3);
}

#[test]
fn test_interest_free_offer_scores_one_hundred() {
    let entries = comparison::compare(&[
        loan(dec!(50_000), Decimal::ZERO, 12),
        loan(dec!(50_000), dec!(1), 12),
    ])
    .unwrap();
    assert_eq!(entries[0].efficiency_score, dec!(100));
    assert!(entries[0].is_best_option);
}

#[test]
fn test_comparison_is_deterministic() {
    let loans = [
        loan(dec!(750_000), dec!(9.1), 180),
        loan(dec!(750_000), dec!(9.1), 180),
        loan(dec!(700_000), dec!(9.4), 180),
    ];
    let first = comparison::compare(&loans).unwrap();
    let second = comparison::compare(&loans).unwrap();
    assert_eq!(first, second);
    assert!(first[0].is_best_option);
    assert!(!first[1].is_best_option);
}

// ===========================================================================
// Request boundary and limits
// ===========================================================================

#[test]
fn test_wire_request_with_limits() {
    let request: ComparisonRequest = serde_json::from_str(
        r#"{"loans": [
            {"principal": 1000000, "rate": 8.5, "tenure": 240},
            {"principal": 1000000, "rate": 8.2, "tenure": 240}
        ]}"#,
    )
    .unwrap();
    let out = comparison::compare_loans(&request, Some(&EngineLimits::default())).unwrap();

    assert_eq!(out.result.best_loan_id, 2);
    assert!(out.warnings.is_empty());
    assert_eq!(out.result.entries.iter().filter(|e| e.is_best_option).count(), 1);
}

#[test]
fn test_wire_request_too_few_loans() {
    let request: ComparisonRequest = serde_json::from_str(
        r#"{"loans": [{"principal": 1000000, "rate": 8.5, "tenure": 240}]}"#,
    )
    .unwrap();
    assert!(matches!(
        comparison::compare_loans(&request, None),
        Err(EmiError::InsufficientLoans { count: 1, .. })
    ));
}

#[test]
fn test_limits_reject_out_of_range_offer() {
    let loans = [
        loan(dec!(100_000), dec!(8), 24),
        loan(dec!(100_000), dec!(65), 24),
    ];
    assert!(matches!(
        comparison::compare_with_limits(&loans, &EngineLimits::default()),
        Err(EmiError::LimitExceeded { .. })
    ));
    assert!(comparison::compare(&loans).is_ok());
}

#[test]
fn test_different_principals_flagged() {
    let request: ComparisonRequest = serde_json::from_str(
        r#"{"loans": [
            {"principal": 100000, "rate": 8, "tenure": 24},
            {"principal": 200000, "rate": 9, "tenure": 2, "unit": "years"}
        ]}"#,
    )
    .unwrap();
    let out = comparison::compare_loans(&request, None).unwrap();
    assert_eq!(out.warnings.len(), 1);
    // Lower rate wins regardless of loan size
    assert_eq!(out.result.best_loan_id, 1);
}

#[test]
fn test_oversized_offer_is_an_error() {
    let loans = [
        loan(dec!(100_000), dec!(8), 24),
        loan(dec!(1e26), dec!(24), 600),
    ];
    assert!(matches!(
        comparison::compare(&loans),
        Err(EmiError::InvalidLoanTerms { .. })
    ));
}

#[test]
fn test_totals_agree_with_loan_summary() {
    let terms = loan(dec!(1_000_000), dec!(10), 12);
    let summary = emi_core::emi::summarize(&terms).unwrap();
    let entries = comparison::compare(&[terms, loan(dec!(1_000_000), dec!(11), 12)]).unwrap();
    assert_eq!(entries[0].total_interest, summary.total_interest);
    assert_eq!(entries[0].total_payment, summary.total_payment);
}
