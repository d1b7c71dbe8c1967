use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::EngineLimits;
use crate::emi;
use crate::error::EmiError;
use crate::types::*;
use crate::EmiResult;

const MIN_LOANS: usize = 2;

/// One row of a loan comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// 1-based position of the loan in the input.
    pub loan_id: usize,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_periods: u32,
    pub emi: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    /// Share of total outlay that repays principal, 0-100. Higher is better.
    pub efficiency_score: Decimal,
    /// 1 = best.
    pub rank: usize,
    pub is_best_option: bool,
}

impl Rounded for ComparisonEntry {
    fn rounded(self, dp: u32) -> Self {
        ComparisonEntry {
            principal: round_money(self.principal, dp),
            emi: round_money(self.emi, dp),
            total_interest: round_money(self.total_interest, dp),
            total_payment: round_money(self.total_payment, dp),
            efficiency_score: round_money(self.efficiency_score, dp),
            ..self
        }
    }
}

/// Efficiency score: `(1 − total_interest / total_payment) · 100`.
///
/// Equals `principal / total_payment · 100`; an interest-free loan scores 100.
pub fn efficiency_score(total_interest: Money, total_payment: Money) -> EmiResult<Decimal> {
    if total_payment <= Decimal::ZERO {
        return Err(EmiError::InvalidLoanTerms {
            field: "total_payment".into(),
            reason: "Total payment must be positive".into(),
        });
    }
    Ok((Decimal::ONE - total_interest / total_payment) * dec!(100))
}

/// Compare loans and mark the one with the highest efficiency score.
///
/// Entries keep input order. Ties on score resolve to the earliest-listed loan.
pub fn compare(loans: &[LoanTerms]) -> EmiResult<Vec<ComparisonEntry>> {
    if loans.len() < MIN_LOANS {
        return Err(EmiError::InsufficientLoans {
            count: loans.len(),
            min: MIN_LOANS,
        });
    }

    let mut entries = Vec::with_capacity(loans.len());
    for (idx, loan) in loans.iter().enumerate() {
        let summary = emi::summarize(loan)?;

        entries.push(ComparisonEntry {
            loan_id: idx + 1,
            principal: loan.principal,
            annual_rate_percent: loan.annual_rate_percent,
            tenure_periods: loan.tenure_periods,
            emi: summary.emi,
            total_interest: summary.total_interest,
            total_payment: summary.total_payment,
            efficiency_score: efficiency_score(summary.total_interest, summary.total_payment)?,
            rank: 0,
            is_best_option: false,
        });
    }

    // Stable sort: equal scores keep input order.
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[b].efficiency_score.cmp(&entries[a].efficiency_score));

    for (position, &idx) in order.iter().enumerate() {
        entries[idx].rank = position + 1;
    }
    let best = order[0];
    entries[best].is_best_option = true;

    tracing::debug!(
        loans = entries.len(),
        best_loan_id = entries[best].loan_id,
        score = %entries[best].efficiency_score,
        "loan comparison ranked"
    );

    Ok(entries)
}

/// `compare` with the configured ceiling on the number of offers.
pub fn compare_with_limits(
    loans: &[LoanTerms],
    limits: &EngineLimits,
) -> EmiResult<Vec<ComparisonEntry>> {
    limits.check_loan_count(loans.len())?;
    for loan in loans {
        limits.check_terms(loan)?;
    }
    compare(loans)
}

/// Comparison request in its wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub loans: Vec<LoanRequest>,
}

impl ComparisonRequest {
    pub fn loan_terms(&self) -> EmiResult<Vec<LoanTerms>> {
        self.loans.iter().map(LoanRequest::to_terms).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub best_loan_id: usize,
    pub entries: Vec<ComparisonEntry>,
}

impl Rounded for ComparisonOutput {
    fn rounded(self, dp: u32) -> Self {
        ComparisonOutput {
            best_loan_id: self.best_loan_id,
            entries: self.entries.into_iter().map(|e| e.rounded(dp)).collect(),
        }
    }
}

/// Compare loans from a wire request, optionally enforcing limits, wrapped in the output envelope.
pub fn compare_loans(
    request: &ComparisonRequest,
    limits: Option<&EngineLimits>,
) -> EmiResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loans = request.loan_terms()?;
    let entries = match limits {
        Some(limits) => compare_with_limits(&loans, limits)?,
        None => compare(&loans)?,
    };

    let best_loan_id = entries
        .iter()
        .find(|e| e.is_best_option)
        .map(|e| e.loan_id)
        .unwrap_or(1);

    let principals_differ = loans.windows(2).any(|w| w[0].principal != w[1].principal);
    if principals_differ {
        warnings.push("Loans have different principals; scores compare cost ratios, not absolute cost".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan comparison by efficiency score (1 - total interest / total payment)",
        &serde_json::json!({
            "loans": loans.len(),
            "tie_break": "earliest listed",
        }),
        warnings,
        elapsed,
        ComparisonOutput {
            best_loan_id,
            entries,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(principal: Money, rate: Percent, tenure: u32) -> LoanTerms {
        LoanTerms::new(principal, rate, tenure, None).unwrap()
    }

    #[test]
    fn test_efficiency_score_interest_free() {
        assert_eq!(efficiency_score(Decimal::ZERO, dec!(1000)).unwrap(), dec!(100));
    }

    #[test]
    fn test_lower_rate_wins() {
        let entries = compare(&[
            loan(dec!(100_000), dec!(8), 24),
            loan(dec!(100_000), dec!(12), 24),
        ])
        .unwrap();
        assert!(entries[0].is_best_option);
        assert!(!entries[1].is_best_option);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].rank, 2);
        assert!(entries[0].total_interest < entries[1].total_interest);
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let entries = compare(&[
            loan(dec!(50_000), dec!(9), 36),
            loan(dec!(50_000), dec!(9), 36),
            loan(dec!(50_000), dec!(9), 36),
        ])
        .unwrap();
        let best: Vec<usize> = entries
            .iter()
            .filter(|e| e.is_best_option)
            .map(|e| e.loan_id)
            .collect();
        assert_eq!(best, vec![1]);
        assert_eq!(entries.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_totals_match_loan_summary() {
        let terms = loan(dec!(2_500_000), dec!(8.5), 240);
        let summary = emi::summarize(&terms).unwrap();
        let entries = compare(&[terms.clone(), loan(dec!(2_500_000), dec!(9), 240)]).unwrap();
        assert_eq!(entries[0].emi, summary.emi);
        assert_eq!(entries[0].total_interest, summary.total_interest);
        assert_eq!(entries[0].total_payment, summary.total_payment);
    }

    #[test]
    fn test_single_loan_rejected() {
        let err = compare(&[loan(dec!(50_000), dec!(9), 36)]).unwrap_err();
        assert!(matches!(err, EmiError::InsufficientLoans { count: 1, min: 2 }));
    }

    #[test]
    fn test_limits_cap_offer_count() {
        let loans = vec![loan(dec!(50_000), dec!(9), 36); 4];
        let err = compare_with_limits(&loans, &EngineLimits::default()).unwrap_err();
        assert!(matches!(err, EmiError::TooManyLoans { count: 4, max: 3 }));
        assert!(compare(&loans).is_ok());
    }
}
