use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EmiError;
use crate::rate;
use crate::schedule;
use crate::types::*;
use crate::EmiResult;

/// Loan summary: the fixed payment and the totals it implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiOutput {
    pub emi: Money,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub period_rate_percent: Percent,
    pub effective_annual_rate_percent: Percent,
    pub total_interest: Money,
    pub total_payment: Money,
    pub tenure_periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Rounded for EmiOutput {
    fn rounded(self, dp: u32) -> Self {
        EmiOutput {
            emi: round_money(self.emi, dp),
            principal: round_money(self.principal, dp),
            annual_rate_percent: round_money(self.annual_rate_percent, dp),
            period_rate_percent: round_money(self.period_rate_percent, dp),
            effective_annual_rate_percent: round_money(self.effective_annual_rate_percent, dp),
            total_interest: round_money(self.total_interest, dp),
            total_payment: round_money(self.total_payment, dp),
            ..self
        }
    }
}

/// Fixed periodic payment that fully amortizes `principal` over `periods`.
///
/// Standard annuity formula `P·r·(1+r)^n / ((1+r)^n − 1)`; an interest-free
/// loan (`r == 0`) is special-cased to `P / n`.
pub fn compute_emi(principal: Money, period_rate: Rate, periods: u32) -> EmiResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(EmiError::InvalidLoanTerms {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    rate::check_periods(periods)?;
    if period_rate < Decimal::ZERO {
        return Err(EmiError::InvalidLoanTerms {
            field: "period_rate".into(),
            reason: "Period rate cannot be negative".into(),
        });
    }

    if period_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = rate::compound_factor(period_rate, periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(EmiError::InvalidLoanTerms {
            field: "period_rate".into(),
            reason: "Period rate too small to compound at decimal precision".into(),
        });
    }

    principal
        .checked_mul(period_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| rate::overflow("emi"))
}

/// Payment date of the period with 1-based `index`: `start` advanced by
/// `index - 1` calendar months. Day-of-month clamps to the end of shorter
/// months (Jan 31 -> Feb 28/29 -> Mar 31), each date derived from `start`.
pub fn payment_date(start: NaiveDate, index: u32) -> EmiResult<NaiveDate> {
    start
        .checked_add_months(Months::new(index.saturating_sub(1)))
        .ok_or_else(|| EmiError::DateError(format!("payment date for period {index} out of range")))
}

/// Compute the loan summary for validated terms.
///
/// Totals are summed from the generated schedule, so they match what
/// `build_schedule` and the comparator report for the same loan.
pub fn summarize(terms: &LoanTerms) -> EmiResult<EmiOutput> {
    terms.validate()?;

    let period_rate = terms.period_rate();
    let emi = compute_emi(terms.principal, period_rate, terms.tenure_periods)?;
    let sched = schedule::generate(
        terms.principal,
        period_rate,
        emi,
        terms.tenure_periods,
        terms.start_date,
    )?;
    let total_payment = sched.total_payment();
    let total_interest = sched.total_interest();

    let end_date = match terms.start_date {
        Some(start) => Some(
            start
                .checked_add_months(Months::new(terms.tenure_periods))
                .ok_or_else(|| EmiError::DateError("loan end date out of range".into()))?,
        ),
        None => None,
    };

    Ok(EmiOutput {
        emi,
        principal: terms.principal,
        annual_rate_percent: terms.annual_rate_percent,
        period_rate_percent: period_rate * dec!(100),
        effective_annual_rate_percent: rate::effective_annual_rate(period_rate)?,
        total_interest,
        total_payment,
        tenure_periods: terms.tenure_periods,
        end_date,
    })
}

/// Loan summary wrapped in the standard output envelope.
pub fn calculate_emi(terms: &LoanTerms) -> EmiResult<ComputationOutput<EmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = summarize(terms)?;

    if terms.annual_rate_percent.is_zero() {
        warnings.push("Interest-free loan: EMI is principal divided by tenure".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance EMI (annuity formula)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_periods": terms.tenure_periods,
            "periods_per_year": 12,
        }),
        warnings,
        elapsed,
        output,
    ))
}
