use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::emi::{self, payment_date};
use crate::error::EmiError;
use crate::rate;
use crate::types::*;
use crate::EmiResult;

/// A single period in the amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Scheduled payment; always `principal_component + interest_component`.
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    /// One-off prepayment applied after this period's payment.
    pub prepayment: Money,
    pub remaining_balance: Money,
}

impl Rounded for ScheduleEntry {
    fn rounded(self, dp: u32) -> Self {
        ScheduleEntry {
            payment: round_money(self.payment, dp),
            principal_component: round_money(self.principal_component, dp),
            interest_component: round_money(self.interest_component, dp),
            prepayment: round_money(self.prepayment, dp),
            remaining_balance: round_money(self.remaining_balance, dp),
            ..self
        }
    }
}

/// Ordered amortization schedule. Entries are only produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn periods(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(|e| e.interest_component).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.entries.iter().map(|e| e.principal_component).sum()
    }

    pub fn total_prepayment(&self) -> Money {
        self.entries.iter().map(|e| e.prepayment).sum()
    }

    /// Scheduled payments plus any one-off prepayments.
    pub fn total_payment(&self) -> Money {
        self.entries
            .iter()
            .map(|e| e.payment + e.prepayment)
            .sum()
    }
}

impl Rounded for Schedule {
    fn rounded(self, dp: u32) -> Self {
        Schedule {
            entries: self.entries.into_iter().map(|e| e.rounded(dp)).collect(),
        }
    }
}

/// Payment acceleration applied on top of the fixed EMI.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Acceleration {
    /// Added to every period's payment.
    pub extra_per_period: Money,
    /// `(after_period, amount)`: subtracted from the balance once.
    pub lump_sum: Option<(u32, Money)>,
}

/// Core amortization loop shared by the baseline and prepayment runs.
///
/// Runs for at most `max_periods`. The final allowed period settles whatever
/// balance is left, and a payment that would overshoot the balance is clamped,
/// so the last entry always closes at exactly zero.
pub(crate) fn amortize(
    principal: Money,
    period_rate: Rate,
    emi: Money,
    max_periods: u32,
    start_date: Option<NaiveDate>,
    accel: Acceleration,
) -> EmiResult<Schedule> {
    rate::check_periods(max_periods)?;

    let mut entries = Vec::with_capacity(max_periods as usize);
    let mut balance = principal;
    let mut paid = Decimal::ZERO;
    let scheduled = emi
        .checked_add(accel.extra_per_period)
        .ok_or_else(|| rate::overflow("extra_per_period"))?;

    for index in 1..=max_periods {
        let interest = balance
            .checked_mul(period_rate)
            .ok_or_else(|| rate::overflow("interest"))?;

        if scheduled <= interest {
            return Err(EmiError::NonAmortizingLoan {
                period: index,
                payment: scheduled,
                interest,
            });
        }

        let mut principal_component = scheduled - interest;
        if principal_component >= balance || index == max_periods {
            principal_component = balance;
        }
        let payment = principal_component
            .checked_add(interest)
            .ok_or_else(|| rate::overflow("payment"))?;
        balance -= principal_component;

        let mut prepayment = Decimal::ZERO;
        if let Some((after_period, amount)) = accel.lump_sum {
            if index == after_period && balance > Decimal::ZERO {
                prepayment = amount.min(balance);
                balance -= prepayment;
            }
        }

        // Every total over a subset of entries stays below `paid`, so the
        // plain sums in the `Schedule` accessors cannot overflow.
        paid = paid
            .checked_add(payment)
            .and_then(|p| p.checked_add(prepayment))
            .ok_or_else(|| rate::overflow("total_payment"))?;

        let date = match start_date {
            Some(start) => Some(payment_date(start, index)?),
            None => None,
        };

        entries.push(ScheduleEntry {
            index,
            date,
            payment,
            principal_component,
            interest_component: interest,
            prepayment,
            remaining_balance: balance.max(Decimal::ZERO),
        });

        if balance <= Decimal::ZERO {
            break;
        }
    }

    if entries.len() < max_periods as usize {
        tracing::debug!(
            periods = entries.len(),
            nominal = max_periods,
            "loan retired before nominal tenure"
        );
    }

    Ok(Schedule { entries })
}

/// Generate the amortization schedule for a fixed payment `emi`.
pub fn generate(
    principal: Money,
    period_rate: Rate,
    emi: Money,
    periods: u32,
    start_date: Option<NaiveDate>,
) -> EmiResult<Schedule> {
    if principal <= Decimal::ZERO {
        return Err(EmiError::InvalidLoanTerms {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if period_rate < Decimal::ZERO {
        return Err(EmiError::InvalidLoanTerms {
            field: "period_rate".into(),
            reason: "Period rate cannot be negative".into(),
        });
    }

    amortize(
        principal,
        period_rate,
        emi,
        periods,
        start_date,
        Acceleration::default(),
    )
}

/// Schedule totals aggregated per 12-period block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: u32,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub total_prepayment: Money,
    pub closing_balance: Money,
}

impl Rounded for YearlySummary {
    fn rounded(self, dp: u32) -> Self {
        YearlySummary {
            total_principal: round_money(self.total_principal, dp),
            total_interest: round_money(self.total_interest, dp),
            total_payment: round_money(self.total_payment, dp),
            total_prepayment: round_money(self.total_prepayment, dp),
            closing_balance: round_money(self.closing_balance, dp),
            ..self
        }
    }
}

pub fn yearly_summary(schedule: &Schedule) -> Vec<YearlySummary> {
    let mut years: Vec<YearlySummary> = Vec::new();

    for entry in schedule.entries() {
        let year = (entry.index - 1) / 12 + 1;
        if years.last().map(|y| y.year) != Some(year) {
            years.push(YearlySummary {
                year,
                total_principal: Decimal::ZERO,
                total_interest: Decimal::ZERO,
                total_payment: Decimal::ZERO,
                total_prepayment: Decimal::ZERO,
                closing_balance: Decimal::ZERO,
            });
        }
        if let Some(current) = years.last_mut() {
            current.total_principal += entry.principal_component;
            current.total_interest += entry.interest_component;
            current.total_payment += entry.payment;
            current.total_prepayment += entry.prepayment;
            current.closing_balance = entry.remaining_balance;
        }
    }

    years
}

/// Output of a full schedule build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub emi: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_payment: Money,
    pub tenure_periods: u32,
    pub schedule: Schedule,
    pub yearly_summary: Vec<YearlySummary>,
}

impl Rounded for ScheduleOutput {
    fn rounded(self, dp: u32) -> Self {
        ScheduleOutput {
            emi: round_money(self.emi, dp),
            total_interest: round_money(self.total_interest, dp),
            total_principal: round_money(self.total_principal, dp),
            total_payment: round_money(self.total_payment, dp),
            tenure_periods: self.tenure_periods,
            schedule: self.schedule.rounded(dp),
            yearly_summary: self
                .yearly_summary
                .into_iter()
                .map(|y| y.rounded(dp))
                .collect(),
        }
    }
}

/// Build the baseline schedule for a loan, with totals and yearly aggregation.
pub fn build_schedule(terms: &LoanTerms) -> EmiResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    terms.validate()?;
    let period_rate = terms.period_rate();
    let emi = emi::compute_emi(terms.principal, period_rate, terms.tenure_periods)?;
    let schedule = generate(
        terms.principal,
        period_rate,
        emi,
        terms.tenure_periods,
        terms.start_date,
    )?;

    if terms.start_date.is_none() {
        warnings.push("No start date supplied; schedule entries carry no payment dates".into());
    }

    let output = ScheduleOutput {
        emi,
        total_interest: schedule.total_interest(),
        total_principal: schedule.total_principal(),
        total_payment: schedule.total_payment(),
        tenure_periods: schedule.periods(),
        yearly_summary: yearly_summary(&schedule),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance amortization schedule",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_periods": terms.tenure_periods,
            "start_date": terms.start_date,
        }),
        warnings,
        elapsed,
        output,
    ))
}
