//! Prepayment simulation: lump-sum and recurring extra payments.
//!
//! Both policies keep the contractual EMI and shorten the tenure. The
//! adjusted schedule is re-derived from the original principal with the same
//! amortization loop as the baseline, so the two are directly comparable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::emi::{self, EmiOutput};
use crate::error::EmiError;
use crate::schedule::{self, Acceleration, Schedule};
use crate::types::*;
use crate::EmiResult;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Exactly one prepayment policy per simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrepaymentPolicy {
    /// One-time payment applied after period `after_period`.
    LumpSum { amount: Money, after_period: u32 },
    /// Added to every period's EMI.
    ExtraPerPeriod { amount: Money },
}

impl PrepaymentPolicy {
    pub fn validate(&self, tenure_periods: u32) -> EmiResult<()> {
        match *self {
            PrepaymentPolicy::LumpSum {
                amount,
                after_period,
            } => {
                if amount <= Decimal::ZERO {
                    return Err(EmiError::InvalidPrepayment {
                        field: "amount".into(),
                        reason: "Lump sum must be positive".into(),
                    });
                }
                if after_period == 0 || after_period > tenure_periods {
                    return Err(EmiError::InvalidPrepayment {
                        field: "after_period".into(),
                        reason: format!("Must be between 1 and {tenure_periods}"),
                    });
                }
            }
            PrepaymentPolicy::ExtraPerPeriod { amount } => {
                if amount <= Decimal::ZERO {
                    return Err(EmiError::InvalidPrepayment {
                        field: "amount".into(),
                        reason: "Extra payment must be positive".into(),
                    });
                }
            }
        }
        Ok(())
    }

    fn acceleration(&self) -> Acceleration {
        match *self {
            PrepaymentPolicy::LumpSum {
                amount,
                after_period,
            } => Acceleration {
                lump_sum: Some((after_period, amount)),
                ..Acceleration::default()
            },
            PrepaymentPolicy::ExtraPerPeriod { amount } => Acceleration {
                extra_per_period: amount,
                ..Acceleration::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    pub new_tenure_periods: u32,
    pub tenure_reduced_by: u32,
    pub interest_saved: Money,
    pub baseline_interest: Money,
    pub new_interest: Money,
}

impl Rounded for PrepaymentResult {
    fn rounded(self, dp: u32) -> Self {
        PrepaymentResult {
            interest_saved: round_money(self.interest_saved, dp),
            baseline_interest: round_money(self.baseline_interest, dp),
            new_interest: round_money(self.new_interest, dp),
            ..self
        }
    }
}

/// Result together with both schedules that produced it.
#[derive(Debug, Clone)]
pub struct PrepaymentSimulation {
    pub emi: Money,
    pub result: PrepaymentResult,
    pub baseline: Schedule,
    pub adjusted: Schedule,
}

/// Re-derive the schedule under `policy` and compare against the baseline.
pub fn simulate_detailed(
    loan: &LoanTerms,
    policy: &PrepaymentPolicy,
) -> EmiResult<PrepaymentSimulation> {
    loan.validate()?;
    policy.validate(loan.tenure_periods)?;

    let period_rate = loan.period_rate();
    let emi = emi::compute_emi(loan.principal, period_rate, loan.tenure_periods)?;

    let baseline = schedule::generate(
        loan.principal,
        period_rate,
        emi,
        loan.tenure_periods,
        loan.start_date,
    )?;
    let adjusted = schedule::amortize(
        loan.principal,
        period_rate,
        emi,
        loan.tenure_periods,
        loan.start_date,
        policy.acceleration(),
    )?;

    let baseline_interest = baseline.total_interest();
    let new_interest = adjusted.total_interest();
    let new_tenure_periods = adjusted.periods();

    let result = PrepaymentResult {
        new_tenure_periods,
        tenure_reduced_by: loan.tenure_periods - new_tenure_periods,
        interest_saved: baseline_interest - new_interest,
        baseline_interest,
        new_interest,
    };

    tracing::debug!(
        policy = ?policy,
        new_tenure = result.new_tenure_periods,
        reduced_by = result.tenure_reduced_by,
        interest_saved = %result.interest_saved,
        "prepayment simulated"
    );

    Ok(PrepaymentSimulation {
        emi,
        result,
        baseline,
        adjusted,
    })
}

pub fn simulate(loan: &LoanTerms, policy: &PrepaymentPolicy) -> EmiResult<PrepaymentResult> {
    simulate_detailed(loan, policy).map(|sim| sim.result)
}

// ---------------------------------------------------------------------------
// Request boundary
// ---------------------------------------------------------------------------

/// Prepayment request in its wire shape: the loan fields at the top level
/// plus raw, mutually exclusive prepayment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentRequest {
    #[serde(flatten)]
    pub loan: LoanRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lump_sum: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_monthly: Option<Money>,
}

impl PrepaymentRequest {
    pub fn loan_terms(&self) -> EmiResult<LoanTerms> {
        self.loan.to_terms()
    }

    /// Resolve the raw fields into exactly one policy.
    pub fn policy(&self) -> EmiResult<PrepaymentPolicy> {
        let lump_sum = self.lump_sum.unwrap_or(Decimal::ZERO);
        let extra = self.extra_monthly.unwrap_or(Decimal::ZERO);

        if lump_sum < Decimal::ZERO {
            return Err(EmiError::InvalidPrepayment {
                field: "lump_sum".into(),
                reason: "Cannot be negative".into(),
            });
        }
        if extra < Decimal::ZERO {
            return Err(EmiError::InvalidPrepayment {
                field: "extra_monthly".into(),
                reason: "Cannot be negative".into(),
            });
        }

        match (lump_sum > Decimal::ZERO, extra > Decimal::ZERO) {
            (true, true) => Err(EmiError::ConflictingPrepaymentInputs {
                lump_sum,
                extra_per_period: extra,
            }),
            (true, false) => match self.after_month {
                Some(after_period) if after_period > 0 => Ok(PrepaymentPolicy::LumpSum {
                    amount: lump_sum,
                    after_period,
                }),
                _ => Err(EmiError::InvalidPrepayment {
                    field: "after_month".into(),
                    reason: "Required with lump_sum and must be at least 1".into(),
                }),
            },
            (false, true) => Ok(PrepaymentPolicy::ExtraPerPeriod { amount: extra }),
            (false, false) => Err(EmiError::MissingPrepaymentInputs),
        }
    }
}

/// Response payload: the unmodified loan, the policy applied, and its effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    pub original: EmiOutput,
    pub policy: PrepaymentPolicy,
    pub prepayment_result: PrepaymentResult,
    pub adjusted_schedule: Schedule,
}

impl Rounded for PrepaymentOutput {
    fn rounded(self, dp: u32) -> Self {
        let policy = match self.policy {
            PrepaymentPolicy::LumpSum {
                amount,
                after_period,
            } => PrepaymentPolicy::LumpSum {
                amount: round_money(amount, dp),
                after_period,
            },
            PrepaymentPolicy::ExtraPerPeriod { amount } => PrepaymentPolicy::ExtraPerPeriod {
                amount: round_money(amount, dp),
            },
        };
        PrepaymentOutput {
            original: self.original.rounded(dp),
            policy,
            prepayment_result: self.prepayment_result.rounded(dp),
            adjusted_schedule: self.adjusted_schedule.rounded(dp),
        }
    }
}

/// Validate a wire request, simulate it, and wrap the result in the output envelope.
pub fn simulate_request(
    request: &PrepaymentRequest,
) -> EmiResult<ComputationOutput<PrepaymentOutput>> {
    let terms = request.loan_terms()?;
    let policy = request.policy()?;
    simulate_prepayment(&terms, &policy)
}

/// Simulate validated terms and policy, wrapped in the output envelope.
pub fn simulate_prepayment(
    terms: &LoanTerms,
    policy: &PrepaymentPolicy,
) -> EmiResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let original = emi::summarize(terms)?;
    let sim = simulate_detailed(terms, policy)?;

    if sim.result.tenure_reduced_by == 0 {
        warnings.push("Prepayment does not shorten the tenure".into());
    }
    if let PrepaymentPolicy::LumpSum { amount, .. } = policy {
        if sim.adjusted.total_prepayment() < *amount {
            warnings.push(format!(
                "Lump sum exceeds the outstanding balance; only {} applied",
                sim.adjusted.total_prepayment()
            ));
        }
    }

    let output = PrepaymentOutput {
        original,
        policy: *policy,
        prepayment_result: sim.result,
        adjusted_schedule: sim.adjusted,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment simulation (EMI held constant, tenure shortened)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_periods": terms.tenure_periods,
            "emi": sim.emi.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
