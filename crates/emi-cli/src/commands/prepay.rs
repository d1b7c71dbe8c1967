use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use emi_core::prepayment::{self, PrepaymentRequest};

use super::loan::LoanFlags;
use super::{resolve_request, RunContext};

/// Arguments for a prepayment simulation
#[derive(Args)]
pub struct PrepayArgs {
    #[command(flatten)]
    pub loan: LoanFlags,

    /// One-off prepayment amount
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Payment period after which the lump sum is applied
    #[arg(long)]
    pub after_month: Option<u32>,

    /// Extra amount paid with every EMI
    #[arg(long)]
    pub extra_monthly: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_prepay(args: PrepayArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PrepaymentRequest =
        resolve_request(args.input.as_deref(), args.loan.given(), || {
            Ok(PrepaymentRequest {
                loan: args.loan.to_request()?,
                lump_sum: args.lump_sum,
                after_month: args.after_month,
                extra_monthly: args.extra_monthly,
            })
        })?;

    let terms = ctx.prepare(request.loan_terms()?)?;
    let policy = request.policy()?;

    let result = prepayment::simulate_prepayment(&terms, &policy)?;
    ctx.render(result)
}
