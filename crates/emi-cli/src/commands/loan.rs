use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use emi_core::emi;
use emi_core::schedule;
use emi_core::types::{LoanRequest, TenureUnit};

use super::{parse_unit, resolve_request, RunContext};

/// Loan terms given as flags
#[derive(Args)]
pub struct LoanFlags {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan tenure, in months unless --unit years
    #[arg(long)]
    pub tenure: Option<Decimal>,

    /// Tenure unit: months or years
    #[arg(long, default_value = "months", value_parser = parse_unit)]
    pub unit: TenureUnit,

    /// First payment date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanFlags {
    pub fn given(&self) -> bool {
        self.principal.is_some() || self.rate.is_some() || self.tenure.is_some()
    }

    pub fn to_request(&self) -> Result<LoanRequest, Box<dyn std::error::Error>> {
        Ok(LoanRequest {
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            rate: self.rate.ok_or("--rate is required (or provide --input)")?,
            tenure: self
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
            unit: self.unit,
            start_date: self.start_date,
        })
    }
}

/// Arguments for the EMI summary
#[derive(Args)]
pub struct EmiArgs {
    #[command(flatten)]
    pub loan: LoanFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanFlags,

    /// Include the per-year summary (table and CSV output show it instead of the monthly rows)
    #[arg(long)]
    pub yearly: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_emi(args: EmiArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest =
        resolve_request(args.input.as_deref(), args.loan.given(), || args.loan.to_request())?;
    let terms = ctx.prepare(request.to_terms()?)?;

    let result = emi::calculate_emi(&terms)?;
    ctx.render(result)
}

pub fn run_schedule(
    args: ScheduleArgs,
    ctx: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest =
        resolve_request(args.input.as_deref(), args.loan.given(), || args.loan.to_request())?;
    let terms = ctx.prepare(request.to_terms()?)?;

    let result = schedule::build_schedule(&terms)?;
    let mut value = ctx.render(result)?;

    if !args.yearly {
        if let Some(Value::Object(res)) = value.get_mut("result") {
            res.remove("yearly_summary");
        }
    }
    Ok(value)
}
