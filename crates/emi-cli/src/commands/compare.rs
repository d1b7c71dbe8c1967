use clap::Args;
use serde_json::Value;

use emi_core::comparison::{self, ComparisonRequest};
use emi_core::types::{LoanRequest, TenureUnit};

use super::{parse_loan, parse_unit, resolve_request, RunContext};

/// Arguments for comparing loan offers
#[derive(Args)]
pub struct CompareArgs {
    /// Loan offer as PRINCIPAL,RATE,TENURE; repeat once per offer
    #[arg(long = "loan", value_parser = parse_loan)]
    pub loans: Vec<LoanRequest>,

    /// Tenure unit applied to every --loan
    #[arg(long, default_value = "months", value_parser = parse_unit)]
    pub unit: TenureUnit,

    /// Path to JSON input file with a "loans" array
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(
    args: CompareArgs,
    ctx: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let unit = args.unit;
    let flags_given = !args.loans.is_empty();
    let request: ComparisonRequest = resolve_request(args.input.as_deref(), flags_given, || {
        if args.loans.is_empty() {
            return Err("--loan PRINCIPAL,RATE,TENURE is required (or provide --input)".into());
        }
        Ok(ComparisonRequest {
            loans: args
                .loans
                .into_iter()
                .map(|loan| LoanRequest { unit, ..loan })
                .collect(),
        })
    })?;

    let result = comparison::compare_loans(&request, ctx.limits.as_ref())?;
    ctx.render(result)
}
