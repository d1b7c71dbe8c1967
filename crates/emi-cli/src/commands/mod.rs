pub mod compare;
pub mod loan;
pub mod prepay;

use chrono::Local;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use emi_core::config::EngineLimits;
use emi_core::types::{ComputationOutput, LoanRequest, LoanTerms, Rounded, TenureUnit};

use crate::input;

/// Settings shared by every command, resolved from the global flags.
pub struct RunContext {
    /// `None` when `--no-limits` is set.
    pub limits: Option<EngineLimits>,
    pub precision: u32,
}

impl RunContext {
    /// Apply the configured limits and date the loan from today when no start date was given.
    pub fn prepare(&self, mut terms: LoanTerms) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        if let Some(ref limits) = self.limits {
            limits.check_terms(&terms)?;
        }
        if terms.start_date.is_none() {
            terms.start_date = Some(Local::now().date_naive());
        }
        Ok(terms)
    }

    /// Round for presentation and convert to JSON.
    pub fn render<T: Serialize + Rounded>(
        &self,
        output: ComputationOutput<T>,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        Ok(serde_json::to_value(output.rounded(self.precision))?)
    }
}

/// Resolve a request body: `--input` file first, then flags when any were
/// given, then piped stdin, finally the flags again so their "required"
/// errors surface.
pub fn resolve_request<T, F>(
    path: Option<&str>,
    flags_given: bool,
    from_flags: F,
) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn std::error::Error>>,
{
    if let Some(path) = path {
        return input::file::read_json(path);
    }
    if !flags_given {
        if let Some(request) = input::stdin::read_stdin()? {
            return Ok(request);
        }
    }
    from_flags()
}

pub fn parse_unit(s: &str) -> Result<TenureUnit, String> {
    match s.to_ascii_lowercase().as_str() {
        "months" | "month" | "periods" => Ok(TenureUnit::Periods),
        "years" | "year" => Ok(TenureUnit::Years),
        other => Err(format!("unknown tenure unit '{}' (expected months or years)", other)),
    }
}

/// Parse a `PRINCIPAL,RATE,TENURE` loan offer.
pub fn parse_loan(s: &str) -> Result<LoanRequest, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [principal, rate, tenure] = parts.as_slice() else {
        return Err(format!("expected PRINCIPAL,RATE,TENURE, got '{}'", s));
    };

    let parse = |name: &str, raw: &str| -> Result<Decimal, String> {
        raw.parse::<Decimal>()
            .map_err(|e| format!("invalid {} '{}': {}", name, raw, e))
    };

    Ok(LoanRequest {
        principal: parse("principal", principal)?,
        rate: parse("rate", rate)?,
        tenure: parse("tenure", tenure)?,
        unit: TenureUnit::Periods,
        start_date: None,
    })
}
