use napi::Result as NapiResult;
use napi_derive::napi;

use emi_core::config::EngineLimits;
use emi_core::types::{LoanRequest, Rounded};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse loan fields and apply the default limits.
fn loan_terms(input_json: &str, limits: &EngineLimits) -> NapiResult<emi_core::LoanTerms> {
    let request: LoanRequest = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let terms = request.to_terms().map_err(to_napi_error)?;
    limits.check_terms(&terms).map_err(to_napi_error)?;
    Ok(terms)
}

// ---------------------------------------------------------------------------
// EMI and schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let limits = EngineLimits::default();
    let terms = loan_terms(&input_json, &limits)?;
    let output = emi_core::emi::calculate_emi(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output.rounded(limits.decimal_precision)).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let limits = EngineLimits::default();
    let terms = loan_terms(&input_json, &limits)?;
    let output = emi_core::schedule::build_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output.rounded(limits.decimal_precision)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Prepayment
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_prepayment(input_json: String) -> NapiResult<String> {
    let limits = EngineLimits::default();
    let request: emi_core::prepayment::PrepaymentRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let terms = request.loan_terms().map_err(to_napi_error)?;
    limits.check_terms(&terms).map_err(to_napi_error)?;
    let policy = request.policy().map_err(to_napi_error)?;
    let output =
        emi_core::prepayment::simulate_prepayment(&terms, &policy).map_err(to_napi_error)?;
    serde_json::to_string(&output.rounded(limits.decimal_precision)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let limits = EngineLimits::default();
    let request: emi_core::comparison::ComparisonRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        emi_core::comparison::compare_loans(&request, Some(&limits)).map_err(to_napi_error)?;
    serde_json::to_string(&output.rounded(limits.decimal_precision)).map_err(to_napi_error)
}
