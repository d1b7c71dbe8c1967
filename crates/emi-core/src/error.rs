use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmiError {
    #[error("Invalid loan terms: {field}: {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Invalid tenure: {value} {unit} must convert to a whole number of periods between 1 and {max}")]
    InvalidTenure {
        value: Decimal,
        unit: String,
        max: u32,
    },

    #[error("Non-amortizing loan: payment {payment} does not exceed interest {interest} in period {period}")]
    NonAmortizingLoan {
        period: u32,
        payment: Decimal,
        interest: Decimal,
    },

    #[error("Conflicting prepayment inputs: lump sum {lump_sum} and extra per period {extra_per_period} are both set")]
    ConflictingPrepaymentInputs {
        lump_sum: Decimal,
        extra_per_period: Decimal,
    },

    #[error("Missing prepayment inputs: provide a lump sum with its period, or an extra per-period amount")]
    MissingPrepaymentInputs,

    #[error("Invalid prepayment: {field}: {reason}")]
    InvalidPrepayment { field: String, reason: String },

    #[error("Insufficient loans: {count} supplied, at least {min} required")]
    InsufficientLoans { count: usize, min: usize },

    #[error("Too many loans: {count} supplied, at most {max} allowed")]
    TooManyLoans { count: usize, max: usize },

    #[error("Limit exceeded: {field} = {value} (limit {limit})")]
    LimitExceeded {
        field: String,
        value: Decimal,
        limit: Decimal,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EmiError {
    fn from(e: serde_json::Error) -> Self {
        EmiError::SerializationError(e.to_string())
    }
}
