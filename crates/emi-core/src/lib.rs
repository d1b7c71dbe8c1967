pub mod config;
pub mod emi;
pub mod error;
pub mod rate;
pub mod schedule;
pub mod types;

#[cfg(feature = "prepayment")]
pub mod prepayment;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::EmiError;
pub use types::*;

/// Standard result type for all EMI engine operations
pub type EmiResult<T> = Result<T, EmiError>;
