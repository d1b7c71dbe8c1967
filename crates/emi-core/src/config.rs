//! Business limits applied at the request boundary.
//!
//! The engine functions only enforce the mathematical invariants of their
//! inputs. Product limits (loan size, rate ceiling, tenure ceiling, number of
//! compared offers) live here so callers can opt in, load them from a file,
//! or skip them altogether.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EmiError;
use crate::types::{LoanTerms, Money, Percent};
use crate::EmiResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    pub min_principal: Money,
    pub max_principal: Money,
    pub max_tenure_periods: u32,
    pub max_annual_rate_percent: Percent,
    pub max_compared_loans: usize,
    /// Decimal places used when rounding outputs for presentation.
    pub decimal_precision: u32,
}

impl Default for EngineLimits {
    fn default() -> Self {
        EngineLimits {
            min_principal: dec!(1_000),
            max_principal: dec!(100_000_000),
            max_tenure_periods: 600,
            max_annual_rate_percent: dec!(50),
            max_compared_loans: 3,
            decimal_precision: 2,
        }
    }
}

impl EngineLimits {
    /// Check loan terms against the mathematical invariants and the configured limits.
    pub fn check_terms(&self, terms: &LoanTerms) -> EmiResult<()> {
        terms.validate()?;

        if terms.principal < self.min_principal {
            return Err(limit_error("principal", terms.principal, self.min_principal));
        }
        if terms.principal > self.max_principal {
            return Err(limit_error("principal", terms.principal, self.max_principal));
        }
        if terms.annual_rate_percent > self.max_annual_rate_percent {
            return Err(limit_error(
                "annual_rate_percent",
                terms.annual_rate_percent,
                self.max_annual_rate_percent,
            ));
        }
        if terms.tenure_periods > self.max_tenure_periods {
            return Err(limit_error(
                "tenure_periods",
                Decimal::from(terms.tenure_periods),
                Decimal::from(self.max_tenure_periods),
            ));
        }
        Ok(())
    }

    pub fn check_loan_count(&self, count: usize) -> EmiResult<()> {
        if count > self.max_compared_loans {
            tracing::warn!(count, max = self.max_compared_loans, "comparison rejected");
            return Err(EmiError::TooManyLoans {
                count,
                max: self.max_compared_loans,
            });
        }
        Ok(())
    }
}

fn limit_error(field: &str, value: Decimal, limit: Decimal) -> EmiError {
    tracing::warn!(field, %value, %limit, "loan terms outside configured limits");
    EmiError::LimitExceeded {
        field: field.into(),
        value,
        limit,
    }
}
