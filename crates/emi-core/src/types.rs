use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::EmiError;
use crate::EmiResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Per-period rates expressed as decimals (0.01 = 1% per period). Never as percentages.
pub type Rate = Decimal;

/// Rates quoted as percentages (10 = 10% per annum).
pub type Percent = Decimal;

/// Unit in which a tenure is quoted before conversion to payment periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenureUnit {
    #[default]
    #[serde(alias = "months", alias = "month")]
    Periods,
    #[serde(alias = "year")]
    Years,
}

impl std::fmt::Display for TenureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenureUnit::Periods => write!(f, "periods"),
            TenureUnit::Years => write!(f, "years"),
        }
    }
}

/// Terms of a fixed-payment, reducing-balance loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_periods: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// Build validated loan terms.
    pub fn new(
        principal: Money,
        annual_rate_percent: Percent,
        tenure_periods: u32,
        start_date: Option<NaiveDate>,
    ) -> EmiResult<Self> {
        let terms = LoanTerms {
            principal,
            annual_rate_percent,
            tenure_periods,
            start_date,
        };
        terms.validate()?;
        Ok(terms)
    }

    pub fn validate(&self) -> EmiResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EmiError::InvalidLoanTerms {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(EmiError::InvalidLoanTerms {
                field: "annual_rate_percent".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        crate::rate::check_periods(self.tenure_periods)
    }

    pub fn period_rate(&self) -> Rate {
        crate::rate::to_period_rate(self.annual_rate_percent)
    }
}

/// Raw loan fields as they arrive over a request boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    /// Annual rate in percent.
    pub rate: Percent,
    pub tenure: Decimal,
    #[serde(default)]
    pub unit: TenureUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl LoanRequest {
    pub fn to_terms(&self) -> EmiResult<LoanTerms> {
        let periods = crate::rate::to_periods(self.tenure, self.unit)?;
        LoanTerms::new(self.principal, self.rate, periods, self.start_date)
    }
}

/// Round a monetary value for presentation (half away from zero).
pub fn round_money(value: Money, dp: u32) -> Money {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Presentation rounding for engine outputs. Internal computation never rounds.
pub trait Rounded {
    fn rounded(self, dp: u32) -> Self;
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

impl<T: Serialize + Rounded> Rounded for ComputationOutput<T> {
    fn rounded(self, dp: u32) -> Self {
        ComputationOutput {
            result: self.result.rounded(dp),
            metadata: ComputationMetadata {
                precision: format!("rounded_{dp}dp"),
                ..self.metadata
            },
            ..self
        }
    }
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_loan_terms_rejects_non_positive_principal() {
        let err = LoanTerms::new(dec!(0), dec!(10), 12, None).unwrap_err();
        assert!(matches!(err, EmiError::InvalidLoanTerms { ref field, .. } if field == "principal"));
    }

    #[test]
    fn test_loan_terms_rejects_negative_rate() {
        assert!(LoanTerms::new(dec!(1000), dec!(-0.5), 12, None).is_err());
    }

    #[test]
    fn test_loan_terms_tenure_bounds() {
        assert!(matches!(
            LoanTerms::new(dec!(1000), dec!(10), 0, None),
            Err(EmiError::InvalidTenure { .. })
        ));
        assert!(LoanTerms::new(dec!(1000), dec!(10), 1_200, None).is_ok());
        assert!(matches!(
            LoanTerms::new(dec!(1000), dec!(0), 3_000_000_000, None),
            Err(EmiError::InvalidTenure { .. })
        ));
    }

    #[test]
    fn test_loan_terms_allows_zero_rate() {
        let terms = LoanTerms::new(dec!(1000), dec!(0), 12, None).unwrap();
        assert!(terms.period_rate().is_zero());
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(87915.885), 2), dec!(87915.89));
        assert_eq!(round_money(dec!(-0.005), 2), dec!(-0.01));
        assert_eq!(round_money(dec!(12.344), 2), dec!(12.34));
    }

    #[test]
    fn test_loan_request_years_unit() {
        let req: LoanRequest =
            serde_json::from_str(r#"{"principal": 100000, "rate": 8, "tenure": 2, "unit": "years"}"#)
                .unwrap();
        let terms = req.to_terms().unwrap();
        assert_eq!(terms.tenure_periods, 24);
    }
}
