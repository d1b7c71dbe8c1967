use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::EmiError;
use crate::types::{Percent, Rate, TenureUnit};
use crate::EmiResult;

const PERIODS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Longest tenure the engine will amortize: 100 years of monthly payments.
/// Schedules hold one entry per period, so this bounds their size.
pub const MAX_TENURE_PERIODS: u32 = 1_200;

/// Annual percentage rate to per-period decimal rate (10 -> 0.008333...).
pub fn to_period_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / PERIODS_PER_YEAR / PERCENT
}

/// Convert a tenure quoted in `unit` into a whole number of payment periods.
pub fn to_periods(tenure_value: Decimal, unit: TenureUnit) -> EmiResult<u32> {
    let invalid = || EmiError::InvalidTenure {
        value: tenure_value,
        unit: unit.to_string(),
        max: MAX_TENURE_PERIODS,
    };

    let periods = match unit {
        TenureUnit::Periods => tenure_value,
        TenureUnit::Years => tenure_value
            .checked_mul(PERIODS_PER_YEAR)
            .ok_or_else(invalid)?,
    };

    if periods <= Decimal::ZERO || !periods.fract().is_zero() {
        return Err(invalid());
    }

    match periods.to_u32() {
        Some(n) if n > 0 && n <= MAX_TENURE_PERIODS => Ok(n),
        _ => Err(invalid()),
    }
}

/// Reject a period count outside `1..=MAX_TENURE_PERIODS`.
pub fn check_periods(periods: u32) -> EmiResult<()> {
    if periods == 0 || periods > MAX_TENURE_PERIODS {
        return Err(EmiError::InvalidTenure {
            value: Decimal::from(periods),
            unit: TenureUnit::Periods.to_string(),
            max: MAX_TENURE_PERIODS,
        });
    }
    Ok(())
}

/// Error for a decimal operation on `field` that left the representable range.
pub(crate) fn overflow(field: &str) -> EmiError {
    EmiError::InvalidLoanTerms {
        field: field.into(),
        reason: "Value overflows decimal range".into(),
    }
}

/// (1 + r)^n, the compounding factor over `periods` periods.
pub fn compound_factor(period_rate: Rate, periods: u32) -> EmiResult<Decimal> {
    (Decimal::ONE + period_rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| EmiError::InvalidLoanTerms {
            field: "tenure_periods".into(),
            reason: format!("Compounding over {periods} periods overflows decimal range"),
        })
}

/// Effective annual rate in percent: ((1 + r)^12 - 1) * 100. Zero for interest-free loans.
pub fn effective_annual_rate(period_rate: Rate) -> EmiResult<Percent> {
    if period_rate <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let factor = compound_factor(period_rate, 12)?;
    (factor - Decimal::ONE)
        .checked_mul(PERCENT)
        .ok_or_else(|| overflow("effective_annual_rate_percent"))
}
