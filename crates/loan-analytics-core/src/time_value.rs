use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LoanAnalyticsError;
use crate::types::{Money, Percent, Rate};
use crate::LoanAnalyticsResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Convert a quoted annual percentage (6 = 6% p.a.) to a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / PERCENT / MONTHS_PER_YEAR
}

/// Round to sen (2 dp), half-up.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Level payment that retires `principal` over `nper` periods at `rate` per period.
///
/// Unrounded; callers decide on presentation precision.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> LoanAnalyticsResult<Money> {
    if nper == 0 {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(|| LoanAnalyticsError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: format!("Compounding factor overflows over {nper} periods"),
        })?;
    let annuity_factor = factor - Decimal::ONE;

    if annuity_factor.is_zero() {
        return Err(LoanAnalyticsError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    let numerator = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .ok_or_else(|| LoanAnalyticsError::InvalidInput {
            field: "principal".into(),
            reason: "Payment numerator overflows".into(),
        })?;

    Ok(numerator / annuity_factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(10.015)), dec!(10.02));
    }

    #[test]
    fn test_annuity_payment_standard() {
        let pmt = annuity_payment(dec!(12_000), dec!(0.005), 12).unwrap();
        assert!((pmt - dec!(1032.7972)).abs() < dec!(0.001));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        let pmt = annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_annuity_payment_zero_periods() {
        assert!(annuity_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_annuity_payment_overflow_is_error() {
        // 1000% p.a. over 50 years cannot be represented
        let result = annuity_payment(dec!(1000), monthly_rate(dec!(1000)), 600);
        assert!(result.is_err());
    }
}
