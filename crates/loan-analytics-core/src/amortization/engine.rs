//! Fixed-rate instalment maths: level payment, amortisation schedule,
//! interest totals and payoff-date simulation.
//!
//! Amounts are carried in sen precision: each period's interest is rounded
//! half-up to 2 dp, so balances stay exact decimals and repeated calls give
//! identical results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::error::LoanAnalyticsError;
use crate::time_value::{annuity_payment, monthly_rate, round_money};
use crate::types::{Money, Percent, Rate};
use crate::LoanAnalyticsResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Safety cap on payoff simulations (50 years). Reaching it with a balance
/// outstanding means the payment never retires the debt.
pub const MAX_PAYOFF_MONTHS: u32 = 600;

/// Longest term accepted for a schedule (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of an amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based position in the schedule.
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Balance after this payment. The final row is exactly zero.
    pub remaining_balance: Money,
}

/// Result of a payoff simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffProjection {
    pub payoff_date: NaiveDate,
    /// Months simulated; equals [`MAX_PAYOFF_MONTHS`] when not converged.
    pub months: u32,
    pub total_interest: Money,
    /// False when the cap was hit with a balance still outstanding.
    pub converged: bool,
    /// Balance left when the simulation stopped (zero when converged).
    pub final_balance: Money,
}

/// Where a fixed payment leaves a running balance after a number of months.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermProjection {
    pub total_interest: Money,
    /// Payments made before the balance cleared or the months ran out.
    pub months_paid: u32,
    /// Balance still owed after the last month; zero when the payment clears it.
    pub residual_balance: Money,
}

/// A dateless schedule row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Period {
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

/// Interest and principal for one month of a running loan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MonthStep {
    pub interest: Money,
    pub principal: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment for a fixed-rate loan, rounded half-up to sen.
///
/// `payment = P·r·(1+r)^n / ((1+r)^n − 1)` with `r = rate/100/12`; a zero
/// rate degenerates to `P / n`.
pub fn calculate_monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> LoanAnalyticsResult<Money> {
    validate_amount("principal", principal)?;
    validate_rate(annual_rate_percent)?;
    validate_term(term_months)?;

    let payment = annuity_payment(principal, monthly_rate(annual_rate_percent), term_months)?;
    Ok(round_money(payment))
}

/// Build the payment-by-payment schedule.
///
/// Without an override the schedule has exactly `term_months` rows and the
/// last row's balance is forced to zero; the last payment is not adjusted
/// for the rounding residue. With an override payment the schedule ends as
/// soon as the balance is retired, which may be before `term_months`.
pub fn generate_amortization_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
    start_date: NaiveDate,
    monthly_payment_override: Option<Money>,
) -> LoanAnalyticsResult<Vec<ScheduleEntry>> {
    let periods = amortize(
        principal,
        annual_rate_percent,
        term_months,
        monthly_payment_override,
    )?;

    periods
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let payment_number = i as u32 + 1;
            Ok(ScheduleEntry {
                payment_number,
                payment_date: add_months(start_date, payment_number)?,
                payment_amount: p.payment,
                principal_portion: p.principal,
                interest_portion: p.interest,
                remaining_balance: p.balance,
            })
        })
        .collect()
}

/// Interest paid over the full life of a new loan.
pub fn calculate_total_interest(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> LoanAnalyticsResult<Money> {
    let periods = amortize(principal, annual_rate_percent, term_months, None)?;
    Ok(periods.iter().map(|p| p.interest).sum())
}

/// Interest still to be paid on a running loan over its remaining months,
/// optionally at the payment the borrower actually makes.
pub fn calculate_remaining_interest(
    balance: Money,
    annual_rate_percent: Percent,
    remaining_months: u32,
    monthly_payment: Option<Money>,
) -> LoanAnalyticsResult<Money> {
    let periods = amortize(balance, annual_rate_percent, remaining_months, monthly_payment)?;
    Ok(periods.iter().map(|p| p.interest).sum())
}

/// Simulate month by month until the balance is retired or the 600-month
/// cap is reached. `extra_payment` is added to every scheduled payment.
pub fn calculate_payoff_date(
    balance: Money,
    annual_rate_percent: Percent,
    monthly_payment: Money,
    extra_payment: Money,
    start_date: NaiveDate,
) -> LoanAnalyticsResult<PayoffProjection> {
    validate_amount("balance", balance)?;
    validate_rate(annual_rate_percent)?;
    validate_amount("monthly_payment", monthly_payment)?;
    validate_amount("extra_payment", extra_payment)?;

    let rate = monthly_rate(annual_rate_percent);
    let payment = monthly_payment + extra_payment;

    let mut remaining = balance;
    let mut total_interest = Decimal::ZERO;
    let mut months = 0u32;

    while remaining > Decimal::ZERO && months < MAX_PAYOFF_MONTHS {
        match month_step(remaining, rate, payment) {
            Some(step) => {
                remaining -= step.principal;
                total_interest += step.interest;
                months += 1;
            }
            None => {
                // Negative amortisation grew past representable range.
                months = MAX_PAYOFF_MONTHS;
                break;
            }
        }
    }

    let converged = remaining <= Decimal::ZERO;
    if !converged {
        log::warn!(
            "payoff simulation hit the {MAX_PAYOFF_MONTHS}-month cap with {remaining} outstanding \
             (payment {payment}, rate {annual_rate_percent}%)"
        );
    }

    Ok(PayoffProjection {
        payoff_date: add_months(start_date, months)?,
        months,
        total_interest,
        converged,
        final_balance: remaining.max(Decimal::ZERO),
    })
}

/// Run a balance forward for at most `months` payments of `monthly_payment`.
///
/// Unlike the schedule, a payment at or below the monthly interest is
/// accepted: the balance grows, and whatever is owed after the last month is
/// reported as `residual_balance` instead of being forced to zero.
pub fn project_fixed_payment(
    balance: Money,
    annual_rate_percent: Percent,
    months: u32,
    monthly_payment: Money,
) -> LoanAnalyticsResult<TermProjection> {
    validate_amount("balance", balance)?;
    validate_rate(annual_rate_percent)?;
    validate_amount("monthly_payment", monthly_payment)?;
    if months > MAX_TERM_MONTHS {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "months".into(),
            reason: format!("At most {MAX_TERM_MONTHS} months can be projected."),
        });
    }

    let rate = monthly_rate(annual_rate_percent);
    let mut remaining = balance;
    let mut total_interest = Decimal::ZERO;
    let mut months_paid = 0u32;

    while remaining > Decimal::ZERO && months_paid < months {
        let step = month_step(remaining, rate, monthly_payment).ok_or_else(|| {
            LoanAnalyticsError::InvalidInput {
                field: "balance".into(),
                reason: "Balance grows beyond the representable range.".into(),
            }
        })?;
        remaining -= step.principal;
        total_interest += step.interest;
        months_paid += 1;
    }

    Ok(TermProjection {
        total_interest,
        months_paid,
        residual_balance: remaining.max(Decimal::ZERO),
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// One month on a running balance: interest rounded to sen, principal is
/// whatever the payment leaves after interest, never more than the balance.
/// A negative principal means the payment does not cover interest.
/// Returns `None` on decimal overflow.
pub(crate) fn month_step(balance: Money, rate: Rate, payment: Money) -> Option<MonthStep> {
    let interest = round_money(balance.checked_mul(rate)?);
    let principal = payment.checked_sub(interest)?.min(balance);
    // Guard the subtraction the caller will make.
    balance.checked_sub(principal)?;
    Some(MonthStep { interest, principal })
}

/// Shared schedule loop behind the schedule and interest totals.
pub(crate) fn amortize(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
    payment_override: Option<Money>,
) -> LoanAnalyticsResult<Vec<Period>> {
    validate_amount("principal", principal)?;
    validate_rate(annual_rate_percent)?;
    validate_term(term_months)?;

    if principal.is_zero() {
        return Ok(Vec::new());
    }

    let rate = monthly_rate(annual_rate_percent);
    let (payment, clamp) = match payment_override {
        Some(p) => {
            let first_interest = round_money(principal * rate);
            if p <= first_interest || p <= Decimal::ZERO {
                return Err(LoanAnalyticsError::InvalidInput {
                    field: "monthly_payment".into(),
                    reason: format!(
                        "Payment {p} does not exceed the first month's interest {first_interest}."
                    ),
                });
            }
            (p, true)
        }
        None => (
            calculate_monthly_payment(principal, annual_rate_percent, term_months)?,
            false,
        ),
    };

    let mut periods = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for i in 1..=term_months {
        if clamp && balance.is_zero() {
            break;
        }

        let interest = round_money(balance * rate);
        let mut principal_portion = payment - interest;
        let mut payment_amount = payment;
        if clamp && principal_portion > balance {
            principal_portion = balance;
            payment_amount = interest + principal_portion;
        }

        balance = (balance - principal_portion).max(Decimal::ZERO);
        if i == term_months {
            balance = Decimal::ZERO;
        }

        periods.push(Period {
            payment: payment_amount,
            principal: principal_portion,
            interest,
            balance,
        });
    }

    Ok(periods)
}

fn validate_amount(field: &str, amount: Money) -> LoanAnalyticsResult<()> {
    if amount < Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: field.into(),
            reason: "Amount cannot be negative.".into(),
        });
    }
    Ok(())
}

fn validate_rate(annual_rate_percent: Percent) -> LoanAnalyticsResult<()> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Interest rate cannot be negative.".into(),
        });
    }
    Ok(())
}

fn validate_term(term_months: u32) -> LoanAnalyticsResult<()> {
    if term_months == 0 {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month.".into(),
        });
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months."),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
