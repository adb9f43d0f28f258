//! Credit-card repayment planning: what paying only the minimum costs,
//! compared with a fixed monthly payment or a target payoff horizon.
//!
//! Malaysian issuers bill a minimum of 5% of the outstanding balance or
//! RM50, whichever is higher; both are configurable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::engine::{
    calculate_monthly_payment, calculate_payoff_date, calculate_total_interest, MAX_PAYOFF_MONTHS,
};
use crate::calendar::{add_months, resolve_date, Clock, SystemClock};
use crate::error::LoanAnalyticsError;
use crate::time_value::{monthly_rate, round_money};
use crate::types::{format_ringgit, with_metadata, ComputationOutput, Money, Percent};
use crate::LoanAnalyticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardInput {
    pub balance: Money,
    pub annual_rate_percent: Percent,
    /// Share of the statement balance billed as the minimum, in percent.
    #[serde(default = "default_minimum_percent")]
    pub minimum_payment_percent: Percent,
    /// The minimum is never below this (unless the balance is smaller).
    #[serde(default = "default_minimum_floor")]
    pub minimum_payment_floor: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

fn default_minimum_percent() -> Percent {
    dec!(5)
}

fn default_minimum_floor() -> Money {
    dec!(50)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub first_payment: Money,
    pub months: u32,
    pub payoff_date: NaiveDate,
    pub total_interest: Money,
    pub total_paid: Money,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPlan {
    pub target_months: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub payoff_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardPlanOutput {
    pub minimum_payment_now: Money,
    pub minimum_plan: RepaymentPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_plan: Option<RepaymentPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_plan: Option<TargetPlan>,
    /// Interest the fixed plan avoids compared with paying the minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_saved_vs_minimum: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn plan_credit_card_repayment(
    input: &CreditCardInput,
) -> LoanAnalyticsResult<ComputationOutput<CreditCardPlanOutput>> {
    plan_credit_card_repayment_with_clock(input, &SystemClock)
}

pub fn plan_credit_card_repayment_with_clock(
    input: &CreditCardInput,
    clock: &dyn Clock,
) -> LoanAnalyticsResult<ComputationOutput<CreditCardPlanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let as_of = resolve_date(input.as_of_date, clock);

    let minimum_payment_now = minimum_due(
        input.balance,
        input.minimum_payment_percent,
        input.minimum_payment_floor,
    );
    let minimum_plan = simulate_minimum_payments(input, as_of)?;
    if !minimum_plan.converged {
        warnings.push(format!(
            "Paying only the minimum does not clear the balance within {MAX_PAYOFF_MONTHS} months."
        ));
    }

    let fixed_plan = match input.fixed_payment {
        Some(payment) => {
            let projection = calculate_payoff_date(
                input.balance,
                input.annual_rate_percent,
                payment,
                Decimal::ZERO,
                as_of,
            )?;
            if !projection.converged {
                warnings.push(format!(
                    "A fixed payment of {} does not cover the monthly interest.",
                    format_ringgit(payment)
                ));
            }
            let first_interest =
                round_money(input.balance * monthly_rate(input.annual_rate_percent));
            Some(RepaymentPlan {
                first_payment: payment.min(input.balance + first_interest),
                months: projection.months,
                payoff_date: projection.payoff_date,
                total_interest: projection.total_interest,
                total_paid: input.balance - projection.final_balance + projection.total_interest,
                converged: projection.converged,
            })
        }
        None => None,
    };

    let target_plan = match input.target_months {
        Some(months) if !input.balance.is_zero() => Some(TargetPlan {
            target_months: months,
            monthly_payment: calculate_monthly_payment(
                input.balance,
                input.annual_rate_percent,
                months,
            )?,
            total_interest: calculate_total_interest(
                input.balance,
                input.annual_rate_percent,
                months,
            )?,
            payoff_date: add_months(as_of, months)?,
        }),
        _ => None,
    };

    let interest_saved_vs_minimum = fixed_plan
        .as_ref()
        .filter(|p| p.converged && minimum_plan.converged)
        .map(|p| minimum_plan.total_interest - p.total_interest);

    let output = CreditCardPlanOutput {
        minimum_payment_now,
        minimum_plan,
        fixed_plan,
        target_plan,
        interest_saved_vs_minimum,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of_date": as_of.to_string(),
        "minimum_payment_percent": input.minimum_payment_percent.to_string(),
        "minimum_payment_floor": input.minimum_payment_floor.to_string(),
        "new_purchases": "none",
    });

    Ok(with_metadata(
        "Credit card repayment plan (minimum vs fixed vs target)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Minimum due on a statement balance, never more than the balance itself.
pub fn minimum_due(statement_balance: Money, percent: Percent, floor: Money) -> Money {
    round_money(statement_balance * percent / dec!(100))
        .max(floor)
        .min(statement_balance)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn simulate_minimum_payments(
    input: &CreditCardInput,
    as_of: NaiveDate,
) -> LoanAnalyticsResult<RepaymentPlan> {
    let rate = monthly_rate(input.annual_rate_percent);
    let mut balance = input.balance;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut first_payment = None;
    let mut months = 0u32;

    while balance > Decimal::ZERO && months < MAX_PAYOFF_MONTHS {
        let interest = round_money(balance * rate);
        let statement = balance + interest;
        let payment = minimum_due(
            statement,
            input.minimum_payment_percent,
            input.minimum_payment_floor,
        );
        first_payment.get_or_insert(payment);

        balance = statement - payment;
        total_interest += interest;
        total_paid += payment;
        months += 1;
    }

    Ok(RepaymentPlan {
        first_payment: first_payment.unwrap_or(Decimal::ZERO),
        months,
        payoff_date: add_months(as_of, months)?,
        total_interest,
        total_paid,
        converged: balance <= Decimal::ZERO,
    })
}

fn validate_input(input: &CreditCardInput) -> LoanAnalyticsResult<()> {
    if input.balance < Decimal::ZERO {
        return Err(LoanAnalyticsError::invalid("balance", "Balance cannot be negative."));
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(LoanAnalyticsError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }
    if input.minimum_payment_percent <= Decimal::ZERO || input.minimum_payment_percent > dec!(100)
    {
        return Err(LoanAnalyticsError::invalid(
            "minimum_payment_percent",
            "Minimum payment percent must be within (0, 100].",
        ));
    }
    if input.minimum_payment_floor < Decimal::ZERO {
        return Err(LoanAnalyticsError::invalid(
            "minimum_payment_floor",
            "Minimum payment floor cannot be negative.",
        ));
    }
    if let Some(p) = input.fixed_payment {
        if p <= Decimal::ZERO {
            return Err(LoanAnalyticsError::invalid(
                "fixed_payment",
                "Fixed payment must be positive.",
            ));
        }
    }
    if input.target_months == Some(0) {
        return Err(LoanAnalyticsError::invalid(
            "target_months",
            "Target must be at least one month.",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
