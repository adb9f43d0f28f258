use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::engine::{
    calculate_monthly_payment, calculate_payoff_date, calculate_total_interest,
    generate_amortization_schedule, PayoffProjection, ScheduleEntry,
};
use crate::calendar::{add_months, months_between, resolve_date, Clock, SystemClock};
use crate::error::LoanAnalyticsError;
use crate::loan::LoanRecord;
use crate::time_value::round_money;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LoanAnalyticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    pub start_date: NaiveDate,
    /// Pay this amount instead of the level payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment_override: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub number_of_payments: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_payment_date: Option<NaiveDate>,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisInput {
    pub loan: LoanRecord,
    /// Additional amount paid every month on top of the scheduled payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<Money>,
    /// Date projections start from; today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisOutput {
    pub loan_id: String,
    /// Level payment implied by the original principal, rate and term.
    pub calculated_monthly_payment: Money,
    pub scheduled_monthly_payment: Money,
    pub original_total_interest: Money,
    pub principal_repaid: Money,
    /// Whole calendar months from the loan's start to the as-of date.
    pub months_elapsed: u32,
    pub scheduled_end_date: NaiveDate,
    /// Share of the original principal repaid, 0–100.
    pub progress_percent: Decimal,
    /// Interest still to pay at the scheduled payment.
    pub remaining_interest: Money,
    pub projected_payoff: PayoffProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_extra_payment: Option<PayoffProjection>,
    pub interest_saved: Money,
    pub months_saved: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate a full schedule with its totals.
pub fn build_schedule(
    input: &ScheduleInput,
) -> LoanAnalyticsResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let level_payment =
        calculate_monthly_payment(input.principal, input.annual_rate_percent, input.term_months)?;
    let entries = generate_amortization_schedule(
        input.principal,
        input.annual_rate_percent,
        input.term_months,
        input.start_date,
        input.monthly_payment_override,
    )?;

    if let Some(over) = input.monthly_payment_override {
        if over < level_payment {
            warnings.push(format!(
                "Override payment {over} is below the level payment {level_payment}; \
                 the balance left at the end of the term is not covered by these payments."
            ));
        }
    }

    let total_interest: Money = entries.iter().map(|e| e.interest_portion).sum();
    let total_paid: Money = entries.iter().map(|e| e.payment_amount).sum();

    let output = ScheduleOutput {
        monthly_payment: input.monthly_payment_override.unwrap_or(level_payment),
        number_of_payments: entries.len() as u32,
        total_interest,
        total_paid,
        final_payment_date: entries.last().map(|e| e.payment_date),
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "interest_rounding": "half-up to 2 dp each period",
        "final_balance": "forced to zero on the last scheduled payment",
    });

    Ok(with_metadata(
        "Fixed-rate amortisation schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Summarise a running loan and the effect of paying extra each month.
pub fn analyze_loan(
    input: &LoanAnalysisInput,
) -> LoanAnalyticsResult<ComputationOutput<LoanAnalysisOutput>> {
    analyze_loan_with_clock(input, &SystemClock)
}

pub fn analyze_loan_with_clock(
    input: &LoanAnalysisInput,
    clock: &dyn Clock,
) -> LoanAnalyticsResult<ComputationOutput<LoanAnalysisOutput>> {
    let start = Instant::now();
    let loan = &input.loan;
    let mut warnings = loan.validate()?;

    let extra = input.extra_payment.unwrap_or(Decimal::ZERO);
    if extra < Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "extra_payment".into(),
            reason: "Extra payment cannot be negative.".into(),
        });
    }
    let as_of = resolve_date(input.as_of_date, clock);

    let calculated = calculate_monthly_payment(
        loan.principal_original,
        loan.annual_rate_percent,
        loan.term_months,
    )?;
    let original_total_interest = calculate_total_interest(
        loan.principal_original,
        loan.annual_rate_percent,
        loan.term_months,
    )?;

    let principal_repaid = (loan.principal_original - loan.balance_current).max(Decimal::ZERO);
    let progress_percent = round_money(principal_repaid / loan.principal_original * dec!(100));

    let months_elapsed = u32::try_from(months_between(loan.start_date, as_of)).unwrap_or(0);
    let scheduled_end_date = add_months(loan.start_date, loan.term_months)?;
    if months_elapsed > loan.term_months && loan.balance_current > Decimal::ZERO {
        warnings.push(format!(
            "Loan '{}': the original term ended on {scheduled_end_date} but a balance remains.",
            loan.id
        ));
    }

    let projected = calculate_payoff_date(
        loan.balance_current,
        loan.annual_rate_percent,
        loan.monthly_payment,
        Decimal::ZERO,
        as_of,
    )?;
    if !projected.converged {
        warnings.push(format!(
            "Loan '{}': the scheduled payment does not retire the balance within {} months.",
            loan.id, projected.months
        ));
    } else if projected.months > loan.remaining_months() {
        warnings.push(format!(
            "Loan '{}': at the scheduled payment the balance clears in {} months, \
             later than the {} months remaining.",
            loan.id,
            projected.months,
            loan.remaining_months()
        ));
    }

    let with_extra = if extra > Decimal::ZERO {
        Some(calculate_payoff_date(
            loan.balance_current,
            loan.annual_rate_percent,
            loan.monthly_payment,
            extra,
            as_of,
        )?)
    } else {
        None
    };

    let (interest_saved, months_saved) = match &with_extra {
        Some(p) => (
            projected.total_interest - p.total_interest,
            projected.months.saturating_sub(p.months),
        ),
        None => (Decimal::ZERO, 0),
    };

    let output = LoanAnalysisOutput {
        loan_id: loan.id.clone(),
        calculated_monthly_payment: calculated,
        scheduled_monthly_payment: loan.monthly_payment,
        original_total_interest,
        principal_repaid,
        months_elapsed,
        scheduled_end_date,
        progress_percent,
        remaining_interest: projected.total_interest,
        projected_payoff: projected,
        with_extra_payment: with_extra,
        interest_saved,
        months_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of_date": as_of.to_string(),
        "extra_payment": extra.to_string(),
        "balance_source": "stored current balance, not reconciled against a schedule",
    });

    Ok(with_metadata(
        "Loan progress and extra-payment projection",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
