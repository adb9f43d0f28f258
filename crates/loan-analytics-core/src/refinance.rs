//! Refinance opportunity analysis: payment and lifetime savings from moving
//! a loan's outstanding balance to a new rate, net of closing costs.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::amortization::engine::{
    calculate_monthly_payment, calculate_remaining_interest, project_fixed_payment,
};
use crate::error::LoanAnalyticsError;
use crate::loan::LoanRecord;
use crate::types::{format_ringgit, with_metadata, ComputationOutput, Money, Percent};
use crate::LoanAnalyticsResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Break-even reported when the new payment saves nothing.
pub const BREAK_EVEN_NEVER: u32 = 999;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Thresholds a refinance must clear to be recommended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinancePolicy {
    /// Lifetime savings must exceed this.
    #[serde(default = "default_min_lifetime_savings")]
    pub min_lifetime_savings: Money,
    /// Break-even must come sooner than this many months.
    #[serde(default = "default_max_break_even_months")]
    pub max_break_even_months: u32,
}

fn default_min_lifetime_savings() -> Money {
    dec!(5000)
}

fn default_max_break_even_months() -> u32 {
    36
}

impl Default for RefinancePolicy {
    fn default() -> Self {
        Self {
            min_lifetime_savings: default_min_lifetime_savings(),
            max_break_even_months: default_max_break_even_months(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub loan: LoanRecord,
    pub new_rate: Percent,
    #[serde(default)]
    pub closing_costs: Money,
    #[serde(default)]
    pub policy: RefinancePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceAnalysis {
    pub loan_id: String,
    pub current_rate: Percent,
    pub new_rate: Percent,
    pub current_monthly_payment: Money,
    pub new_monthly_payment: Money,
    pub monthly_savings: Money,
    pub current_remaining_interest: Money,
    /// Balance the current payment leaves owing when the remaining months
    /// run out; zero when it clears the loan.
    pub current_residual_balance: Money,
    pub new_remaining_interest: Money,
    pub closing_costs: Money,
    /// Interest saved minus closing costs.
    pub lifetime_savings: Money,
    /// Months of savings needed to recover closing costs; 999 means never.
    pub break_even_months: u32,
    pub is_recommended: bool,
}

/// A lender's refinance quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOffer {
    pub lender: String,
    pub new_rate: Percent,
    #[serde(default)]
    pub closing_costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceComparisonInput {
    pub loan: LoanRecord,
    pub offers: Vec<RefinanceOffer>,
    #[serde(default)]
    pub policy: RefinancePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedOffer {
    pub rank: u32,
    pub lender: String,
    pub analysis: RefinanceAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceComparisonOutput {
    /// Best first: highest lifetime savings, then earliest break-even.
    pub offers: Vec<RankedOffer>,
    /// Lender of the top-ranked offer, if it is recommended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_recommended: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate moving a loan's balance to `new_rate` over its remaining months.
pub fn analyze_refinance(
    loan: &LoanRecord,
    new_rate: Percent,
    closing_costs: Money,
    policy: &RefinancePolicy,
) -> LoanAnalyticsResult<RefinanceAnalysis> {
    loan.validate()?;
    if new_rate < Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "new_rate".into(),
            reason: "New interest rate cannot be negative.".into(),
        });
    }
    if closing_costs < Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "closing_costs".into(),
            reason: "Closing costs cannot be negative.".into(),
        });
    }

    let remaining = loan.remaining_months();
    let balance = loan.balance_current;

    // The current payment may not cover interest; project it as-is.
    let current = project_fixed_payment(
        balance,
        loan.annual_rate_percent,
        remaining,
        loan.monthly_payment,
    )?;

    let (new_payment, new_interest) = if balance.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            calculate_monthly_payment(balance, new_rate, remaining)?,
            calculate_remaining_interest(balance, new_rate, remaining, None)?,
        )
    };

    let monthly_savings = loan.monthly_payment - new_payment;
    let lifetime_savings = current.total_interest - new_interest - closing_costs;
    let break_even_months = break_even(closing_costs, monthly_savings);

    let is_recommended = lifetime_savings > policy.min_lifetime_savings
        && break_even_months < policy.max_break_even_months;

    Ok(RefinanceAnalysis {
        loan_id: loan.id.clone(),
        current_rate: loan.annual_rate_percent,
        new_rate,
        current_monthly_payment: loan.monthly_payment,
        new_monthly_payment: new_payment,
        monthly_savings,
        current_remaining_interest: current.total_interest,
        current_residual_balance: current.residual_balance,
        new_remaining_interest: new_interest,
        closing_costs,
        lifetime_savings,
        break_even_months,
        is_recommended,
    })
}

/// [`analyze_refinance`] wrapped in the standard output envelope.
pub fn analyze_refinance_opportunity(
    input: &RefinanceInput,
) -> LoanAnalyticsResult<ComputationOutput<RefinanceAnalysis>> {
    let start = Instant::now();
    let mut warnings = input.loan.validate()?;

    let analysis = analyze_refinance(
        &input.loan,
        input.new_rate,
        input.closing_costs,
        &input.policy,
    )?;

    warnings.extend(residual_warning(&input.loan, &analysis));
    if analysis.break_even_months == BREAK_EVEN_NEVER {
        warnings.push(format!(
            "The new payment ({}) is not lower than the current one; \
             closing costs are never recovered.",
            format_ringgit(analysis.new_monthly_payment)
        ));
    } else if analysis.break_even_months >= input.loan.remaining_months() {
        warnings.push(format!(
            "Break-even ({} months) is not reached before the loan ends ({} months).",
            analysis.break_even_months,
            input.loan.remaining_months()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "remaining_months": input.loan.remaining_months(),
        "min_lifetime_savings": input.policy.min_lifetime_savings.to_string(),
        "max_break_even_months": input.policy.max_break_even_months,
    });

    Ok(with_metadata(
        "Refinance break-even and lifetime savings",
        &assumptions,
        warnings,
        elapsed,
        analysis,
    ))
}

/// Analyse several lender quotes for the same loan and rank them.
pub fn compare_refinance_offers(
    input: &RefinanceComparisonInput,
) -> LoanAnalyticsResult<ComputationOutput<RefinanceComparisonOutput>> {
    let start = Instant::now();
    if input.offers.is_empty() {
        return Err(LoanAnalyticsError::InsufficientData(
            "At least one refinance offer is required.".into(),
        ));
    }
    let mut warnings = input.loan.validate()?;

    let mut analysed = input
        .offers
        .iter()
        .map(|offer| {
            analyze_refinance(&input.loan, offer.new_rate, offer.closing_costs, &input.policy)
                .map(|analysis| (offer.lender.clone(), analysis))
        })
        .collect::<LoanAnalyticsResult<Vec<_>>>()?;

    analysed.sort_by(|(_, a), (_, b)| rank_order(a, b));

    let offers: Vec<RankedOffer> = analysed
        .into_iter()
        .enumerate()
        .map(|(i, (lender, analysis))| RankedOffer {
            rank: i as u32 + 1,
            lender,
            analysis,
        })
        .collect();

    if let Some(first) = offers.first() {
        warnings.extend(residual_warning(&input.loan, &first.analysis));
    }

    let best_recommended = offers
        .first()
        .filter(|o| o.analysis.is_recommended)
        .map(|o| o.lender.clone());

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ranking": "lifetime savings, then break-even months",
        "offers": input.offers.len(),
    });

    Ok(with_metadata(
        "Refinance offer comparison",
        &assumptions,
        warnings,
        elapsed,
        RefinanceComparisonOutput {
            offers,
            best_recommended,
        },
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The current payment does not retire the loan within its remaining months.
/// Best first: more lifetime savings, then a sooner break-even.
fn rank_order(a: &RefinanceAnalysis, b: &RefinanceAnalysis) -> Ordering {
    b.lifetime_savings
        .cmp(&a.lifetime_savings)
        .then(a.break_even_months.cmp(&b.break_even_months))
}

/// Up to a sen per month of residue is payment rounding, not a shortfall.
fn residual_warning(loan: &LoanRecord, analysis: &RefinanceAnalysis) -> Option<String> {
    let rounding_drift = Decimal::from(loan.remaining_months()) * dec!(0.01);
    if analysis.current_residual_balance <= rounding_drift {
        return None;
    }
    Some(format!(
        "At the current payment of {}, {} is still owed after the {} remaining months; \
         current interest covers those months only.",
        format_ringgit(loan.monthly_payment),
        format_ringgit(analysis.current_residual_balance),
        loan.remaining_months()
    ))
}

fn break_even(closing_costs: Money, monthly_savings: Money) -> u32 {
    if monthly_savings <= Decimal::ZERO {
        return BREAK_EVEN_NEVER;
    }
    (closing_costs / monthly_savings)
        .ceil()
        .to_u32()
        .map_or(BREAK_EVEN_NEVER, |m| m.min(BREAK_EVEN_NEVER))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
