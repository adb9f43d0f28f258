use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::amortization::engine::MAX_PAYOFF_MONTHS;
use crate::calendar::{add_months, resolve_date, Clock, SystemClock};
use crate::error::LoanAnalyticsError;
use crate::loan::LoanRecord;
use crate::payoff::simulation::{simulate, LoanOutcome, SimulationResult};
use crate::payoff::strategy::{
    cons, order_loans, payoff_order, pros, ExtraPaymentAllocation, PayoffStep, StrategyKind,
};
use crate::types::{format_ringgit, with_metadata, ComputationOutput, Money};
use crate::LoanAnalyticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffComparisonInput {
    pub loans: Vec<LoanRecord>,
    /// Paid every month on top of the scheduled payments.
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default)]
    pub allocation: ExtraPaymentAllocation,
    /// Projection start; today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffStrategy {
    pub strategy: StrategyKind,
    pub payoff_order: Vec<PayoffStep>,
    /// When the last loan reaches zero.
    pub payoff_date: NaiveDate,
    pub months_to_payoff: u32,
    pub total_interest: Money,
    /// Against the current plan.
    pub interest_saved: Money,
    /// Against the current plan, whole months.
    pub months_saved: u32,
    /// False when any loan hit the 600-month cap.
    pub converged: bool,
    pub loans: Vec<LoanOutcome>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: StrategyKind,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    FirstLoanPaidOff,
    HalfDebtRepaid,
    DebtFree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub title: String,
    pub date: NaiveDate,
    pub months_from_now: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffComparisonOutput {
    pub as_of_date: NaiveDate,
    pub extra_payment: Money,
    pub allocation: ExtraPaymentAllocation,
    pub total_balance: Money,
    pub current: PayoffStrategy,
    pub snowball: PayoffStrategy,
    pub avalanche: PayoffStrategy,
    pub recommendation: Recommendation,
    /// Projected from the recommended strategy.
    pub milestones: Vec<Milestone>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the current plan, snowball and avalanche for a set of loans.
pub fn compare_payoff_strategies(
    input: &PayoffComparisonInput,
) -> LoanAnalyticsResult<ComputationOutput<PayoffComparisonOutput>> {
    compare_payoff_strategies_with_clock(input, &SystemClock)
}

pub fn compare_payoff_strategies_with_clock(
    input: &PayoffComparisonInput,
    clock: &dyn Clock,
) -> LoanAnalyticsResult<ComputationOutput<PayoffComparisonOutput>> {
    let start = Instant::now();
    let mut warnings = validate_input(input)?;
    let as_of = resolve_date(input.as_of_date, clock);

    // Baseline: input order, scheduled payments only.
    let current_order = order_loans(StrategyKind::Current, &input.loans);
    let baseline = simulate(
        &current_order,
        Decimal::ZERO,
        ExtraPaymentAllocation::EvenSplit,
        as_of,
    )?;
    let baseline_interest = total_interest(&baseline);

    let current = build_strategy(
        StrategyKind::Current,
        &current_order,
        &baseline,
        &baseline,
        as_of,
    )?;

    let snowball_order = order_loans(StrategyKind::Snowball, &input.loans);
    let snowball_sim = simulate(&snowball_order, input.extra_payment, input.allocation, as_of)?;
    let snowball = build_strategy(
        StrategyKind::Snowball,
        &snowball_order,
        &snowball_sim,
        &baseline,
        as_of,
    )?;

    let avalanche_order = order_loans(StrategyKind::Avalanche, &input.loans);
    let avalanche_sim = simulate(&avalanche_order, input.extra_payment, input.allocation, as_of)?;
    let avalanche = build_strategy(
        StrategyKind::Avalanche,
        &avalanche_order,
        &avalanche_sim,
        &baseline,
        as_of,
    )?;

    for s in [&current, &snowball, &avalanche] {
        if !s.converged {
            let stuck: Vec<&str> = s
                .loans
                .iter()
                .filter(|l| !l.converged)
                .map(|l| l.loan_id.as_str())
                .collect();
            warnings.push(format!(
                "{}: payments do not clear {} within {MAX_PAYOFF_MONTHS} months; \
                 the payoff date is a cap, not a projection.",
                s.strategy,
                stuck.join(", ")
            ));
        }
    }

    let (recommendation, recommended_sim, recommended_order) =
        if avalanche.interest_saved >= snowball.interest_saved {
            (
                recommend(&avalanche, &snowball, input),
                &avalanche_sim,
                &avalanche_order,
            )
        } else {
            (
                recommend(&snowball, &avalanche, input),
                &snowball_sim,
                &snowball_order,
            )
        };

    let total_balance: Money = input.loans.iter().map(|l| l.balance_current).sum();
    let milestones = build_milestones(recommended_sim, recommended_order, total_balance, as_of)?;

    log::debug!(
        "payoff comparison for {} loans: baseline interest {baseline_interest}, recommended {:?}",
        input.loans.len(),
        recommendation.strategy
    );

    let output = PayoffComparisonOutput {
        as_of_date: as_of,
        extra_payment: input.extra_payment,
        allocation: input.allocation,
        total_balance,
        current,
        snowball,
        avalanche,
        recommendation,
        milestones,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of_date": as_of.to_string(),
        "extra_payment": input.extra_payment.to_string(),
        "allocation": input.allocation,
        "baseline": "current plan, scheduled payments only",
        "max_months": MAX_PAYOFF_MONTHS,
    });

    Ok(with_metadata(
        "Debt payoff strategy comparison (current / snowball / avalanche)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &PayoffComparisonInput) -> LoanAnalyticsResult<Vec<String>> {
    if input.loans.is_empty() {
        return Err(LoanAnalyticsError::InsufficientData(
            "At least one loan is required to compare payoff strategies.".into(),
        ));
    }
    if input.extra_payment < Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "extra_payment".into(),
            reason: "Extra payment cannot be negative.".into(),
        });
    }

    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for loan in &input.loans {
        if !seen.insert(loan.id.as_str()) {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "loans".into(),
                reason: format!("Duplicate loan id '{}'.", loan.id),
            });
        }
        warnings.extend(loan.validate()?);
    }
    Ok(warnings)
}

fn total_interest(sim: &SimulationResult) -> Money {
    sim.outcomes.iter().map(|o| o.total_interest).sum()
}

fn build_strategy(
    kind: StrategyKind,
    ordered: &[&LoanRecord],
    sim: &SimulationResult,
    baseline: &SimulationResult,
    as_of: NaiveDate,
) -> LoanAnalyticsResult<PayoffStrategy> {
    let interest = total_interest(sim);
    Ok(PayoffStrategy {
        strategy: kind,
        payoff_order: payoff_order(kind, ordered),
        payoff_date: add_months(as_of, sim.months)?,
        months_to_payoff: sim.months,
        total_interest: interest,
        interest_saved: total_interest(baseline) - interest,
        months_saved: baseline.months.saturating_sub(sim.months),
        converged: sim.converged,
        loans: sim.outcomes.clone(),
        pros: pros(kind),
        cons: cons(kind),
    })
}

fn recommend(
    winner: &PayoffStrategy,
    other: &PayoffStrategy,
    input: &PayoffComparisonInput,
) -> Recommendation {
    let mut reasoning = Vec::new();

    if let Some(first) = winner.payoff_order.first() {
        let focus = match winner.strategy {
            StrategyKind::Avalanche => "the highest interest rate",
            _ => "the smallest balance",
        };
        reasoning.push(format!(
            "{} targets {} first, the loan with {focus}.",
            winner.strategy, first.loan_name
        ));
    }

    if winner.interest_saved > Decimal::ZERO {
        reasoning.push(format!(
            "Saves {} in interest compared with your current plan.",
            format_ringgit(winner.interest_saved)
        ));
    }
    if winner.months_saved > 0 {
        reasoning.push(format!(
            "You could be debt-free {} months sooner, by {}.",
            winner.months_saved,
            winner.payoff_date.format("%B %Y")
        ));
    }

    if input.extra_payment.is_zero() {
        reasoning.push(
            "No extra payment was entered; adding even a small amount each month \
             shortens every plan."
                .into(),
        );
    } else if winner.interest_saved == other.interest_saved {
        reasoning.push(format!(
            "{} and {} save the same amount with this allocation; the avalanche order is preferred \
             because it minimises interest.",
            winner.strategy, other.strategy
        ));
    } else {
        reasoning.push(format!(
            "{} saves {} more than {}.",
            winner.strategy,
            format_ringgit(winner.interest_saved - other.interest_saved),
            other.strategy
        ));
    }

    Recommendation {
        strategy: winner.strategy,
        reasoning,
    }
}

fn build_milestones(
    sim: &SimulationResult,
    ordered: &[&LoanRecord],
    total_balance: Money,
    as_of: NaiveDate,
) -> LoanAnalyticsResult<Vec<Milestone>> {
    let mut milestones = Vec::new();

    // Loans already at zero are not a milestone.
    let first = sim
        .outcomes
        .iter()
        .zip(ordered)
        .filter(|(o, loan)| o.converged && loan.balance_current > Decimal::ZERO)
        .min_by_key(|(o, _)| o.months_to_payoff);
    if let Some((outcome, _)) = first {
        milestones.push(Milestone {
            kind: MilestoneKind::FirstLoanPaidOff,
            title: "First loan paid off".into(),
            date: outcome.payoff_date,
            months_from_now: outcome.months_to_payoff,
            description: format!("{} is fully repaid.", outcome.loan_name),
        });
    }

    let half = total_balance / dec!(2);
    if total_balance > Decimal::ZERO {
        if let Some(idx) = sim.balance_path.iter().position(|b| *b <= half) {
            let months = idx as u32 + 1;
            milestones.push(Milestone {
                kind: MilestoneKind::HalfDebtRepaid,
                title: "50% debt-free".into(),
                date: add_months(as_of, months)?,
                months_from_now: months,
                description: format!(
                    "Half of today's {} total balance is repaid.",
                    format_ringgit(total_balance)
                ),
            });
        }
    }

    if sim.converged {
        milestones.push(Milestone {
            kind: MilestoneKind::DebtFree,
            title: "Debt-free".into(),
            date: add_months(as_of, sim.months)?,
            months_from_now: sim.months,
            description: "Every loan in the plan is fully repaid.".into(),
        });
    }

    Ok(milestones)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::loan::fixtures::loan;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn household() -> Vec<LoanRecord> {
        vec![
            loan("CAR", dec!(25_000), dec!(3.2), dec!(550)),
            loan("CARD", dec!(6_000), dec!(18), dec!(250)),
            loan("PTPTN", dec!(15_000), dec!(1), dec!(180)),
        ]
    }

    fn input(extra: Money, allocation: ExtraPaymentAllocation) -> PayoffComparisonInput {
        PayoffComparisonInput {
            loans: household(),
            extra_payment: extra,
            allocation,
            as_of_date: Some(as_of()),
        }
    }

    #[test]
    fn test_current_has_no_savings() {
        let out = compare_payoff_strategies(&input(dec!(300), ExtraPaymentAllocation::EvenSplit))
            .unwrap();
        assert_eq!(out.result.current.interest_saved, Decimal::ZERO);
        assert_eq!(out.result.current.months_saved, 0);
    }

    #[test]
    fn test_even_split_ties_favour_avalanche() {
        let out = compare_payoff_strategies(&input(dec!(300), ExtraPaymentAllocation::EvenSplit))
            .unwrap();
        let r = &out.result;
        assert_eq!(r.snowball.total_interest, r.avalanche.total_interest);
        assert_eq!(r.recommendation.strategy, StrategyKind::Avalanche);
        assert!(r.avalanche.interest_saved > Decimal::ZERO);
    }

    #[test]
    fn test_cascade_avalanche_saves_at_least_snowball() {
        let out =
            compare_payoff_strategies(&input(dec!(300), ExtraPaymentAllocation::Cascade)).unwrap();
        let r = &out.result;
        assert!(r.avalanche.interest_saved >= r.snowball.interest_saved);
        assert_eq!(r.recommendation.strategy, StrategyKind::Avalanche);
        assert_eq!(r.avalanche.payoff_order[0].loan_id, "CARD");
        assert_eq!(r.snowball.payoff_order[0].loan_id, "CARD");
    }

    #[test]
    fn test_payoff_date_is_latest_loan() {
        let out = compare_payoff_strategies(&input(dec!(300), ExtraPaymentAllocation::EvenSplit))
            .unwrap();
        let s = &out.result.snowball;
        let latest = s.loans.iter().map(|l| l.payoff_date).max().unwrap();
        assert_eq!(s.payoff_date, latest);
    }

    #[test]
    fn test_milestones_in_order() {
        let out =
            compare_payoff_strategies(&input(dec!(300), ExtraPaymentAllocation::Cascade)).unwrap();
        let m = &out.result.milestones;
        assert_eq!(m.len(), 3);
        assert_eq!(m[0].kind, MilestoneKind::FirstLoanPaidOff);
        assert_eq!(m[1].kind, MilestoneKind::HalfDebtRepaid);
        assert_eq!(m[2].kind, MilestoneKind::DebtFree);
        assert!(m[0].months_from_now <= m[2].months_from_now);
        assert!(m[1].months_from_now <= m[2].months_from_now);
        assert_eq!(m[2].date, out.result.avalanche.payoff_date);
    }

    #[test]
    fn test_clock_supplies_default_date() {
        let mut inp = input(dec!(100), ExtraPaymentAllocation::EvenSplit);
        inp.as_of_date = None;
        let clock = FixedClock(NaiveDate::from_ymd_opt(2030, 6, 15).unwrap());
        let out = compare_payoff_strategies_with_clock(&inp, &clock).unwrap();
        assert_eq!(out.result.as_of_date, clock.0);
    }

    #[test]
    fn test_empty_loans_rejected() {
        let inp = PayoffComparisonInput {
            loans: vec![],
            extra_payment: Decimal::ZERO,
            allocation: ExtraPaymentAllocation::default(),
            as_of_date: Some(as_of()),
        };
        match compare_payoff_strategies(&inp).unwrap_err() {
            LoanAnalyticsError::InsufficientData(_) => {}
            other => panic!("Expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut inp = input(Decimal::ZERO, ExtraPaymentAllocation::EvenSplit);
        inp.loans.push(loan("CAR", dec!(1_000), dec!(5), dec!(100)));
        assert!(compare_payoff_strategies(&inp).is_err());
    }

    #[test]
    fn test_non_convergence_warns() {
        let mut inp = input(Decimal::ZERO, ExtraPaymentAllocation::EvenSplit);
        inp.loans.push(loan("STUCK", dec!(100_000), dec!(12), dec!(500)));
        let out = compare_payoff_strategies(&inp).unwrap();
        assert!(!out.result.current.converged);
        assert_eq!(out.result.current.months_to_payoff, MAX_PAYOFF_MONTHS);
        assert!(out.warnings.iter().any(|w| w.contains("STUCK")));
        assert!(out
            .result
            .milestones
            .iter()
            .all(|m| m.kind != MilestoneKind::DebtFree));
    }
}
