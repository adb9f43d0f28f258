//! Payoff orderings and the fixed advisory copy attached to each.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::loan::LoanRecord;
use crate::types::format_ringgit;

/// Which order loans are targeted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Input order, scheduled payments only.
    Current,
    /// Smallest balance first.
    Snowball,
    /// Highest rate first.
    Avalanche,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Current => "Current plan",
            StrategyKind::Snowball => "Debt snowball",
            StrategyKind::Avalanche => "Debt avalanche",
        };
        f.write_str(name)
    }
}

/// How the extra monthly payment is spread across loans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPaymentAllocation {
    /// Each loan gets `extra / loan_count` every month regardless of order.
    /// Snowball and avalanche then differ only in their advisory ordering.
    #[default]
    EvenSplit,
    /// All extra money, plus the payments of loans already cleared, goes to
    /// the first unpaid loan in priority order.
    Cascade,
}

/// One entry of a strategy's payoff order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffStep {
    pub loan_id: String,
    pub loan_name: String,
    pub reason: String,
}

/// Loans in the order the strategy targets them. Sorting is stable, so ties
/// keep their input order.
pub fn order_loans(kind: StrategyKind, loans: &[LoanRecord]) -> Vec<&LoanRecord> {
    let mut ordered: Vec<&LoanRecord> = loans.iter().collect();
    match kind {
        StrategyKind::Current => {}
        StrategyKind::Snowball => {
            ordered.sort_by(|a, b| a.balance_current.cmp(&b.balance_current))
        }
        StrategyKind::Avalanche => {
            ordered.sort_by(|a, b| b.annual_rate_percent.cmp(&a.annual_rate_percent))
        }
    }
    ordered
}

/// Describe the order with a short reason per loan.
pub fn payoff_order(kind: StrategyKind, ordered: &[&LoanRecord]) -> Vec<PayoffStep> {
    ordered
        .iter()
        .enumerate()
        .map(|(i, loan)| PayoffStep {
            loan_id: loan.id.clone(),
            loan_name: loan.label().to_string(),
            reason: step_reason(kind, i, loan),
        })
        .collect()
}

fn step_reason(kind: StrategyKind, position: usize, loan: &LoanRecord) -> String {
    match (kind, position) {
        (StrategyKind::Current, _) => format!(
            "Continue the scheduled payment of {}",
            format_ringgit(loan.monthly_payment)
        ),
        (StrategyKind::Snowball, 0) => format!(
            "Smallest balance ({}): clear it first for a quick win",
            format_ringgit(loan.balance_current)
        ),
        (StrategyKind::Snowball, _) => format!(
            "Next smallest balance ({})",
            format_ringgit(loan.balance_current)
        ),
        (StrategyKind::Avalanche, 0) => format!(
            "Highest interest rate ({}%): it costs you the most each month",
            loan.annual_rate_percent.normalize()
        ),
        (StrategyKind::Avalanche, _) => format!(
            "Next highest interest rate ({}%)",
            loan.annual_rate_percent.normalize()
        ),
    }
}

pub fn pros(kind: StrategyKind) -> Vec<String> {
    let items: &[&str] = match kind {
        StrategyKind::Current => &[
            "No change to your monthly budget",
            "Predictable, fixed payments",
        ],
        StrategyKind::Snowball => &[
            "Quick wins keep you motivated",
            "Fewer bills to track sooner",
            "Simple to follow",
        ],
        StrategyKind::Avalanche => &[
            "Pays the least total interest",
            "Fastest route to debt-free when extra money is applied",
            "Mathematically optimal",
        ],
    };
    items.iter().map(|s| s.to_string()).collect()
}

pub fn cons(kind: StrategyKind) -> Vec<String> {
    let items: &[&str] = match kind {
        StrategyKind::Current => &[
            "Highest total interest cost",
            "Longest time in debt",
        ],
        StrategyKind::Snowball => &[
            "May pay more interest than avalanche",
            "High-rate loans linger longer",
        ],
        StrategyKind::Avalanche => &[
            "First payoff can take a long time",
            "Requires discipline without early wins",
        ],
    };
    items.iter().map(|s| s.to_string()).collect()
}
