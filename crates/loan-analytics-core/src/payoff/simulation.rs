//! Month-by-month simulation of a set of loans paid down together.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::engine::{month_step, MAX_PAYOFF_MONTHS};
use crate::calendar::add_months;
use crate::loan::LoanRecord;
use crate::payoff::strategy::ExtraPaymentAllocation;
use crate::time_value::monthly_rate;
use crate::types::{Money, Rate};
use crate::LoanAnalyticsResult;

/// How one loan fared in a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOutcome {
    pub loan_id: String,
    pub loan_name: String,
    pub months_to_payoff: u32,
    pub payoff_date: NaiveDate,
    pub total_interest: Money,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct SimulationResult {
    /// Same order as the loans passed in.
    pub outcomes: Vec<LoanOutcome>,
    /// Months until the last loan is cleared (or the cap).
    pub months: u32,
    pub converged: bool,
    /// Aggregate balance at the end of each simulated month.
    pub balance_path: Vec<Money>,
}

struct RunningLoan<'a> {
    loan: &'a LoanRecord,
    rate: Rate,
    balance: Money,
    interest: Money,
    paid_off_in: Option<u32>,
}

/// Pay the loans down together starting at `as_of`.
///
/// `ordered` is the priority order; it only matters for
/// [`ExtraPaymentAllocation::Cascade`].
pub(crate) fn simulate(
    ordered: &[&LoanRecord],
    extra_payment: Money,
    allocation: ExtraPaymentAllocation,
    as_of: NaiveDate,
) -> LoanAnalyticsResult<SimulationResult> {
    let mut running: Vec<RunningLoan<'_>> = ordered
        .iter()
        .map(|loan| RunningLoan {
            loan,
            rate: monthly_rate(loan.annual_rate_percent),
            balance: loan.balance_current,
            interest: Decimal::ZERO,
            paid_off_in: if loan.balance_current > Decimal::ZERO {
                None
            } else {
                Some(0)
            },
        })
        .collect();

    let even_share = match allocation {
        ExtraPaymentAllocation::EvenSplit if !ordered.is_empty() => {
            extra_payment / Decimal::from(ordered.len() as u64)
        }
        _ => Decimal::ZERO,
    };

    let mut month = 0u32;
    let mut overflowed = false;
    let mut balance_path = Vec::new();

    while month < MAX_PAYOFF_MONTHS && running.iter().any(|r| r.paid_off_in.is_none()) {
        month += 1;

        // Cascade pool: the extra payment plus every payment freed up by a
        // loan cleared in an earlier month of this simulation.
        let mut pool = match allocation {
            ExtraPaymentAllocation::Cascade => {
                extra_payment
                    + running
                        .iter()
                        .filter(|r| matches!(r.paid_off_in, Some(m) if m > 0))
                        .map(|r| r.loan.monthly_payment)
                        .sum::<Money>()
            }
            ExtraPaymentAllocation::EvenSplit => Decimal::ZERO,
        };

        for r in running.iter_mut().filter(|r| r.paid_off_in.is_none()) {
            let payment = r.loan.monthly_payment + even_share;
            let Some(step) = month_step(r.balance, r.rate, payment) else {
                overflowed = true;
                break;
            };
            r.balance -= step.principal;
            r.interest += step.interest;

            if r.balance <= Decimal::ZERO {
                r.balance = Decimal::ZERO;
                r.paid_off_in = Some(month);
                if allocation == ExtraPaymentAllocation::Cascade {
                    // Whatever the final payment did not need rolls forward.
                    pool += payment - step.interest - step.principal;
                }
            }
        }
        if overflowed {
            break;
        }

        if allocation == ExtraPaymentAllocation::Cascade {
            for r in running.iter_mut().filter(|r| r.paid_off_in.is_none()) {
                if pool <= Decimal::ZERO {
                    break;
                }
                let applied = pool.min(r.balance);
                r.balance -= applied;
                pool -= applied;
                if r.balance.is_zero() {
                    r.paid_off_in = Some(month);
                }
            }
        }

        balance_path.push(running.iter().map(|r| r.balance).sum());
    }

    let outcomes = running
        .iter()
        .map(|r| {
            let months_to_payoff = r.paid_off_in.unwrap_or(MAX_PAYOFF_MONTHS);
            Ok(LoanOutcome {
                loan_id: r.loan.id.clone(),
                loan_name: r.loan.label().to_string(),
                months_to_payoff,
                payoff_date: add_months(as_of, months_to_payoff)?,
                total_interest: r.interest,
                converged: r.paid_off_in.is_some(),
            })
        })
        .collect::<LoanAnalyticsResult<Vec<_>>>()?;

    let converged = outcomes.iter().all(|o| o.converged);
    let months = outcomes
        .iter()
        .map(|o| o.months_to_payoff)
        .max()
        .unwrap_or(0);

    log::debug!(
        "simulated {} loans ({allocation:?}, extra {extra_payment}): \
         {months} months, converged={converged}",
        ordered.len()
    );

    Ok(SimulationResult {
        outcomes,
        months,
        converged,
        balance_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::engine::calculate_payoff_date;
    use crate::loan::fixtures::loan;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_single_loan_matches_payoff_date() {
        let l = loan("A", dec!(20_000), dec!(7), dec!(400));
        let sim = simulate(&[&l], dec!(100), ExtraPaymentAllocation::EvenSplit, as_of()).unwrap();
        let direct =
            calculate_payoff_date(dec!(20_000), dec!(7), dec!(400), dec!(100), as_of()).unwrap();
        assert_eq!(sim.months, direct.months);
        assert_eq!(sim.outcomes[0].total_interest, direct.total_interest);
        assert_eq!(sim.outcomes[0].payoff_date, direct.payoff_date);
    }

    #[test]
    fn test_even_split_is_order_independent() {
        let a = loan("A", dec!(3_000), dec!(10), dec!(150));
        let b = loan("B", dec!(9_000), dec!(18), dec!(300));
        let ab =
            simulate(&[&a, &b], dec!(200), ExtraPaymentAllocation::EvenSplit, as_of()).unwrap();
        let ba =
            simulate(&[&b, &a], dec!(200), ExtraPaymentAllocation::EvenSplit, as_of()).unwrap();
        assert_eq!(ab.months, ba.months);
        let total_ab: Money = ab.outcomes.iter().map(|o| o.total_interest).sum();
        let total_ba: Money = ba.outcomes.iter().map(|o| o.total_interest).sum();
        assert_eq!(total_ab, total_ba);
    }

    #[test]
    fn test_cascade_clears_priority_loan_first() {
        let a = loan("A", dec!(3_000), dec!(10), dec!(150));
        let b = loan("B", dec!(9_000), dec!(18), dec!(300));
        let sim = simulate(&[&b, &a], dec!(500), ExtraPaymentAllocation::Cascade, as_of()).unwrap();
        // B is targeted first, so it clears before A despite the larger balance.
        assert!(sim.outcomes[0].months_to_payoff < sim.outcomes[1].months_to_payoff);
        assert!(sim.converged);
    }

    #[test]
    fn test_cascade_beats_even_split_on_interest_when_targeting_high_rate() {
        let a = loan("A", dec!(5_000), dec!(6), dec!(150));
        let b = loan("B", dec!(5_000), dec!(24), dec!(150));
        let even =
            simulate(&[&b, &a], dec!(400), ExtraPaymentAllocation::EvenSplit, as_of()).unwrap();
        let cascade =
            simulate(&[&b, &a], dec!(400), ExtraPaymentAllocation::Cascade, as_of()).unwrap();
        let even_interest: Money = even.outcomes.iter().map(|o| o.total_interest).sum();
        let cascade_interest: Money = cascade.outcomes.iter().map(|o| o.total_interest).sum();
        assert!(cascade_interest < even_interest);
    }

    #[test]
    fn test_balance_path_is_non_increasing_when_payments_cover_interest() {
        let a = loan("A", dec!(3_000), dec!(10), dec!(150));
        let b = loan("B", dec!(9_000), dec!(18), dec!(300));
        let sim = simulate(&[&a, &b], dec!(100), ExtraPaymentAllocation::Cascade, as_of()).unwrap();
        assert_eq!(sim.balance_path.len() as u32, sim.months);
        for pair in sim.balance_path.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(*sim.balance_path.last().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_non_convergent_loan_hits_cap() {
        let ok = loan("OK", dec!(1_000), dec!(5), dec!(100));
        let stuck = loan("STUCK", dec!(100_000), dec!(12), dec!(500));
        let sim =
            simulate(&[&ok, &stuck], Decimal::ZERO, ExtraPaymentAllocation::EvenSplit, as_of())
                .unwrap();
        assert!(!sim.converged);
        assert_eq!(sim.months, MAX_PAYOFF_MONTHS);
        assert!(sim.outcomes[0].converged);
        assert!(!sim.outcomes[1].converged);
    }

    #[test]
    fn test_zero_balance_loan_is_already_clear() {
        let mut done = loan("DONE", dec!(1_000), dec!(5), dec!(100));
        done.balance_current = Decimal::ZERO;
        let sim = simulate(&[&done], dec!(50), ExtraPaymentAllocation::Cascade, as_of()).unwrap();
        assert_eq!(sim.months, 0);
        assert!(sim.converged);
        assert_eq!(sim.outcomes[0].payoff_date, as_of());
    }
}
