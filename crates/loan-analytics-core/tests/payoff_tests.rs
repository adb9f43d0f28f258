use chrono::NaiveDate;
use loan_analytics_core::calendar::FixedClock;
use loan_analytics_core::payoff::comparator::{
    compare_payoff_strategies, compare_payoff_strategies_with_clock, PayoffComparisonInput,
};
use loan_analytics_core::payoff::strategy::{ExtraPaymentAllocation, StrategyKind};
use loan_analytics_core::LoanRecord;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(id: &str, balance: Decimal, rate: Decimal, payment: Decimal) -> LoanRecord {
    LoanRecord {
        id: id.into(),
        name: format!("{id} loan"),
        principal_original: balance,
        balance_current: balance,
        annual_rate_percent: rate,
        term_months: 36,
        remaining_months: None,
        monthly_payment: payment,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn ordering_input(allocation: ExtraPaymentAllocation) -> PayoffComparisonInput {
    PayoffComparisonInput {
        loans: vec![
            loan("A", dec!(500), dec!(10), dec!(50)),
            loan("B", dec!(2000), dec!(20), dec!(100)),
        ],
        extra_payment: dec!(100),
        allocation,
        as_of_date: Some(as_of()),
    }
}

fn order_ids(steps: &[loan_analytics_core::payoff::strategy::PayoffStep]) -> Vec<&str> {
    steps.iter().map(|s| s.loan_id.as_str()).collect()
}

#[test]
fn test_snowball_and_avalanche_orders() {
    let input = ordering_input(ExtraPaymentAllocation::EvenSplit);
    let out = compare_payoff_strategies(&input).unwrap();
    assert_eq!(order_ids(&out.result.snowball.payoff_order), vec!["A", "B"]);
    assert_eq!(order_ids(&out.result.avalanche.payoff_order), vec!["B", "A"]);
    assert_eq!(order_ids(&out.result.current.payoff_order), vec!["A", "B"]);
}

#[test]
fn test_orders_same_under_cascade() {
    let out = compare_payoff_strategies(&ordering_input(ExtraPaymentAllocation::Cascade)).unwrap();
    assert_eq!(order_ids(&out.result.snowball.payoff_order), vec!["A", "B"]);
    assert_eq!(order_ids(&out.result.avalanche.payoff_order), vec!["B", "A"]);
}

#[test]
fn test_extra_payment_saves_interest_and_time() {
    let input = ordering_input(ExtraPaymentAllocation::EvenSplit);
    let out = compare_payoff_strategies(&input).unwrap();
    let r = &out.result;
    for s in [&r.snowball, &r.avalanche] {
        assert!(s.interest_saved > Decimal::ZERO);
        assert!(s.months_saved > 0);
        assert_eq!(s.interest_saved, r.current.total_interest - s.total_interest);
        assert_eq!(s.months_saved, r.current.months_to_payoff - s.months_to_payoff);
    }
}

#[test]
fn test_recommendation_reasoning_names_first_loan() {
    let out = compare_payoff_strategies(&ordering_input(ExtraPaymentAllocation::Cascade)).unwrap();
    let rec = &out.result.recommendation;
    assert_eq!(rec.strategy, StrategyKind::Avalanche);
    assert!(rec.reasoning[0].contains("B loan"));
    assert!(rec.reasoning.iter().any(|r| r.contains("RM")));
}

#[test]
fn test_repeatable_with_fixed_clock() {
    let mut input = ordering_input(ExtraPaymentAllocation::Cascade);
    input.as_of_date = None;
    let clock = FixedClock(as_of());
    let a = compare_payoff_strategies_with_clock(&input, &clock).unwrap();
    let b = compare_payoff_strategies_with_clock(&input, &clock).unwrap();
    assert_eq!(a.result.avalanche.loans, b.result.avalanche.loans);
    assert_eq!(a.result.milestones, b.result.milestones);
}

#[test]
fn test_json_input_defaults() {
    let json = r#"{
        "loans": [{
            "id": "PL",
            "principal_original": "10000",
            "balance_current": "8000",
            "annual_rate_percent": "7.5",
            "term_months": 60,
            "monthly_payment": "200.38",
            "start_date": "2023-05-01"
        }],
        "as_of_date": "2025-01-01"
    }"#;
    let input: PayoffComparisonInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.extra_payment, Decimal::ZERO);
    assert_eq!(input.allocation, ExtraPaymentAllocation::EvenSplit);
    let out = compare_payoff_strategies(&input).unwrap();
    assert_eq!(out.result.snowball.total_interest, out.result.current.total_interest);
}
