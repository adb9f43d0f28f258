use chrono::NaiveDate;
use loan_analytics_core::amortization::analysis::{build_schedule, ScheduleInput};
use loan_analytics_core::amortization::engine::{
    calculate_monthly_payment, calculate_payoff_date, generate_amortization_schedule,
    MAX_PAYOFF_MONTHS,
};
use loan_analytics_core::LoanAnalyticsError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

// ===========================================================================
// Worked example: RM12,000 at 6% over 12 months
// ===========================================================================

#[test]
fn test_twelve_month_scenario() {
    let payment = calculate_monthly_payment(dec!(12_000), dec!(6), 12).unwrap();
    assert!((payment - dec!(1032.80)).abs() < dec!(0.01));

    let schedule =
        generate_amortization_schedule(dec!(12_000), dec!(6), 12, start(), None).unwrap();
    let first = &schedule[0];
    assert_eq!(first.interest_portion, dec!(60.00));
    assert_eq!(first.principal_portion, payment - dec!(60.00));
    assert_eq!(first.remaining_balance, dec!(12_000) - first.principal_portion);
}

// ===========================================================================
// Schedule properties
// ===========================================================================

const CASES: &[(Decimal, Decimal, u32)] = &[
    (dec!(12_000), dec!(6), 12),
    (dec!(35_000), dec!(3.2), 60),
    (dec!(8_500), dec!(18), 36),
    (dec!(150_000), dec!(4.35), 120),
    (dec!(999.99), dec!(9.9), 7),
];

#[test]
fn test_balances_non_increasing_and_end_at_zero() {
    for &(principal, rate, term) in CASES {
        let schedule =
            generate_amortization_schedule(principal, rate, term, start(), None).unwrap();
        assert_eq!(schedule.len() as u32, term);
        assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);
        let mut previous = principal;
        for entry in &schedule {
            assert!(
                entry.remaining_balance <= previous,
                "balance rose at payment {} for {principal} @ {rate}%",
                entry.payment_number
            );
            previous = entry.remaining_balance;
        }
    }
}

#[test]
fn test_principal_conserved_within_rounding() {
    for &(principal, rate, term) in CASES {
        let schedule =
            generate_amortization_schedule(principal, rate, term, start(), None).unwrap();
        let principal_sum: Decimal = schedule.iter().map(|e| e.principal_portion).sum();
        let interest_sum: Decimal = schedule.iter().map(|e| e.interest_portion).sum();
        let paid_sum: Decimal = schedule.iter().map(|e| e.payment_amount).sum();

        let tolerance = Decimal::from(term) * dec!(0.01);
        assert!(
            (principal_sum - principal).abs() <= tolerance,
            "principal drift {} exceeds {tolerance}",
            principal_sum - principal
        );
        assert_eq!(paid_sum, principal_sum + interest_sum);
    }
}

#[test]
fn test_zero_rate_is_flat() {
    let schedule =
        generate_amortization_schedule(dec!(6_000), Decimal::ZERO, 12, start(), None).unwrap();
    for entry in &schedule {
        assert_eq!(entry.interest_portion, Decimal::ZERO);
        assert_eq!(entry.payment_amount, dec!(500));
        assert_eq!(entry.principal_portion, dec!(500));
    }
}

#[test]
fn test_schedule_idempotent() {
    let a = generate_amortization_schedule(dec!(42_000), dec!(5.5), 84, start(), None).unwrap();
    let b = generate_amortization_schedule(dec!(42_000), dec!(5.5), 84, start(), None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_build_schedule_envelope() {
    let out = build_schedule(&ScheduleInput {
        principal: dec!(35_000),
        annual_rate_percent: dec!(3.2),
        term_months: 60,
        start_date: start(),
        monthly_payment_override: None,
    })
    .unwrap();
    assert_eq!(out.result.entries.len(), 60);
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(!out.methodology.is_empty());
}

// ===========================================================================
// Payoff simulation
// ===========================================================================

#[test]
fn test_payoff_non_convergence_terminates_at_cap() {
    // Interest in month one is 1,500; a 1,000 payment never catches up.
    let projection =
        calculate_payoff_date(dec!(150_000), dec!(12), dec!(1_000), Decimal::ZERO, start())
            .unwrap();
    assert_eq!(projection.months, MAX_PAYOFF_MONTHS);
    assert!(!projection.converged);
    assert_eq!(
        projection.payoff_date,
        NaiveDate::from_ymd_opt(2074, 6, 1).unwrap()
    );
}

#[test]
fn test_invalid_inputs_fail_fast() {
    match calculate_monthly_payment(dec!(10_000), dec!(5), 0).unwrap_err() {
        LoanAnalyticsError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
    assert!(generate_amortization_schedule(dec!(-5), dec!(5), 12, start(), None).is_err());
    let negative_rate =
        calculate_payoff_date(dec!(1_000), dec!(-1), dec!(100), Decimal::ZERO, start());
    assert!(negative_rate.is_err());
}
