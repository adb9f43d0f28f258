use chrono::NaiveDate;
use loan_analytics_core::amortization::engine::calculate_monthly_payment;
use loan_analytics_core::refinance::{
    analyze_refinance_opportunity, compare_refinance_offers, RefinanceComparisonInput,
    RefinanceInput, RefinanceOffer, RefinancePolicy, BREAK_EVEN_NEVER,
};
use loan_analytics_core::LoanRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(balance: Decimal, rate: Decimal, months: u32) -> LoanRecord {
    LoanRecord {
        id: "HL-1".into(),
        name: "Home loan".into(),
        principal_original: balance,
        balance_current: balance,
        annual_rate_percent: rate,
        term_months: months,
        remaining_months: Some(months),
        monthly_payment: calculate_monthly_payment(balance, rate, months).unwrap(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    }
}

#[test]
fn test_break_even_scenario() {
    let input = RefinanceInput {
        loan: loan(dec!(50_000), dec!(5), 120),
        new_rate: dec!(3),
        closing_costs: dec!(2000),
        policy: RefinancePolicy::default(),
    };
    let out = analyze_refinance_opportunity(&input).unwrap();
    let a = &out.result;
    assert!(a.monthly_savings > Decimal::ZERO);
    assert_ne!(a.break_even_months, BREAK_EVEN_NEVER);
    assert!(a.break_even_months < 120);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_no_savings_uses_sentinel_and_warns() {
    let input = RefinanceInput {
        loan: loan(dec!(50_000), dec!(3), 120),
        new_rate: dec!(3.5),
        closing_costs: dec!(1000),
        policy: RefinancePolicy::default(),
    };
    let out = analyze_refinance_opportunity(&input).unwrap();
    assert_eq!(out.result.break_even_months, BREAK_EVEN_NEVER);
    assert!(!out.result.is_recommended);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_policy_defaults_from_json() {
    let json = r#"{
        "loan": {
            "id": "HL-2",
            "principal_original": "300000",
            "balance_current": "280000",
            "annual_rate_percent": "4.5",
            "term_months": 360,
            "remaining_months": 300,
            "monthly_payment": "1556.32",
            "start_date": "2020-03-01"
        },
        "new_rate": "3.85",
        "closing_costs": "4500"
    }"#;
    let input: RefinanceInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.policy, RefinancePolicy::default());
    let out = analyze_refinance_opportunity(&input).unwrap();
    assert!(out.result.monthly_savings > Decimal::ZERO);
}

#[test]
fn test_payment_below_interest_is_analysed_not_rejected() {
    // 1% a month on 100 000 is 1 000; a 900 payment lets the balance grow.
    for payment in [dec!(900), Decimal::ZERO] {
        let mut underwater = loan(dec!(100_000), dec!(12), 120);
        underwater.monthly_payment = payment;
        assert!(underwater.validate().unwrap().is_empty());

        let input = RefinanceInput {
            loan: underwater,
            new_rate: dec!(4),
            closing_costs: dec!(2000),
            policy: RefinancePolicy::default(),
        };
        let out = analyze_refinance_opportunity(&input).unwrap();
        let a = &out.result;
        assert!(a.current_residual_balance > dec!(100_000));
        assert!(a.current_remaining_interest > dec!(100_000));
        assert_eq!(a.break_even_months, BREAK_EVEN_NEVER);
        assert!(out.warnings.iter().any(|w| w.contains("still owed")));
    }
}

#[test]
fn test_level_payment_leaves_no_residual_warning() {
    let input = RefinanceInput {
        loan: loan(dec!(50_000), dec!(3), 120),
        new_rate: dec!(2.5),
        closing_costs: dec!(500),
        policy: RefinancePolicy::default(),
    };
    let out = analyze_refinance_opportunity(&input).unwrap();
    // Rounding can leave a few sen, never a shortfall worth reporting.
    assert!(out.result.current_residual_balance < dec!(1));
    assert!(!out.warnings.iter().any(|w| w.contains("still owed")));
}

#[test]
fn test_offer_comparison_accepts_underwater_loan() {
    let mut underwater = loan(dec!(100_000), dec!(12), 120);
    underwater.monthly_payment = dec!(900);
    let input = RefinanceComparisonInput {
        loan: underwater,
        offers: vec![
            RefinanceOffer {
                lender: "Bank A".into(),
                new_rate: dec!(4),
                closing_costs: dec!(2000),
            },
            RefinanceOffer {
                lender: "Bank B".into(),
                new_rate: dec!(5),
                closing_costs: dec!(1000),
            },
        ],
        policy: RefinancePolicy::default(),
    };
    let out = compare_refinance_offers(&input).unwrap();
    assert_eq!(out.result.offers.len(), 2);
    assert!(out.warnings.iter().any(|w| w.contains("still owed")));
}
