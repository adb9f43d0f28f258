use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use loan_analytics_core::calendar::{resolve_date, SystemClock};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Request shapes for the bare engine calls
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PaymentRequest {
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
}

#[derive(Deserialize)]
struct PayoffDateRequest {
    balance: Decimal,
    annual_rate_percent: Decimal,
    monthly_payment: Decimal,
    #[serde(default)]
    extra_payment: Decimal,
    start_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_monthly_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payment = loan_analytics_core::amortization::engine::calculate_monthly_payment(
        input.principal,
        input.annual_rate_percent,
        input.term_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "monthly_payment": payment }))
        .map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: loan_analytics_core::amortization::analysis::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_analytics_core::amortization::analysis::build_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payoff_date(input_json: String) -> NapiResult<String> {
    let input: PayoffDateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let projection = loan_analytics_core::amortization::engine::calculate_payoff_date(
        input.balance,
        input.annual_rate_percent,
        input.monthly_payment,
        input.extra_payment,
        resolve_date(input.start_date, &SystemClock),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&projection).map_err(to_napi_error)
}

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: loan_analytics_core::amortization::analysis::LoanAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_analytics_core::amortization::analysis::analyze_loan(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payoff strategies
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_payoff_strategies(input_json: String) -> NapiResult<String> {
    let input: loan_analytics_core::payoff::comparator::PayoffComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_analytics_core::payoff::comparator::compare_payoff_strategies(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Refinance
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_refinance(input_json: String) -> NapiResult<String> {
    let input: loan_analytics_core::refinance::RefinanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_analytics_core::refinance::analyze_refinance_opportunity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_refinance_offers(input_json: String) -> NapiResult<String> {
    let input: loan_analytics_core::refinance::RefinanceComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_analytics_core::refinance::compare_refinance_offers(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Credit card
// ---------------------------------------------------------------------------

#[napi]
pub fn plan_credit_card_repayment(input_json: String) -> NapiResult<String> {
    let input: loan_analytics_core::credit_card::CreditCardInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_analytics_core::credit_card::plan_credit_card_repayment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
