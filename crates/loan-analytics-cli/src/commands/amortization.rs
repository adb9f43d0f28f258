use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_analytics_core::amortization::analysis::{self, LoanAnalysisInput, ScheduleInput};
use loan_analytics_core::amortization::engine;
use loan_analytics_core::calendar::{resolve_date, SystemClock};

use crate::input;

/// Arguments for the level monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (4.5 = 4.5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Term in months
    #[arg(long)]
    pub term: u32,
}

/// Arguments for a full amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// First payment falls one month after this date (default: today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Pay this amount instead of the level payment
    #[arg(long)]
    pub payment: Option<Decimal>,
}

/// Arguments for a payoff-date projection
#[derive(Args)]
pub struct PayoffDateArgs {
    /// Outstanding balance
    #[arg(long)]
    pub balance: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Scheduled monthly payment
    #[arg(long)]
    pub payment: Decimal,

    /// Extra amount paid every month
    #[arg(long, default_value = "0")]
    pub extra: Decimal,

    /// Projection start (default: today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for a single-loan summary
#[derive(Args)]
pub struct LoanSummaryArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = engine::calculate_monthly_payment(args.principal, args.rate, args.term)?;
    Ok(json!({ "monthly_payment": payment }))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::read_request(args.input.as_deref())? {
        Some(req) => req,
        None => ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.term.ok_or("--term is required (or provide --input)")?,
            start_date: resolve_date(args.start_date, &SystemClock),
            monthly_payment_override: args.payment,
        },
    };

    let result = analysis::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payoff_date(args: PayoffDateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = resolve_date(args.start_date, &SystemClock);
    let projection =
        engine::calculate_payoff_date(args.balance, args.rate, args.payment, args.extra, start)?;
    if !projection.converged {
        log::warn!("payment does not retire the balance; payoff date is the simulation cap");
    }
    Ok(serde_json::to_value(projection)?)
}

pub fn run_loan_summary(args: LoanSummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let summary_input: LoanAnalysisInput = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for loan summary")?;
    let result = analysis::analyze_loan(&summary_input)?;
    Ok(serde_json::to_value(result)?)
}
