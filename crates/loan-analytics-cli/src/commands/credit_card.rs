use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_analytics_core::credit_card::{self, CreditCardInput};

use crate::input;

/// Arguments for a credit card repayment plan
#[derive(Args)]
pub struct CreditCardArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding card balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual interest rate in percent (typically 15–18)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Minimum payment as a percent of the statement balance
    #[arg(long, default_value = "5")]
    pub min_percent: Decimal,

    /// Minimum payment floor
    #[arg(long, default_value = "50")]
    pub min_floor: Decimal,

    /// Fixed monthly payment to compare against the minimum
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Months in which to clear the balance
    #[arg(long)]
    pub target_months: Option<u32>,

    /// Projection start (default: today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_credit_card(args: CreditCardArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let card_input: CreditCardInput = match input::read_request(args.input.as_deref())? {
        Some(req) => req,
        None => CreditCardInput {
            balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            minimum_payment_percent: args.min_percent,
            minimum_payment_floor: args.min_floor,
            fixed_payment: args.payment,
            target_months: args.target_months,
            as_of_date: args.as_of,
        },
    };

    let result = credit_card::plan_credit_card_repayment(&card_input)?;
    Ok(serde_json::to_value(result)?)
}
