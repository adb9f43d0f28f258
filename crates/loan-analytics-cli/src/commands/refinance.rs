use clap::Args;
use serde_json::Value;

use loan_analytics_core::refinance::{self, RefinanceComparisonInput, RefinanceInput};

use crate::input;

/// Arguments for a single refinance analysis
#[derive(Args)]
pub struct RefinanceArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for ranking several refinance offers
#[derive(Args)]
pub struct RefinanceOffersArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let refi_input: RefinanceInput = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for refinance analysis")?;
    let result = refinance::analyze_refinance_opportunity(&refi_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_refinance_offers(
    args: RefinanceOffersArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let offers_input: RefinanceComparisonInput = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for offer comparison")?;
    let result = refinance::compare_refinance_offers(&offers_input)?;
    Ok(serde_json::to_value(result)?)
}
