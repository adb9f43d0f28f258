use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_analytics_core::payoff::comparator::{self, PayoffComparisonInput};
use loan_analytics_core::payoff::strategy::ExtraPaymentAllocation;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AllocationArg {
    /// Extra payment split evenly across all loans
    EvenSplit,
    /// Extra payment (and freed payments) go to one loan at a time
    Cascade,
}

impl From<AllocationArg> for ExtraPaymentAllocation {
    fn from(arg: AllocationArg) -> Self {
        match arg {
            AllocationArg::EvenSplit => ExtraPaymentAllocation::EvenSplit,
            AllocationArg::Cascade => ExtraPaymentAllocation::Cascade,
        }
    }
}

/// Arguments for the payoff strategy comparison
#[derive(Args)]
pub struct CompareStrategiesArgs {
    /// Path to JSON input file with `loans`
    #[arg(long)]
    pub input: Option<String>,

    /// Override the extra monthly payment from the input
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Override how the extra payment is allocated
    #[arg(long, value_enum)]
    pub allocation: Option<AllocationArg>,
}

pub fn run_compare_strategies(
    args: CompareStrategiesArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut comparison_input: PayoffComparisonInput = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for strategy comparison")?;

    if let Some(extra) = args.extra {
        comparison_input.extra_payment = extra;
    }
    if let Some(allocation) = args.allocation {
        comparison_input.allocation = allocation.into();
    }

    let result = comparator::compare_payoff_strategies(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}
