mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{LoanSummaryArgs, PayoffDateArgs, PaymentArgs, ScheduleArgs};
use commands::credit_card::CreditCardArgs;
use commands::payoff::CompareStrategiesArgs;
use commands::refinance::{RefinanceArgs, RefinanceOffersArgs};

/// Loan amortisation, debt payoff and refinance calculations
#[derive(Parser)]
#[command(
    name = "loanx",
    version,
    about = "Loan amortisation, debt payoff and refinance calculations",
    long_about = "A CLI for personal loan analytics with decimal precision. Builds \
                  amortisation schedules, projects payoff dates, compares snowball and \
                  avalanche payoff strategies, evaluates refinance offers and plans \
                  credit card repayments. Set RUST_LOG=debug for diagnostics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Level monthly payment for a fixed-rate loan
    Payment(PaymentArgs),
    /// Full amortisation schedule
    Schedule(ScheduleArgs),
    /// Project when a balance is paid off, with optional extra payments
    PayoffDate(PayoffDateArgs),
    /// Progress and extra-payment impact for one loan
    LoanSummary(LoanSummaryArgs),
    /// Compare current, snowball and avalanche payoff strategies
    CompareStrategies(CompareStrategiesArgs),
    /// Refinance break-even and lifetime savings
    Refinance(RefinanceArgs),
    /// Rank several refinance offers for one loan
    RefinanceOffers(RefinanceOffersArgs),
    /// Credit card repayment plan (minimum vs fixed vs target)
    CreditCard(CreditCardArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::amortization::run_payment(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::PayoffDate(args) => commands::amortization::run_payoff_date(args),
        Commands::LoanSummary(args) => commands::amortization::run_loan_summary(args),
        Commands::CompareStrategies(args) => commands::payoff::run_compare_strategies(args),
        Commands::Refinance(args) => commands::refinance::run_refinance(args),
        Commands::RefinanceOffers(args) => commands::refinance::run_refinance_offers(args),
        Commands::CreditCard(args) => commands::credit_card::run_credit_card(args),
        Commands::Version => {
            println!("loanx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
