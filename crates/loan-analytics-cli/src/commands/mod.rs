pub mod amortization;
pub mod credit_card;
pub mod payoff;
pub mod refinance;
