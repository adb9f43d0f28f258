//! Loan analytics for personal-finance clients: amortisation schedules,
//! debt payoff strategies (snowball / avalanche), refinance break-even and
//! credit-card repayment plans. All money is `rust_decimal::Decimal`.
//!
//! Every calculation is pure: inputs in, values out, no I/O. Operations that
//! default to "today" take an explicit date or a [`calendar::Clock`].

pub mod amortization;
pub mod calendar;
pub mod error;
pub mod loan;
pub mod time_value;
pub mod types;

#[cfg(feature = "payoff")]
pub mod payoff;

#[cfg(feature = "refinance")]
pub mod refinance;

#[cfg(feature = "credit_card")]
pub mod credit_card;

pub use error::LoanAnalyticsError;
pub use loan::LoanRecord;
pub use types::*;

/// Standard result type for all loan-analytics operations
pub type LoanAnalyticsResult<T> = Result<T, LoanAnalyticsError>;
