use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::engine::MAX_TERM_MONTHS;
use crate::error::LoanAnalyticsError;
use crate::types::{Money, Percent};
use crate::LoanAnalyticsResult;

/// A loan as held by the storage layer. The core trusts `balance_current`
/// as today's balance and never reconciles it against a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: String,
    /// Display label only.
    #[serde(default)]
    pub name: String,
    /// Amount originally borrowed.
    pub principal_original: Money,
    /// Outstanding balance today.
    pub balance_current: Money,
    /// Nominal annual rate, e.g. 4.5 = 4.5%.
    pub annual_rate_percent: Percent,
    /// Scheduled payments at origination.
    pub term_months: u32,
    /// Defaults to `term_months` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_months: Option<u32>,
    /// Currently scheduled fixed payment.
    pub monthly_payment: Money,
    pub start_date: NaiveDate,
}

impl LoanRecord {
    pub fn remaining_months(&self) -> u32 {
        self.remaining_months.unwrap_or(self.term_months)
    }

    /// Name for messages, falling back to the id when no label was stored.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Reject records that would make the calculators meaningless.
    ///
    /// Returns non-fatal observations (e.g. a balance above the original
    /// principal, which capitalised arrears can legitimately produce).
    pub fn validate(&self) -> LoanAnalyticsResult<Vec<String>> {
        let mut warnings = Vec::new();

        if self.id.trim().is_empty() {
            return Err(LoanAnalyticsError::invalid("id", "Loan id must not be empty."));
        }
        if self.principal_original <= Decimal::ZERO {
            return Err(LoanAnalyticsError::invalid(
                "principal_original",
                format!("Loan '{}': original principal must be positive.", self.id),
            ));
        }
        if self.balance_current < Decimal::ZERO {
            return Err(LoanAnalyticsError::invalid(
                "balance_current",
                format!("Loan '{}': current balance cannot be negative.", self.id),
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanAnalyticsError::invalid(
                "annual_rate_percent",
                format!("Loan '{}': interest rate cannot be negative.", self.id),
            ));
        }
        if self.term_months == 0 {
            return Err(LoanAnalyticsError::invalid(
                "term_months",
                format!("Loan '{}': term must be at least one month.", self.id),
            ));
        }
        if self.term_months > MAX_TERM_MONTHS || self.remaining_months() > MAX_TERM_MONTHS {
            return Err(LoanAnalyticsError::invalid(
                "term_months",
                format!(
                    "Loan '{}': terms longer than {MAX_TERM_MONTHS} months are not supported.",
                    self.id
                ),
            ));
        }
        if self.remaining_months == Some(0) && !self.balance_current.is_zero() {
            return Err(LoanAnalyticsError::invalid(
                "remaining_months",
                format!(
                    "Loan '{}': remaining months is zero but a balance is outstanding.",
                    self.id
                ),
            ));
        }
        if self.monthly_payment < Decimal::ZERO {
            return Err(LoanAnalyticsError::invalid(
                "monthly_payment",
                format!("Loan '{}': monthly payment cannot be negative.", self.id),
            ));
        }

        if self.balance_current > self.principal_original {
            warnings.push(format!(
                "Loan '{}': current balance exceeds the original principal; \
                 figures assume the stored balance is correct.",
                self.id
            ));
        }
        if self.remaining_months() > self.term_months {
            warnings.push(format!(
                "Loan '{}': remaining months ({}) exceed the original term ({}).",
                self.id,
                self.remaining_months(),
                self.term_months
            ));
        }

        Ok(warnings)
    }
}
