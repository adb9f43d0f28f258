use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values (ringgit). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual interest rates as quoted to borrowers: 4.5 = 4.5% p.a.
pub type Percent = Decimal;

/// Periodic rates expressed as decimals (0.005 = 0.5% per month).
pub type Rate = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Format an amount the way it is shown to Malaysian borrowers, e.g. `RM 1,032.80`.
pub fn format_ringgit(amount: Money) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-RM {grouped}.{frac}")
    } else {
        format!("RM {grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_ringgit_groups_thousands() {
        assert_eq!(format_ringgit(dec!(1032.8)), "RM 1,032.80");
        assert_eq!(format_ringgit(dec!(1234567.891)), "RM 1,234,567.89");
        assert_eq!(format_ringgit(dec!(999)), "RM 999.00");
        assert_eq!(format_ringgit(Decimal::ZERO), "RM 0.00");
    }

    #[test]
    fn test_format_ringgit_negative() {
        assert_eq!(format_ringgit(dec!(-2500.5)), "-RM 2,500.50");
    }
}
