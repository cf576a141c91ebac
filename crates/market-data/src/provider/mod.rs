//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider capability flags
//! - A shared HTTP fetcher that applies the retry policy
//! - Concrete provider implementations (Yahoo, Alpha Vantage, Finnhub)
//!
//! # Architecture
//!
//! Providers only talk to their upstream and classify failures. Circuit
//! breaking lives one layer up in [`DataSource`](crate::registry::DataSource),
//! so a provider never sees breaker state.

mod capabilities;
mod http;
mod traits;

pub mod alpha_vantage;
pub mod finnhub;
pub mod yahoo;

// Re-exports
pub use capabilities::ProviderCapabilities;
pub use http::HttpFetcher;
pub use traits::MarketDataProvider;

use rust_decimal::Decimal;

/// Phrases that identify throttling inside an otherwise successful response.
const RATE_LIMIT_PHRASES: [&str; 7] = [
    "rate limit",
    "too many requests",
    "call frequency",
    "quota",
    "throttle",
    "temporarily unavailable",
    "premium",
];

/// Returns true if free-form upstream text signals rate limiting.
pub(crate) fn mentions_rate_limit(text: &str) -> bool {
    let lower = text.to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Convert an upstream float to a Decimal, dropping non-finite values.
pub(crate) fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64_retain(value).map(|d| d.round_dp(6).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mentions_rate_limit() {
        assert!(mentions_rate_limit(
            "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"
        ));
        assert!(mentions_rate_limit("Too Many Requests"));
        assert!(!mentions_rate_limit("Invalid API call"));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(189.5), Some(dec!(189.5)));
        assert_eq!(to_decimal(f64::NAN), None);
        assert_eq!(to_decimal(f64::INFINITY), None);
    }
}
