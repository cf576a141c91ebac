//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryPolicy`]: HTTP-level retry schedule applied below the circuit breaker

mod retry;

pub use retry::{RetryPolicy, RETRYABLE_STATUSES};

use thiserror::Error;

use crate::models::Capability;

/// Errors that can occur during market data operations.
///
/// Every variant produced by a provider call is classified by
/// [`is_breaker_failure`](Self::is_breaker_failure), which decides whether the
/// owning data source records a circuit breaker failure.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The upstream signaled throttling (HTTP 429 after retries, or a
    /// rate-limit phrase inside a success-status body).
    #[error("Rate limited: {source_name}")]
    RateLimited {
        /// The source that rate limited the request
        source_name: String,
    },

    /// Network failure, timeout, or a non-success HTTP status.
    #[error("Transport error: {source_name} - {message}")]
    Transport {
        /// The source that failed
        source_name: String,
        /// Description of the failure
        message: String,
    },

    /// The upstream answered but the payload could not be decoded.
    #[error("Parse error: {source_name} - {message}")]
    Parse {
        /// The source that returned the malformed payload
        source_name: String,
        /// Decoder message
        message: String,
    },

    /// The upstream answered with an empty series or no price.
    #[error("No data from {source_name} for {ticker}")]
    NoData {
        /// The source that returned nothing
        source_name: String,
        /// The requested ticker
        ticker: String,
    },

    /// An API-level error payload (bad key, unknown symbol, ...).
    #[error("Provider error: {source_name} - {message}")]
    ProviderError {
        /// The source that returned the error
        source_name: String,
        /// The error message from the source
        message: String,
    },

    /// The source does not implement this capability. Never a breaker event.
    #[error("{source_name} does not support {capability}")]
    Unsupported {
        /// The source asked for the capability
        source_name: String,
        /// The capability that was requested
        capability: Capability,
    },

    /// The source's circuit breaker refused the call.
    #[error("Circuit open: {source_name}")]
    CircuitOpen {
        /// The source with an open circuit
        source_name: String,
    },

    /// Every source in the priority list was skipped or failed.
    #[error("All sources failed for {capability} {ticker}{}", last_error_suffix(.last))]
    AllSourcesFailed {
        /// The capability that was requested
        capability: Capability,
        /// The requested ticker
        ticker: String,
        /// The last underlying error, if any source was actually attempted
        last: Option<Box<MarketDataError>>,
    },
}

fn last_error_suffix(last: &Option<Box<MarketDataError>>) -> String {
    match last {
        Some(e) => format!(" (last error: {})", e),
        None => String::new(),
    }
}

impl MarketDataError {
    /// Returns true when this error should count as one circuit breaker failure.
    ///
    /// | Variant | Breaker failure? |
    /// |---------|------------------|
    /// | `RateLimited`, `Transport`, `Parse`, `NoData`, `ProviderError` | Yes |
    /// | `Unsupported` | No (never attempted) |
    /// | `CircuitOpen` | No (already recorded) |
    /// | `AllSourcesFailed` | No (aggregate) |
    pub fn is_breaker_failure(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Transport { .. }
            | Self::Parse { .. }
            | Self::NoData { .. }
            | Self::ProviderError { .. } => true,

            Self::Unsupported { .. } | Self::CircuitOpen { .. } | Self::AllSourcesFailed { .. } => {
                false
            }
        }
    }

    /// Returns true if the upstream signaled throttling.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The underlying error wrapped by `AllSourcesFailed`, if any.
    pub fn last_error(&self) -> Option<&MarketDataError> {
        match self {
            Self::AllSourcesFailed { last, .. } => last.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn transport(source_name: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(source_name: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn no_data(source_name: &str, ticker: &str) -> Self {
        Self::NoData {
            source_name: source_name.to_string(),
            ticker: ticker.to_string(),
        }
    }

    pub(crate) fn rate_limited(source_name: &str) -> Self {
        Self::RateLimited {
            source_name: source_name.to_string(),
        }
    }

    pub(crate) fn unsupported(source_name: &str, capability: Capability) -> Self {
        Self::Unsupported {
            source_name: source_name.to_string(),
            capability,
        }
    }
}
