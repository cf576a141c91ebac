//! Core error types for the trading bot.
//!
//! Market data failures are wrapped from the market-data crate; broker
//! failures from the broker seam. Storage is database-agnostic: store
//! implementations convert their own errors into [`Error::Repository`] or
//! [`Error::NotFound`].

use thiserror::Error;

use crate::broker::BrokerError;
use tradebot_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Broker operation failed: {0}")]
    Broker(#[from] BrokerError),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Position {0} is already closed")]
    PositionClosed(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// True when every prioritized market data source was exhausted.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            Error::MarketData(MarketDataError::AllSourcesFailed { .. })
        )
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradebot_market_data::Capability;

    #[test]
    fn test_all_sources_failed_is_data_unavailable() {
        let err: Error = MarketDataError::AllSourcesFailed {
            capability: Capability::Quote,
            ticker: "AAPL".to_string(),
            last: None,
        }
        .into();
        assert!(err.is_data_unavailable());
        assert!(!Error::InvalidTicker("^^".to_string()).is_data_unavailable());
    }

    #[test]
    fn test_broker_error_wraps() {
        let err: Error = BrokerError::NotAuthenticated.into();
        assert_eq!(err.to_string(), "Broker operation failed: Broker session is not authenticated");
    }
}
