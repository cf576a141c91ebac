//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! upstream market data providers must implement.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{Capability, NewsItem, Series};

use super::capabilities::ProviderCapabilities;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new upstream. Each fetch method
/// defaults to [`MarketDataError::Unsupported`], so a news-only provider only
/// overrides `get_news`.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tradebot_market_data::provider::{MarketDataProvider, ProviderCapabilities};
///
/// struct MyNewsProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyNewsProvider {
///     fn id(&self) -> &'static str {
///         "MY_NEWS"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             supports_news: true,
///             ..Default::default()
///         }
///     }
///
///     async fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "ALPHA_VANTAGE", etc.
    /// Used for logging, priority lists and breaker status.
    fn id(&self) -> &'static str;

    /// Describes which capabilities this provider implements.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch roughly one year of daily bars for a ticker.
    ///
    /// An empty series must be reported as [`MarketDataError::NoData`].
    async fn get_historical(&self, ticker: &str) -> Result<Series, MarketDataError> {
        let _ = ticker;
        Err(MarketDataError::unsupported(
            self.id(),
            Capability::HistoricalSeries,
        ))
    }

    /// Fetch the latest price for a ticker.
    async fn get_quote(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        let _ = ticker;
        Err(MarketDataError::unsupported(self.id(), Capability::Quote))
    }

    /// Fetch recent news for a ticker. An empty list is a valid answer.
    async fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, MarketDataError> {
        let _ = ticker;
        Err(MarketDataError::unsupported(self.id(), Capability::News))
    }
}
