use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use tradebot_market_data::{BreakerSnapshot, Series};

use super::market_data_model::{MarketNews, MarketSnapshot, ScoredNews};
use crate::errors::Result;

/// Cached market data access used by the API and the trading flow.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Daily history for the last year. `use_cache = false` skips the cache
    /// read but still refreshes the cached value.
    async fn get_historical(&self, ticker: &str, use_cache: bool) -> Result<Series>;

    async fn get_quote(&self, ticker: &str, use_cache: bool) -> Result<Decimal>;

    /// Scored news, most relevant first.
    async fn get_news(&self, ticker: &str, use_cache: bool) -> Result<Vec<ScoredNews>>;

    /// Categorized headlines from the major indices, most relevant first.
    /// Fails only when no index returned news.
    async fn get_market_news(&self, use_cache: bool) -> Result<Vec<MarketNews>>;

    /// Quote, history and news in one call. Fails only when no quote source
    /// answered.
    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot>;

    /// Drop every cached value for a ticker.
    async fn invalidate(&self, ticker: &str) -> Result<()>;

    fn source_status(&self) -> BTreeMap<String, BreakerSnapshot>;

    fn reset_source(&self, name: &str) -> bool;
}
