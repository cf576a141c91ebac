use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use rust_decimal::Decimal;

use tradebot_market_data::{BreakerSnapshot, Cache, DataSourceOrchestrator, Series};

use super::market_data_constants::*;
use super::market_data_model::{MarketNews, MarketSnapshot, ScoredNews};
use super::market_data_traits::MarketDataServiceTrait;
use super::news_scoring::{score_market_news, score_news};
use super::ticker::validate_ticker;
use crate::errors::Result;
use crate::settings::CacheTtls;

/// Read-through cache in front of the data source orchestrator.
pub struct MarketDataService {
    orchestrator: Arc<DataSourceOrchestrator>,
    cache: Arc<Cache>,
    ttls: CacheTtls,
}

impl MarketDataService {
    pub fn new(orchestrator: Arc<DataSourceOrchestrator>, cache: Arc<Cache>, ttls: CacheTtls) -> Self {
        Self {
            orchestrator,
            cache,
            ttls,
        }
    }

    pub fn orchestrator(&self) -> &Arc<DataSourceOrchestrator> {
        &self.orchestrator
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_historical(&self, ticker: &str, use_cache: bool) -> Result<Series> {
        let ticker = validate_ticker(ticker)?;
        let key = format!("{}{}", MARKET_DATA_KEY_PREFIX, ticker);

        if use_cache {
            if let Some(series) = self.cache.get::<Series>(&key).await {
                debug!("Cache HIT: market data for {}", ticker);
                return Ok(series);
            }
        }
        debug!("Cache MISS: market data for {}", ticker);

        let series = self.orchestrator.get_historical(&ticker).await?;
        self.cache.set(&key, &series, self.ttls.market_data).await;
        Ok(series)
    }

    async fn get_quote(&self, ticker: &str, use_cache: bool) -> Result<Decimal> {
        let ticker = validate_ticker(ticker)?;
        let key = format!("{}{}", QUOTE_KEY_PREFIX, ticker);

        if use_cache {
            if let Some(price) = self.cache.get::<Decimal>(&key).await {
                debug!("Cache HIT: quote for {}", ticker);
                return Ok(price);
            }
        }
        debug!("Cache MISS: quote for {}", ticker);

        let price = self.orchestrator.get_quote(&ticker).await?;
        self.cache.set(&key, &price, self.ttls.quote).await;
        Ok(price)
    }

    async fn get_news(&self, ticker: &str, use_cache: bool) -> Result<Vec<ScoredNews>> {
        let ticker = validate_ticker(ticker)?;
        let key = format!("{}{}", NEWS_KEY_PREFIX, ticker);

        if use_cache {
            if let Some(news) = self.cache.get::<Vec<ScoredNews>>(&key).await {
                debug!("Cache HIT: news for {}", ticker);
                return Ok(news);
            }
        }
        debug!("Cache MISS: news for {}", ticker);

        let raw = self.orchestrator.get_news(&ticker).await?;
        let news = score_news(raw, Utc::now());
        self.cache.set(&key, &news, self.ttls.news).await;
        Ok(news)
    }

    async fn get_market_news(&self, use_cache: bool) -> Result<Vec<MarketNews>> {
        if use_cache {
            if let Some(news) = self.cache.get::<Vec<MarketNews>>(MARKET_NEWS_KEY).await {
                debug!("Cache HIT: market-wide news");
                return Ok(news);
            }
        }
        debug!("Cache MISS: market-wide news");

        let mut raw = Vec::new();
        let mut answered = false;
        let mut last_error = None;
        for symbol in MARKET_NEWS_INDICES {
            match self.orchestrator.get_news(symbol).await {
                Ok(items) => {
                    answered = true;
                    raw.extend(items.into_iter().take(MARKET_NEWS_PER_INDEX));
                }
                Err(e) => {
                    debug!("Market news unavailable for {}: {}", symbol, e);
                    last_error = Some(e);
                }
            }
        }
        if let Some(e) = last_error.filter(|_| !answered) {
            warn!("Market-wide news unavailable from every index");
            return Err(e.into());
        }

        let news = score_market_news(raw, Utc::now());
        if !news.is_empty() {
            self.cache.set(MARKET_NEWS_KEY, &news, self.ttls.market_news).await;
        }
        Ok(news)
    }

    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot> {
        let ticker = validate_ticker(ticker)?;

        let (price, series, news) = tokio::join!(
            self.get_quote(&ticker, true),
            self.get_historical(&ticker, true),
            self.get_news(&ticker, true),
        );
        let price = price?;

        let series = series
            .map_err(|e| warn!("Historical data unavailable for {}: {}", ticker, e))
            .ok();
        let (news, news_available) = match news {
            Ok(news) => (news, true),
            Err(e) => {
                warn!("News unavailable for {}: {}", ticker, e);
                (Vec::new(), false)
            }
        };

        Ok(MarketSnapshot {
            series_available: series.is_some(),
            ticker,
            price,
            series,
            news,
            news_available,
            as_of: Utc::now(),
        })
    }

    async fn invalidate(&self, ticker: &str) -> Result<()> {
        let ticker = validate_ticker(ticker)?;
        for prefix in [MARKET_DATA_KEY_PREFIX, QUOTE_KEY_PREFIX, NEWS_KEY_PREFIX] {
            self.cache.delete(&format!("{}{}", prefix, ticker)).await;
        }
        Ok(())
    }

    fn source_status(&self) -> BTreeMap<String, BreakerSnapshot> {
        self.orchestrator.status()
    }

    fn reset_source(&self, name: &str) -> bool {
        self.orchestrator.reset_source(name)
    }
}
