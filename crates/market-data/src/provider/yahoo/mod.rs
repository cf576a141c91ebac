//! Yahoo Finance market data provider.
//!
//! Primary source for all three capabilities:
//! - Daily history and latest price via the v8 chart endpoint
//! - News via the v1 search endpoint
//!
//! Index tickers are mapped to Yahoo's caret symbols (SPX -> ^SPX).

mod models;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::errors::{MarketDataError, RetryPolicy};
use crate::models::{Bar, NewsItem, Series};
use crate::provider::{
    mentions_rate_limit, to_decimal, HttpFetcher, MarketDataProvider, ProviderCapabilities,
};

use models::{YahooChartResponse, YahooChartResult, YahooSearchResponse};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const PROVIDER_ID: &str = "YAHOO";

/// Maximum number of news articles requested per ticker.
const NEWS_COUNT: usize = 15;

/// Days of history kept from the one-year range.
const HISTORY_DAYS: i64 = 365;

/// Index tickers and their Yahoo symbols.
const INDEX_MAPPINGS: [(&str, &str); 5] = [
    ("SPX", "^SPX"),
    ("NDX", "^NDX"),
    ("RUT", "^RUT"),
    ("VIX", "^VIX"),
    ("DJI", "^DJI"),
];

/// Map a user ticker to the symbol Yahoo expects.
pub fn yahoo_symbol(ticker: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    INDEX_MAPPINGS
        .iter()
        .find(|(plain, _)| *plain == upper)
        .map(|(_, mapped)| mapped.to_string())
        .unwrap_or(upper)
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    http: HttpFetcher,
    base_url: String,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with the default retry policy.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL, RetryPolicy::default())
    }

    /// Create a provider pointed at another host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http: HttpFetcher::new(PROVIDER_ID, retry),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chart(&self, symbol: &str) -> Result<YahooChartResult, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!("Yahoo chart request for {}", symbol);

        let body = self
            .http
            .get_text(|client| {
                client
                    .get(&url)
                    .query(&[("range", "1y"), ("interval", "1d")])
            })
            .await?;

        let parsed: YahooChartResponse = serde_json::from_str(&body).map_err(|e| {
            if mentions_rate_limit(&body) {
                MarketDataError::rate_limited(PROVIDER_ID)
            } else {
                MarketDataError::parse(PROVIDER_ID, e.to_string())
            }
        })?;

        if let Some(error) = parsed.chart.error {
            let description = error.description.unwrap_or_default();
            if mentions_rate_limit(&description) {
                return Err(MarketDataError::rate_limited(PROVIDER_ID));
            }
            let code = error.code.unwrap_or_else(|| "error".to_string());
            if code.eq_ignore_ascii_case("Not Found") {
                return Err(MarketDataError::no_data(PROVIDER_ID, symbol));
            }
            return Err(MarketDataError::ProviderError {
                source_name: PROVIDER_ID.to_string(),
                message: format!("{}: {}", code, description),
            });
        }

        parsed
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| MarketDataError::no_data(PROVIDER_ID, symbol))
    }

    /// Zip the parallel indicator arrays into bars, skipping null sessions.
    fn chart_to_bars(result: &YahooChartResult) -> Vec<Bar> {
        let Some(quote) = result.indicators.quote.first() else {
            return Vec::new();
        };

        result
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                let value = |series: &Vec<Option<f64>>| {
                    series.get(i).copied().flatten().and_then(to_decimal)
                };
                let close = value(&quote.close)?;
                let timestamp = Utc.timestamp_opt(*ts, 0).single()?;
                Some(Bar::ohlcv(
                    timestamp,
                    value(&quote.open).unwrap_or(close),
                    value(&quote.high).unwrap_or(close),
                    value(&quote.low).unwrap_or(close),
                    close,
                    value(&quote.volume),
                ))
            })
            .collect()
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MarketDataProvider trait implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_historical: true,
            supports_quote: true,
            supports_news: true,
        }
    }

    async fn get_historical(&self, ticker: &str) -> Result<Series, MarketDataError> {
        let symbol = yahoo_symbol(ticker);
        let result = self.fetch_chart(&symbol).await?;
        let bars = Self::chart_to_bars(&result);

        if bars.is_empty() {
            warn!("Yahoo returned no bars for {}", symbol);
            return Err(MarketDataError::no_data(PROVIDER_ID, &symbol));
        }

        Ok(Series::new(ticker.to_uppercase(), PROVIDER_ID, bars).trim_to_days(Utc::now(), HISTORY_DAYS))
    }

    async fn get_quote(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        let symbol = yahoo_symbol(ticker);
        let result = self.fetch_chart(&symbol).await?;

        result
            .meta
            .regular_market_price
            .and_then(to_decimal)
            .filter(|p| *p > Decimal::ZERO)
            .or_else(|| Self::chart_to_bars(&result).last().map(|b| b.close))
            .ok_or_else(|| MarketDataError::no_data(PROVIDER_ID, &symbol))
    }

    async fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, MarketDataError> {
        let symbol = yahoo_symbol(ticker);
        let url = format!("{}/v1/finance/search", self.base_url);
        let count = NEWS_COUNT.to_string();

        let body = self
            .http
            .get_text(|client| {
                client.get(&url).query(&[
                    ("q", symbol.as_str()),
                    ("newsCount", count.as_str()),
                    ("quotesCount", "0"),
                ])
            })
            .await?;

        let parsed: YahooSearchResponse = serde_json::from_str(&body).map_err(|e| {
            if mentions_rate_limit(&body) {
                MarketDataError::rate_limited(PROVIDER_ID)
            } else {
                MarketDataError::parse(PROVIDER_ID, e.to_string())
            }
        })?;

        let news = parsed
            .news
            .into_iter()
            .take(NEWS_COUNT)
            .map(|article| NewsItem {
                title: article.title.unwrap_or_default(),
                publisher: article.publisher.unwrap_or_else(|| "Unknown".to_string()),
                link: article.link.unwrap_or_default(),
                published: article
                    .provider_publish_time
                    .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
                summary: String::new(),
            })
            .collect::<Vec<_>>();

        debug!("Yahoo: fetched {} articles for {}", news.len(), symbol);
        Ok(news)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chart_body(now: i64) -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "regularMarketPrice": 189.5 },
                    "timestamp": [now - 86_400, now],
                    "indicators": { "quote": [{
                        "open": [180.0, 185.0],
                        "high": [186.0, 190.0],
                        "low": [179.0, 184.0],
                        "close": [185.0, null],
                        "volume": [1000, 2000]
                    }]}
                }],
                "error": null
            }
        })
    }

    #[test]
    fn test_yahoo_symbol_maps_indices() {
        assert_eq!(yahoo_symbol("spx"), "^SPX");
        assert_eq!(yahoo_symbol("VIX"), "^VIX");
        assert_eq!(yahoo_symbol("aapl"), "AAPL");
    }

    #[test]
    fn test_provider_capabilities() {
        let provider = YahooProvider::new();
        assert_eq!(provider.id(), "YAHOO");
        let caps = provider.capabilities();
        assert!(caps.supports_historical && caps.supports_quote && caps.supports_news);
    }

    #[tokio::test]
    async fn test_historical_skips_null_sessions() {
        let server = MockServer::start().await;
        let now = Utc::now().timestamp();
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(now)))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        let series = provider.get_historical("aapl").await.unwrap();

        assert_eq!(series.ticker, "AAPL");
        assert_eq!(series.source, "YAHOO");
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars[0].close, dec!(185));
    }

    #[tokio::test]
    async fn test_quote_uses_regular_market_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chart_body(Utc::now().timestamp())),
            )
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        assert_eq!(provider.get_quote("AAPL").await.unwrap(), dec!(189.5));
    }

    #[tokio::test]
    async fn test_index_ticker_requests_caret_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"/chart/(\^|%5E)SPX$"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chart_body(Utc::now().timestamp())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        assert!(provider.get_quote("SPX").await.is_ok());
    }

    #[tokio::test]
    async fn test_retries_429_then_reports_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .expect(4)
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::immediate(3));
        let err = provider.get_quote("AAPL").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_recovers_after_transient_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chart_body(Utc::now().timestamp())),
            )
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::immediate(3));
        assert_eq!(provider.get_quote("AAPL").await.unwrap(), dec!(189.5));
    }

    #[tokio::test]
    async fn test_rate_limit_phrase_in_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        let err = provider.get_historical("AAPL").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_not_found_symbol_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chart": {
                    "result": null,
                    "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
                }
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        let err = provider.get_historical("ZZZZ").await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoData { .. }));
    }

    #[tokio::test]
    async fn test_news_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "news": [
                    { "title": "Apple beats estimates", "publisher": "Reuters",
                      "link": "https://example.com/a", "providerPublishTime": 1_700_000_000 },
                    { "title": "No publisher" }
                ]
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        let news = provider.get_news("AAPL").await.unwrap();

        assert_eq!(news.len(), 2);
        assert_eq!(news[0].publisher, "Reuters");
        assert!(news[0].published.is_some());
        assert_eq!(news[1].publisher, "Unknown");
    }

    #[tokio::test]
    async fn test_empty_news_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "news": [] })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri(), RetryPolicy::none());
        assert!(provider.get_news("AAPL").await.unwrap().is_empty());
    }
}
