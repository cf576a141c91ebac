//! Finnhub market data provider implementation.
//!
//! Fallback source for news only, via the /company-news endpoint.
//! Articles from the last 7 days are requested and at most 15 are kept.
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{MarketDataError, RetryPolicy};
use crate::models::NewsItem;
use crate::provider::{mentions_rate_limit, HttpFetcher, MarketDataProvider, ProviderCapabilities};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Lookback window for company news.
const NEWS_LOOKBACK_DAYS: i64 = 7;

/// Maximum number of articles returned per ticker.
const MAX_ARTICLES: usize = 15;

// ============================================================================
// API Response Structures
// ============================================================================

/// One article from /company-news
#[derive(Debug, Deserialize)]
struct NewsArticle {
    #[serde(default)]
    headline: String,
    /// Publisher name
    source: Option<String>,
    #[serde(default)]
    url: String,
    /// Publish time (Unix seconds)
    datetime: Option<i64>,
    #[serde(default)]
    summary: String,
    // Note: category, id, image, related exist but are not used
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub news provider.
pub struct FinnhubProvider {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL, RetryPolicy::default())
    }

    /// Create a provider pointed at another host (used by tests).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http: HttpFetcher::new(PROVIDER_ID, retry),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        self.http
            .get_text(|client| {
                client
                    .get(&url)
                    // Add API key as header (keeps it out of logged URLs)
                    .header("X-Finnhub-Token", &self.api_key)
                    .query(params)
            })
            .await
    }

    /// Decode a news payload, recognizing the `{"error": ...}` shape.
    fn parse_news(body: &str) -> Result<Vec<NewsArticle>, MarketDataError> {
        match serde_json::from_str::<Vec<NewsArticle>>(body) {
            Ok(articles) => Ok(articles),
            Err(parse_error) => {
                if let Ok(ErrorResponse { error: Some(message) }) = serde_json::from_str(body) {
                    if mentions_rate_limit(&message) {
                        warn!("Finnhub rate limit: {}", message);
                        return Err(MarketDataError::rate_limited(PROVIDER_ID));
                    }
                    return Err(MarketDataError::ProviderError {
                        source_name: PROVIDER_ID.to_string(),
                        message,
                    });
                }
                if mentions_rate_limit(body) {
                    return Err(MarketDataError::rate_limited(PROVIDER_ID));
                }
                Err(MarketDataError::parse(PROVIDER_ID, parse_error.to_string()))
            }
        }
    }

    fn to_news_item(article: NewsArticle) -> NewsItem {
        NewsItem {
            title: article.headline,
            publisher: article
                .source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            link: article.url,
            published: article
                .datetime
                .filter(|ts| *ts > 0)
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
            summary: article.summary,
        }
    }

    async fn company_news(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, MarketDataError> {
        let to = now.format("%Y-%m-%d").to_string();
        let from = (now - Duration::days(NEWS_LOOKBACK_DAYS))
            .format("%Y-%m-%d")
            .to_string();

        let body = self
            .fetch(
                "/company-news",
                &[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;

        let news: Vec<NewsItem> = Self::parse_news(&body)?
            .into_iter()
            .take(MAX_ARTICLES)
            .map(Self::to_news_item)
            .collect();

        debug!("Finnhub: fetched {} articles for {}", news.len(), symbol);
        Ok(news)
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_news: true,
            ..Default::default()
        }
    }

    async fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, MarketDataError> {
        let symbol = ticker.trim().to_uppercase();
        self.company_news(&symbol, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, retry: RetryPolicy) -> FinnhubProvider {
        FinnhubProvider::with_base_url("test-token".to_string(), server.uri(), retry)
    }

    #[test]
    fn test_provider_capabilities() {
        let provider = FinnhubProvider::new("key".to_string());
        assert_eq!(provider.id(), "FINNHUB");
        let caps = provider.capabilities();
        assert!(caps.supports_news);
        assert!(!caps.supports_historical);
        assert!(!caps.supports_quote);
    }

    #[tokio::test]
    async fn test_company_news_window_and_header() {
        let server = MockServer::start().await;
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();

        Mock::given(method("GET"))
            .and(path("/company-news"))
            .and(header("X-Finnhub-Token", "test-token"))
            .and(query_param("symbol", "AAPL"))
            .and(query_param("from", "2024-03-08"))
            .and(query_param("to", "2024-03-15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "headline": "Apple unveils chip", "source": "CNBC",
                  "url": "https://example.com/1", "datetime": 1_710_500_000,
                  "summary": "New silicon." },
                { "headline": "Second", "source": "", "url": "https://example.com/2", "datetime": 0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let news = provider(&server, RetryPolicy::none())
            .company_news("AAPL", now)
            .await
            .unwrap();

        assert_eq!(news.len(), 2);
        assert_eq!(news[0].publisher, "CNBC");
        assert_eq!(news[0].summary, "New silicon.");
        assert!(news[0].published.is_some());
        assert_eq!(news[1].publisher, "Unknown");
        assert!(news[1].published.is_none());
    }

    #[tokio::test]
    async fn test_caps_article_count() {
        let server = MockServer::start().await;
        let articles: Vec<_> = (0..40)
            .map(|i| json!({ "headline": format!("h{}", i), "source": "AP", "url": "" }))
            .collect();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(articles))
            .mount(&server)
            .await;

        let news = provider(&server, RetryPolicy::none())
            .get_news("msft")
            .await
            .unwrap();
        assert_eq!(news.len(), 15);
    }

    #[tokio::test]
    async fn test_429_retried_then_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(4)
            .mount(&server)
            .await;

        let err = provider(&server, RetryPolicy::immediate(3))
            .get_news("AAPL")
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert!(err.is_breaker_failure());
    }

    #[tokio::test]
    async fn test_error_payload_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "error": "Symbol not supported" })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, RetryPolicy::none())
            .get_news("AAPL")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_invalid_key_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server, RetryPolicy::immediate(3))
            .get_news("AAPL")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_historical_is_unsupported() {
        let provider = FinnhubProvider::new("key".to_string());
        let err = provider.get_historical("AAPL").await.unwrap_err();
        assert!(!err.is_breaker_failure());
    }
}
