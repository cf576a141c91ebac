//! Alpha Vantage market data provider implementation.
//!
//! Fallback source for history and quotes:
//! - Daily history via the TIME_SERIES_DAILY endpoint
//! - Latest price via the GLOBAL_QUOTE endpoint
//!
//! Alpha Vantage has no news endpoint in this integration.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute and
//! reports throttling inside a 200 response (`Note` / `Information` fields).

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::{MarketDataError, RetryPolicy};
use crate::models::{Bar, Series};
use crate::provider::{mentions_rate_limit, HttpFetcher, MarketDataProvider, ProviderCapabilities};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Days of history kept from the full output.
const HISTORY_DAYS: i64 = 365;

/// Alpha Vantage market data provider.
///
/// Free tier is limited to 5 API calls per minute.
pub struct AlphaVantageProvider {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// TIME_SERIES_DAILY response for equities
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyQuote>>,
    #[serde(flatten)]
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(flatten)]
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

/// Error and throttling fields shared by every endpoint
#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL, RetryPolicy::default())
    }

    /// Create a provider pointed at another host (used by tests).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http: HttpFetcher::new(PROVIDER_ID, retry),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        debug!("Alpha Vantage request: {:?}", params.first());

        self.http
            .get_text(|client| {
                client
                    .get(&self.base_url)
                    .query(params)
                    .query(&[("apikey", self.api_key.as_str())])
            })
            .await
    }

    /// Check the error and throttling fields of a decoded response.
    fn check_api_error(status: &ApiStatus) -> Result<(), MarketDataError> {
        if let Some(error) = &status.error_message {
            return Err(MarketDataError::ProviderError {
                source_name: PROVIDER_ID.to_string(),
                message: error.clone(),
            });
        }

        for notice in [&status.note, &status.information].into_iter().flatten() {
            if mentions_rate_limit(notice) || notice.to_lowercase().contains("rate") {
                warn!("Alpha Vantage rate limit: {}", notice);
                return Err(MarketDataError::rate_limited(PROVIDER_ID));
            }
        }

        Ok(())
    }

    fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, MarketDataError> {
        serde_json::from_str(body).map_err(|e| {
            if mentions_rate_limit(body) {
                MarketDataError::rate_limited(PROVIDER_ID)
            } else {
                MarketDataError::parse(PROVIDER_ID, e.to_string())
            }
        })
    }

    fn parse_decimal(value: &str) -> Result<Decimal, MarketDataError> {
        Decimal::from_str(value.trim())
            .map_err(|e| MarketDataError::parse(PROVIDER_ID, format!("'{}': {}", value, e)))
    }

    fn daily_to_bar(date: &str, daily: &DailyQuote) -> Result<Bar, MarketDataError> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| MarketDataError::parse(PROVIDER_ID, format!("date '{}': {}", date, e)))?;
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| MarketDataError::parse(PROVIDER_ID, format!("date '{}'", date)))?;

        Ok(Bar::ohlcv(
            Utc.from_utc_datetime(&midnight),
            Self::parse_decimal(&daily.open)?,
            Self::parse_decimal(&daily.high)?,
            Self::parse_decimal(&daily.low)?,
            Self::parse_decimal(&daily.close)?,
            daily
                .volume
                .as_deref()
                .and_then(|v| Decimal::from_str(v.trim()).ok()),
        ))
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_historical: true,
            supports_quote: true,
            supports_news: false,
        }
    }

    async fn get_historical(&self, ticker: &str) -> Result<Series, MarketDataError> {
        let symbol = ticker.trim().to_uppercase();
        let body = self
            .fetch(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", "full"),
            ])
            .await?;

        let response: TimeSeriesResponse = Self::decode(&body)?;
        Self::check_api_error(&response.status)?;

        let time_series = response.time_series.unwrap_or_default();
        let bars = time_series
            .iter()
            .map(|(date, daily)| Self::daily_to_bar(date, daily))
            .collect::<Result<Vec<_>, _>>()?;

        let series =
            Series::new(symbol.clone(), PROVIDER_ID, bars).trim_to_days(Utc::now(), HISTORY_DAYS);
        if series.is_empty() {
            return Err(MarketDataError::no_data(PROVIDER_ID, &symbol));
        }

        debug!("Alpha Vantage: fetched {} days for {}", series.len(), symbol);
        Ok(series)
    }

    async fn get_quote(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        let symbol = ticker.trim().to_uppercase();
        let body = self
            .fetch(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol.as_str())])
            .await?;

        let response: GlobalQuoteResponse = Self::decode(&body)?;
        Self::check_api_error(&response.status)?;

        let price = response
            .global_quote
            .and_then(|q| q.price)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| MarketDataError::no_data(PROVIDER_ID, &symbol))?;

        let price = Self::parse_decimal(&price)?;
        if price <= Decimal::ZERO {
            return Err(MarketDataError::no_data(PROVIDER_ID, &symbol));
        }
        Ok(price)
    }
}
