//! A provider paired with the circuit breaker that guards it.

use std::borrow::Cow;
use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;

use super::circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig};
use crate::errors::MarketDataError;
use crate::models::{Capability, NewsItem, Series, SourceId};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

/// One upstream provider and its exclusively owned circuit breaker.
///
/// Every fetch that reaches the provider mutates the breaker exactly once:
/// a success, or a failure when the error is a breaker failure. Unsupported
/// capabilities and refused calls never touch the breaker.
pub struct DataSource {
    provider: Arc<dyn MarketDataProvider>,
    breaker: CircuitBreaker,
}

impl DataSource {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(provider, CircuitBreakerConfig::default())
    }

    pub fn with_config(provider: Arc<dyn MarketDataProvider>, config: CircuitBreakerConfig) -> Self {
        let breaker = CircuitBreaker::with_config(provider.id(), config);
        Self { provider, breaker }
    }

    pub fn id(&self) -> SourceId {
        Cow::Borrowed(self.provider.id())
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        self.provider.capabilities()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().supports(capability)
    }

    /// Delegates to the breaker; may flip an expired open circuit.
    pub fn is_available(&self) -> bool {
        self.breaker.can_attempt()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    pub fn reset(&self) {
        self.breaker.reset();
    }

    /// Fail fast before any I/O: capability first, then the breaker.
    fn guard(&self, capability: Capability) -> Result<(), MarketDataError> {
        if !self.supports(capability) {
            return Err(MarketDataError::unsupported(self.provider.id(), capability));
        }
        if !self.breaker.can_attempt() {
            return Err(MarketDataError::CircuitOpen {
                source_name: self.provider.id().to_string(),
            });
        }
        Ok(())
    }

    /// Record the outcome of one provider call on the breaker.
    fn account<T>(&self, result: Result<T, MarketDataError>) -> Result<T, MarketDataError> {
        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(e) if e.is_breaker_failure() => {
                debug!("{} call failed: {}", self.provider.id(), e);
                self.breaker.record_failure();
            }
            Err(_) => {}
        }
        result
    }

    /// Fetch daily history. An empty series is a failure.
    pub async fn fetch_historical(&self, ticker: &str) -> Result<Series, MarketDataError> {
        self.guard(Capability::HistoricalSeries)?;
        let result = self.provider.get_historical(ticker).await.and_then(|series| {
            if series.is_empty() {
                Err(MarketDataError::no_data(self.provider.id(), ticker))
            } else {
                Ok(series)
            }
        });
        self.account(result)
    }

    /// Fetch the latest price. A non-positive price is a failure.
    pub async fn fetch_quote(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        self.guard(Capability::Quote)?;
        let result = self.provider.get_quote(ticker).await.and_then(|price| {
            if price <= Decimal::ZERO {
                Err(MarketDataError::no_data(self.provider.id(), ticker))
            } else {
                Ok(price)
            }
        });
        self.account(result)
    }

    /// Fetch recent news. An empty list is a success.
    pub async fn fetch_news(&self, ticker: &str) -> Result<Vec<NewsItem>, MarketDataError> {
        self.guard(Capability::News)?;
        let result = self.provider.get_news(ticker).await;
        self.account(result)
    }
}
