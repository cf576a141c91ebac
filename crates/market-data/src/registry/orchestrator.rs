//! Multi-source fallback orchestrator.
//!
//! Holds one priority list per capability and tries sources in order:
//! - unregistered names, sources lacking the capability and sources whose
//!   breaker refuses are skipped without a call
//! - the first success wins
//! - when every source is exhausted, `AllSourcesFailed` wraps the last error
//!
//! Caching lives in [`crate::cache`], outside the orchestrator.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::future::Future;

use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::circuit_breaker::BreakerSnapshot;
use super::data_source::DataSource;
use super::skip_reason::{FetchDiagnostics, SkipReason};
use crate::errors::MarketDataError;
use crate::models::{Capability, NewsItem, Series, SourceId};

/// Ordered source names per capability.
#[derive(Clone, Debug)]
pub struct SourcePriorities {
    pub historical: Vec<SourceId>,
    pub quote: Vec<SourceId>,
    pub news: Vec<SourceId>,
}

impl Default for SourcePriorities {
    fn default() -> Self {
        Self {
            historical: vec![Cow::Borrowed("YAHOO"), Cow::Borrowed("ALPHA_VANTAGE")],
            quote: vec![Cow::Borrowed("YAHOO"), Cow::Borrowed("ALPHA_VANTAGE")],
            news: vec![Cow::Borrowed("YAHOO"), Cow::Borrowed("FINNHUB")],
        }
    }
}

impl SourcePriorities {
    pub fn for_capability(&self, capability: Capability) -> &[SourceId] {
        match capability {
            Capability::HistoricalSeries => &self.historical,
            Capability::Quote => &self.quote,
            Capability::News => &self.news,
        }
    }
}

/// Fallback orchestrator over a fixed set of data sources.
///
/// Immutable after construction; breaker state lives inside each source, so
/// the orchestrator is shared behind an `Arc` by the request path and the
/// position monitor.
pub struct DataSourceOrchestrator {
    sources: Vec<DataSource>,
    priorities: SourcePriorities,
}

impl DataSourceOrchestrator {
    pub fn new(sources: Vec<DataSource>, priorities: SourcePriorities) -> Self {
        for capability in Capability::ALL {
            let chain = priorities
                .for_capability(capability)
                .iter()
                .map(|id| id.as_ref())
                .collect::<Vec<_>>()
                .join(" -> ");
            info!("Data source priority for {}: {}", capability, chain);
        }
        Self {
            sources,
            priorities,
        }
    }

    pub fn priorities(&self) -> &SourcePriorities {
        &self.priorities
    }

    /// Look up a registered source by id, ignoring ASCII case.
    pub fn source(&self, name: &str) -> Option<&DataSource> {
        self.sources
            .iter()
            .find(|s| s.id().eq_ignore_ascii_case(name))
    }

    /// Fetch daily history, falling back across sources.
    pub async fn get_historical(&self, ticker: &str) -> Result<Series, MarketDataError> {
        self.fetch_with_fallback(Capability::HistoricalSeries, ticker, |source| {
            source.fetch_historical(ticker)
        })
        .await
    }

    /// Fetch the latest price, falling back across sources.
    pub async fn get_quote(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        self.fetch_with_fallback(Capability::Quote, ticker, |source| {
            source.fetch_quote(ticker)
        })
        .await
    }

    /// Fetch recent news, falling back across sources. Empty is a success.
    pub async fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, MarketDataError> {
        self.fetch_with_fallback(Capability::News, ticker, |source| source.fetch_news(ticker))
            .await
    }

    async fn fetch_with_fallback<'a, T, F, Fut>(
        &'a self,
        capability: Capability,
        ticker: &str,
        fetch: F,
    ) -> Result<T, MarketDataError>
    where
        F: Fn(&'a DataSource) -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let mut diagnostics = FetchDiagnostics::new();
        let mut last_error: Option<MarketDataError> = None;

        for name in self.priorities.for_capability(capability) {
            let Some(source) = self.source(name) else {
                diagnostics.record_skip(name.clone(), SkipReason::NotRegistered);
                continue;
            };

            if !source.supports(capability) {
                diagnostics.record_skip(source.id(), SkipReason::CapabilityNotSupported);
                continue;
            }

            if !source.is_available() {
                debug!("Skipping {} for {} {}: circuit open", name, capability, ticker);
                diagnostics.record_skip(source.id(), SkipReason::CircuitBreakerOpen);
                continue;
            }

            match fetch(source).await {
                Ok(value) => {
                    if diagnostics.calls_made() > 0 {
                        info!(
                            "Fetched {} for {} from fallback {} ({})",
                            capability,
                            ticker,
                            name,
                            diagnostics.summary()
                        );
                    } else {
                        debug!("Fetched {} for {} from {}", capability, ticker, name);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!("{} failed for {} {}: {}", name, capability, ticker, e);
                    diagnostics.record_error(source.id(), e.to_string());
                    last_error = Some(e);
                }
            }
        }

        warn!(
            "All sources failed for {} {}: {}",
            capability,
            ticker,
            diagnostics.summary()
        );

        Err(MarketDataError::AllSourcesFailed {
            capability,
            ticker: ticker.to_string(),
            last: last_error.map(Box::new),
        })
    }

    /// Breaker snapshot per registered source. No side effects.
    pub fn status(&self) -> BTreeMap<String, BreakerSnapshot> {
        self.sources
            .iter()
            .map(|s| (s.id().into_owned(), s.snapshot()))
            .collect()
    }

    /// Manually close one source's breaker. Returns false if unknown.
    pub fn reset_source(&self, name: &str) -> bool {
        match self.source(name) {
            Some(source) => {
                source.reset();
                true
            }
            None => false,
        }
    }
}
