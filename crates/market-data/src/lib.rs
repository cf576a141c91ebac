//! Tradebot Market Data Crate
//!
//! This crate provides resilient, provider-agnostic market data fetching for
//! the trading bot: daily history, latest quotes, and news.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple providers: Yahoo Finance (primary), Alpha Vantage, Finnhub
//! - HTTP retries below a per-source circuit breaker
//! - Priority-ordered fallback per capability
//! - A two-tier TTL cache (in-process + optional Redis)
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     Caller       |  (market data service, position monitor)
//! +------------------+
//!          |
//!          v
//! +------------------------+
//! | DataSourceOrchestrator |  (priority list per capability)
//! +------------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   DataSource     | --> |  CircuitBreaker  |  (one per source)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (Yahoo, AlphaVantage, Finnhub; retries inside)
//! +------------------+
//! ```
//!
//! The [`Cache`] sits beside the orchestrator: callers wrap orchestrator calls
//! with it, keeping fallback and caching independently testable.
//!
//! # Core Types
//!
//! - [`Series`] / [`Bar`] - Daily OHLCV history
//! - [`NewsItem`] - News article
//! - [`Capability`] - Historical series, quote, or news
//! - [`MarketDataError`] - Error taxonomy shared by every layer

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{Bar, Capability, NewsItem, Series, SourceId};

pub use errors::{MarketDataError, RetryPolicy};

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::finnhub::FinnhubProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{MarketDataProvider, ProviderCapabilities};

// Re-export registry types
pub use registry::{
    BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState, DataSource,
    DataSourceOrchestrator, FetchDiagnostics, SkipReason, SourcePriorities,
};

pub use cache::{Cache, CacheError, CacheStats, MemoryStore, RedisStore, RemoteStore};
