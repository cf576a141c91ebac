//! Source registry module.
//!
//! This module provides orchestration for market data sources, including:
//! - Circuit breaking per source
//! - Pairing providers with their breakers (`DataSource`)
//! - Priority-ordered fallback per capability
//! - Skip/error diagnostics for each fetch

mod circuit_breaker;
mod data_source;
mod orchestrator;
mod skip_reason;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use data_source::DataSource;
pub use orchestrator::{DataSourceOrchestrator, SourcePriorities};
pub use skip_reason::{FetchDiagnostics, SkipReason, SourceAttempt};
