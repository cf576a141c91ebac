//! Provider capability flags.

use crate::models::Capability;

/// Describes which capabilities a provider implements.
///
/// The orchestrator never calls a provider for a capability it does not
/// declare, so unsupported capabilities never reach the circuit breaker.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProviderCapabilities {
    /// Whether the provider serves daily OHLCV history.
    pub supports_historical: bool,

    /// Whether the provider serves a latest price.
    pub supports_quote: bool,

    /// Whether the provider serves news.
    pub supports_news: bool,
}

impl ProviderCapabilities {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::HistoricalSeries => self.supports_historical,
            Capability::Quote => self.supports_quote,
            Capability::News => self.supports_news,
        }
    }
}
