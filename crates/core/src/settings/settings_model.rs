//! Settings models.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Position monitor cadence and default exit thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSettings {
    /// Poll cadence while the market is open for new trades
    pub position_check_interval: Duration,
    /// Poll cadence while the market is closed
    pub closed_market_interval: Duration,
    /// Wait when the broker session is not authenticated
    pub unauthenticated_backoff: Duration,
    /// Wait after a failed cycle
    pub error_backoff: Duration,
    /// Fraction of entry at which a position is closed in profit (0 disables)
    pub default_take_profit: Decimal,
    /// Fraction of entry at which a position is closed at a loss (0 disables)
    pub default_stop_loss: Decimal,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            position_check_interval: DEFAULT_POSITION_CHECK_INTERVAL,
            closed_market_interval: CLOSED_MARKET_CHECK_INTERVAL,
            unauthenticated_backoff: UNAUTHENTICATED_BACKOFF,
            error_backoff: CYCLE_ERROR_BACKOFF,
            default_take_profit: DEFAULT_TAKE_PROFIT,
            default_stop_loss: DEFAULT_STOP_LOSS,
        }
    }
}

/// Cache time-to-live per kind of market data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheTtls {
    pub market_data: Duration,
    pub news: Duration,
    pub quote: Duration,
    pub market_news: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            market_data: CACHE_TTL_MARKET_DATA,
            news: CACHE_TTL_NEWS,
            quote: CACHE_TTL_QUOTE,
            market_news: CACHE_TTL_MARKET_NEWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trading_defaults() {
        let settings = TradingSettings::default();
        assert_eq!(settings.position_check_interval, Duration::from_secs(30));
        assert_eq!(settings.closed_market_interval, Duration::from_secs(3600));
        assert_eq!(settings.unauthenticated_backoff, Duration::from_secs(60));
        assert_eq!(settings.default_take_profit, dec!(0.20));
        assert_eq!(settings.default_stop_loss, dec!(0.20));
    }

    #[test]
    fn test_cache_ttl_defaults() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.market_data.as_secs(), 300);
        assert_eq!(ttls.news.as_secs(), 600);
        assert_eq!(ttls.quote.as_secs(), 60);
        assert_eq!(ttls.market_news.as_secs(), 900);
    }
}
