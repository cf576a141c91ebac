use std::time::Duration;

use rust_decimal::Decimal;

/// Exchange time zone used by the market calendar.
pub const EXCHANGE_TIMEZONE: chrono_tz::Tz = chrono_tz::America::New_York;

/// Poll cadence while the market is open for new trades.
pub const DEFAULT_POSITION_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Poll cadence outside market hours.
pub const CLOSED_MARKET_CHECK_INTERVAL: Duration = Duration::from_secs(3600);

/// Wait before re-checking a broker session that is not authenticated.
pub const UNAUTHENTICATED_BACKOFF: Duration = Duration::from_secs(60);

/// Wait after a monitoring cycle fails.
pub const CYCLE_ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// Default take-profit and stop-loss thresholds (fractions of entry).
pub const DEFAULT_TAKE_PROFIT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
pub const DEFAULT_STOP_LOSS: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Cache TTLs per capability.
pub const CACHE_TTL_MARKET_DATA: Duration = Duration::from_secs(300);
pub const CACHE_TTL_NEWS: Duration = Duration::from_secs(600);
pub const CACHE_TTL_QUOTE: Duration = Duration::from_secs(60);
pub const CACHE_TTL_MARKET_NEWS: Duration = Duration::from_secs(900);

/// Minutes after the open during which new entries are blocked.
pub const DEFAULT_BLOCK_FIRST_MINUTES: u32 = 60;

/// Each option contract covers 100 shares.
pub const CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;
