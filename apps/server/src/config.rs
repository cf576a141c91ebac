//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;
use tradebot_core::calendar::CalendarRules;
use tradebot_core::constants::DEFAULT_BLOCK_FIRST_MINUTES;
use tradebot_core::settings::{CacheTtls, TradingSettings};
use tradebot_market_data::CircuitBreakerConfig;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CACHE_SWEEP_SECS: u64 = 120;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow_origins: Vec<String>,
    pub request_timeout: Duration,
    pub trading: TradingSettings,
    pub cache_ttls: CacheTtls,
    pub cache_sweep_interval: Duration,
    pub breaker: CircuitBreakerConfig,
    pub calendar: CalendarRules,
    pub redis_enabled: bool,
    pub redis_url: String,
    pub alpha_vantage_api_key: Option<String>,
    pub finnhub_api_key: Option<String>,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Invalid values fall
    /// back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let listen_addr = env.parse("TRADEBOT_LISTEN_ADDR").unwrap_or_else(|| {
            DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or(SocketAddr::from(([0, 0, 0, 0], 8080)))
        });
        let cors_allow_origins = env
            .string("TRADEBOT_CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);
        let request_timeout = Duration::from_millis(
            env.parse("TRADEBOT_REQUEST_TIMEOUT_MS")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        );

        let defaults = TradingSettings::default();
        let trading = TradingSettings {
            position_check_interval: env
                .secs("POSITION_CHECK_INTERVAL")
                .unwrap_or(defaults.position_check_interval),
            default_take_profit: env
                .fraction("DEFAULT_TAKE_PROFIT")
                .unwrap_or(defaults.default_take_profit),
            default_stop_loss: env
                .fraction("DEFAULT_STOP_LOSS")
                .unwrap_or(defaults.default_stop_loss),
            ..defaults
        };

        let ttl_defaults = CacheTtls::default();
        let cache_ttls = CacheTtls {
            market_data: env
                .secs("CACHE_TTL_MARKET_DATA")
                .unwrap_or(ttl_defaults.market_data),
            news: env.secs("CACHE_TTL_NEWS").unwrap_or(ttl_defaults.news),
            quote: env.secs("CACHE_TTL_QUOTE").unwrap_or(ttl_defaults.quote),
            market_news: env
                .secs("CACHE_TTL_MARKET_NEWS")
                .unwrap_or(ttl_defaults.market_news),
        };

        let breaker_defaults = CircuitBreakerConfig::default();
        let breaker = CircuitBreakerConfig {
            failure_threshold: env
                .parse("CIRCUIT_BREAKER_FAILURE_THRESHOLD")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(breaker_defaults.failure_threshold),
            success_threshold: env
                .parse("CIRCUIT_BREAKER_SUCCESS_THRESHOLD")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(breaker_defaults.success_threshold),
            recovery_timeout: env
                .secs("CIRCUIT_BREAKER_TIMEOUT_SECONDS")
                .unwrap_or(breaker_defaults.recovery_timeout),
        };

        let block_first_hour = env.parse("BLOCK_FIRST_HOUR_TRADING").unwrap_or(true);
        let calendar = CalendarRules {
            block_first_minutes: if block_first_hour {
                env.parse("BLOCK_FIRST_MINUTES")
                    .unwrap_or(DEFAULT_BLOCK_FIRST_MINUTES)
            } else {
                0
            },
            skip_schedule_check: env.parse("SKIP_MARKET_SCHEDULE_CHECK").unwrap_or(false),
        };

        Self {
            listen_addr,
            cors_allow_origins,
            request_timeout,
            trading,
            cache_ttls,
            cache_sweep_interval: env
                .secs("CACHE_SWEEP_INTERVAL_SECONDS")
                .unwrap_or(Duration::from_secs(DEFAULT_CACHE_SWEEP_SECS)),
            breaker,
            calendar,
            redis_enabled: env.parse("REDIS_ENABLED").unwrap_or(true),
            redis_url: env
                .string("REDIS_URL")
                .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            alpha_vantage_api_key: env.string("ALPHA_VANTAGE_API_KEY"),
            finnhub_api_key: env.string("FINNHUB_API_KEY"),
        }
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty trimmed value.
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.string(key)?;
        match raw.to_ascii_lowercase().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid value for {}: {:?}", key, raw);
                None
            }
        }
    }

    fn secs(&self, key: &str) -> Option<Duration> {
        self.parse::<u64>(key)
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    /// Non-negative decimal fraction.
    fn fraction(&self, key: &str) -> Option<Decimal> {
        self.parse::<Decimal>(key).filter(|d| {
            let valid = !d.is_sign_negative();
            if !valid {
                warn!("Ignoring negative value for {}", key);
            }
            valid
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.cors_allow_origins, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.trading, TradingSettings::default());
        assert_eq!(config.cache_ttls, CacheTtls::default());
        assert_eq!(config.breaker.failure_threshold, 3);
        assert_eq!(config.breaker.success_threshold, 2);
        assert_eq!(config.breaker.recovery_timeout, Duration::from_secs(300));
        assert_eq!(config.calendar, CalendarRules::default());
        assert!(config.redis_enabled);
        assert!(config.alpha_vantage_api_key.is_none());
        assert!(config.finnhub_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("POSITION_CHECK_INTERVAL", "15"),
            ("DEFAULT_TAKE_PROFIT", "0.35"),
            ("DEFAULT_STOP_LOSS", "0"),
            ("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5"),
            ("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60"),
            ("CACHE_TTL_QUOTE", "10"),
            ("REDIS_ENABLED", "False"),
            ("SKIP_MARKET_SCHEDULE_CHECK", "true"),
            ("TRADEBOT_CORS_ALLOW_ORIGINS", "http://a.test, http://b.test"),
            ("FINNHUB_API_KEY", " key "),
        ]);
        assert_eq!(config.trading.position_check_interval, Duration::from_secs(15));
        assert_eq!(config.trading.default_take_profit, dec!(0.35));
        assert_eq!(config.trading.default_stop_loss, Decimal::ZERO);
        assert_eq!(config.breaker.failure_threshold, 5);
        assert_eq!(config.breaker.recovery_timeout, Duration::from_secs(60));
        assert_eq!(config.cache_ttls.quote, Duration::from_secs(10));
        assert!(!config.redis_enabled);
        assert!(config.calendar.skip_schedule_check);
        assert_eq!(
            config.cors_allow_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.finnhub_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("POSITION_CHECK_INTERVAL", "soon"),
            ("DEFAULT_TAKE_PROFIT", "-0.1"),
            ("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "0"),
            ("TRADEBOT_LISTEN_ADDR", "not-an-addr"),
        ]);
        assert_eq!(config.trading.position_check_interval, Duration::from_secs(30));
        assert_eq!(config.trading.default_take_profit, dec!(0.20));
        assert_eq!(config.breaker.failure_threshold, 3);
        assert_eq!(config.listen_addr.port(), 8080);
    }

    #[test]
    fn test_block_first_hour_window() {
        assert_eq!(config(&[]).calendar.block_first_minutes, 60);
        assert_eq!(
            config(&[("BLOCK_FIRST_MINUTES", "15")]).calendar.block_first_minutes,
            15
        );
        assert_eq!(
            config(&[("BLOCK_FIRST_HOUR_TRADING", "false")])
                .calendar
                .block_first_minutes,
            0
        );
    }
}
