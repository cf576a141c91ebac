//! Settings module - typed runtime settings for the monitor and the cache.

mod settings_model;

pub use settings_model::{CacheTtls, TradingSettings};
