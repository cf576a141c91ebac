//! Tradebot Core - market calendar, position monitoring and cached market
//! data.
//!
//! This crate holds the trading-side business logic. It is storage- and
//! broker-agnostic: positions are persisted through [`positions::PositionStore`]
//! and orders go through [`broker::BrokerClient`]. Market data comes from the
//! `tradebot-market-data` crate.

pub mod broker;
pub mod calendar;
pub mod constants;
pub mod errors;
pub mod market_data;
pub mod monitor;
pub mod positions;
pub mod settings;

pub use calendar::{CalendarRules, MarketCalendar, MarketStatus};
pub use monitor::{MonitorHandle, PositionMonitor};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
