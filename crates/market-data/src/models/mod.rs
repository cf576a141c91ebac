//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Source identifiers and the capability enum
//! - `series` - Daily OHLCV bars and historical series
//! - `news` - News articles returned by news-capable sources

mod news;
mod series;
mod types;

pub use news::NewsItem;
pub use series::{Bar, Series};
pub use types::{Capability, SourceId};
