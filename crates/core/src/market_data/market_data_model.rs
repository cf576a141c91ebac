//! Market data service models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradebot_market_data::Series;

/// A news article with sentiment and relevance scores attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredNews {
    pub title: String,
    pub publisher: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    /// Keyword sentiment of the title, in [-1, 1]
    pub sentiment_score: f64,
    pub time_weight: f64,
    pub source_quality: f64,
    /// time_weight x source_quality
    pub relevance_score: f64,
}

/// Kind of market-moving event a headline describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsCategory {
    #[serde(rename = "Fed/Central Bank")]
    FedCentralBank,
    #[serde(rename = "Macro Data")]
    MacroData,
    #[serde(rename = "Corporate Catalyst")]
    CorporateCatalyst,
    #[serde(rename = "Geopolitical")]
    Geopolitical,
    #[serde(rename = "General Market")]
    GeneralMarket,
}

impl NewsCategory {
    /// Fed and macro headlines move the whole market.
    pub fn is_high_impact(self) -> bool {
        matches!(self, Self::FedCentralBank | Self::MacroData)
    }
}

/// A market-wide headline. Its relevance includes the category boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketNews {
    #[serde(flatten)]
    pub news: ScoredNews,
    pub category: NewsCategory,
}

/// Everything known about a ticker right now.
///
/// The price is always present; history and news degrade to absent with
/// their availability flag cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub ticker: String,
    pub price: Decimal,
    pub series: Option<Series>,
    pub news: Vec<ScoredNews>,
    pub series_available: bool,
    pub news_available: bool,
    pub as_of: DateTime<Utc>,
}
