//! Market data module - cached access to the source orchestrator, ticker
//! validation and news scoring.

mod market_data_constants;
mod market_data_model;
mod market_data_service;
mod market_data_traits;
mod news_scoring;
mod ticker;

pub use market_data_constants::*;
pub use market_data_model::{MarketNews, MarketSnapshot, NewsCategory, ScoredNews};
pub use market_data_service::MarketDataService;
pub use market_data_traits::MarketDataServiceTrait;
pub use news_scoring::{
    categorize_market_news, score_market_news, score_news, sentiment_score, source_quality,
    time_decay_weight,
};
pub use ticker::validate_ticker;
