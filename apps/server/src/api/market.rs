use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradebot_core::calendar::MarketStatus;
use tradebot_core::market_data::{MarketNews, MarketSnapshot, ScoredNews};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheQuery {
    use_cache: Option<bool>,
}

impl CacheQuery {
    fn use_cache(&self) -> bool {
        self.use_cache.unwrap_or(true)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    ticker: String,
    price: Decimal,
}

async fn get_market_status(State(state): State<Arc<AppState>>) -> Json<MarketStatus> {
    Json(state.calendar.status(Utc::now()))
}

async fn get_market_news(
    Query(q): Query<CacheQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<MarketNews>>> {
    let news = state.market_data.get_market_news(q.use_cache()).await?;
    Ok(Json(news))
}

async fn get_quote(
    Path(ticker): Path<String>,
    Query(q): Query<CacheQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<QuoteResponse>> {
    let price = state.market_data.get_quote(&ticker, q.use_cache()).await?;
    Ok(Json(QuoteResponse {
        ticker: ticker.trim().to_uppercase(),
        price,
    }))
}

async fn get_news(
    Path(ticker): Path<String>,
    Query(q): Query<CacheQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ScoredNews>>> {
    let news = state.market_data.get_news(&ticker, q.use_cache()).await?;
    Ok(Json(news))
}

async fn get_snapshot(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MarketSnapshot>> {
    let snapshot = state.market_data.snapshot(&ticker).await?;
    Ok(Json(snapshot))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market/status", get(get_market_status))
        .route("/market/news", get(get_market_news))
        .route("/quotes/{ticker}", get(get_quote))
        .route("/news/{ticker}", get(get_news))
        .route("/snapshot/{ticker}", get(get_snapshot))
}
