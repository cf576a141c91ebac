use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tradebot_market_data::BreakerSnapshot;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn get_status(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, BreakerSnapshot>> {
    Json(state.market_data.source_status())
}

/// Close the breaker of one source.
async fn reset_source(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<String, BreakerSnapshot>>> {
    if !state.market_data.reset_source(&name) {
        return Err(ApiError::NotFound(format!("Unknown data source: {}", name)));
    }
    tracing::info!("Circuit breaker reset for {}", name);
    Ok(Json(state.market_data.source_status()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/data-sources/status", get(get_status))
        .route("/data-sources/{name}/reset", post(reset_source))
}
