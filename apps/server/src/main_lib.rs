use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tradebot_core::{
    broker::BrokerClient,
    calendar::MarketCalendar,
    market_data::{MarketDataService, MarketDataServiceTrait},
    monitor::{MonitorHandle, PositionMonitor},
    positions::{InMemoryPositionStore, PositionStore},
};
use tradebot_market_data::{
    AlphaVantageProvider, Cache, DataSource, DataSourceOrchestrator, FinnhubProvider,
    SourcePriorities, YahooProvider,
};

use crate::config::Config;

pub struct AppState {
    pub market_data: Arc<dyn MarketDataServiceTrait>,
    pub orchestrator: Arc<DataSourceOrchestrator>,
    pub cache: Arc<Cache>,
    pub calendar: MarketCalendar,
    pub positions: Arc<dyn PositionStore>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assemble state from an already-built orchestrator and cache.
    pub fn new(
        orchestrator: Arc<DataSourceOrchestrator>,
        cache: Arc<Cache>,
        positions: Arc<dyn PositionStore>,
        config: &Config,
    ) -> Self {
        let market_data = Arc::new(MarketDataService::new(
            orchestrator.clone(),
            cache.clone(),
            config.cache_ttls,
        ));
        Self {
            market_data,
            orchestrator,
            cache,
            calendar: MarketCalendar::new(config.calendar),
            positions,
            started_at: Utc::now(),
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("TRADEBOT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Data sources in registration order. Fallback sources need an API key.
pub fn build_sources(config: &Config) -> Vec<DataSource> {
    let mut sources = vec![DataSource::with_config(
        Arc::new(YahooProvider::new()),
        config.breaker.clone(),
    )];

    match &config.alpha_vantage_api_key {
        Some(key) => sources.push(DataSource::with_config(
            Arc::new(AlphaVantageProvider::new(key.clone())),
            config.breaker.clone(),
        )),
        None => tracing::info!("ALPHA_VANTAGE_API_KEY not set, Alpha Vantage fallback disabled"),
    }
    match &config.finnhub_api_key {
        Some(key) => sources.push(DataSource::with_config(
            Arc::new(FinnhubProvider::new(key.clone())),
            config.breaker.clone(),
        )),
        None => tracing::info!("FINNHUB_API_KEY not set, Finnhub news fallback disabled"),
    }

    sources
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let cache = if config.redis_enabled {
        Cache::connect(&config.redis_url).await
    } else {
        tracing::info!("Redis disabled, using in-memory cache only");
        Cache::memory_only()
    };

    let orchestrator = DataSourceOrchestrator::new(build_sources(config), SourcePriorities::default());
    let positions: Arc<dyn PositionStore> = Arc::new(InMemoryPositionStore::new());

    Ok(Arc::new(AppState::new(
        Arc::new(orchestrator),
        Arc::new(cache),
        positions,
        config,
    )))
}

/// Long-lived tasks sharing the server runtime.
pub struct BackgroundTasks {
    monitor: MonitorHandle,
    sweeper: JoinHandle<()>,
    sweeper_shutdown: watch::Sender<bool>,
}

impl BackgroundTasks {
    /// Stop the monitor and the cache sweeper, waiting for both.
    pub async fn shutdown(self) {
        let _ = self.sweeper_shutdown.send(true);
        if let Err(e) = self.monitor.stop().await {
            tracing::warn!("Position monitor did not stop cleanly: {}", e);
        }
        if let Err(e) = self.sweeper.await {
            tracing::warn!("Cache sweeper did not stop cleanly: {}", e);
        }
    }
}

pub fn start_background_tasks(
    state: &Arc<AppState>,
    config: &Config,
    broker: Arc<dyn BrokerClient>,
) -> BackgroundTasks {
    let monitor = PositionMonitor::new(
        broker,
        state.positions.clone(),
        state.calendar.clone(),
        config.trading.clone(),
    )
    .with_quotes(state.orchestrator.clone());

    let (sweeper_shutdown, sweeper_rx) = watch::channel(false);
    let sweeper = state
        .cache
        .spawn_sweeper(config.cache_sweep_interval, sweeper_rx);

    BackgroundTasks {
        monitor: Arc::new(monitor).start(),
        sweeper,
        sweeper_shutdown,
    }
}
