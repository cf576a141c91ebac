//! Background loop that polls broker positions and closes them on
//! take-profit / stop-loss.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use tradebot_market_data::DataSourceOrchestrator;

use crate::broker::{BrokerClient, BrokerError, OpenPosition};
use crate::calendar::MarketCalendar;
use crate::constants::CONTRACT_MULTIPLIER;
use crate::errors::{Error, Result};
use crate::positions::{ExitReason, Position, PositionStore, PositionUpdate};
use crate::settings::TradingSettings;

use super::clock::{Clock, SystemClock};
use super::evaluation::{evaluate_exit, ExitThresholds};
use super::monitor_model::{ExitDecision, MonitoringCycleResult};

/// Polls the broker for open positions and executes exits.
///
/// The store is re-read every cycle; the monitor keeps no position state
/// of its own between cycles.
pub struct PositionMonitor {
    broker: Arc<dyn BrokerClient>,
    store: Arc<dyn PositionStore>,
    calendar: MarketCalendar,
    settings: TradingSettings,
    clock: Arc<dyn Clock>,
    quotes: Option<Arc<DataSourceOrchestrator>>,
}

impl PositionMonitor {
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        store: Arc<dyn PositionStore>,
        calendar: MarketCalendar,
        settings: TradingSettings,
    ) -> Self {
        Self {
            broker,
            store,
            calendar,
            settings,
            clock: Arc::new(SystemClock),
            quotes: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach an orchestrator used to log the underlying price on exits.
    pub fn with_quotes(mut self, orchestrator: Arc<DataSourceOrchestrator>) -> Self {
        self.quotes = Some(orchestrator);
        self
    }

    /// Spawn the monitoring loop on the current runtime.
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        MonitorHandle {
            shutdown: shutdown_tx,
            join,
        }
    }

    /// Run cycles until `shutdown` flips to true or its sender is dropped.
    ///
    /// A pending sleep is interrupted immediately; a cycle already in
    /// progress is allowed to finish.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Position monitor started (open interval {}s, closed interval {}s)",
            self.settings.position_check_interval.as_secs(),
            self.settings.closed_market_interval.as_secs()
        );
        let mut last_market_open: Option<bool> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = self.run_cycle().await;
            if let Ok(result) = &outcome {
                if last_market_open != Some(result.market_open) {
                    self.log_market_transition(result.market_open);
                    last_market_open = Some(result.market_open);
                }
            }
            let delay = self.next_delay(&outcome);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Position monitor stopped");
    }

    /// Sleep to apply after a cycle outcome.
    fn next_delay(&self, outcome: &Result<MonitoringCycleResult>) -> Duration {
        match outcome {
            Ok(result) => result.next_interval,
            Err(e) => {
                error!(
                    "Monitoring cycle failed: {}. Retrying in {}s",
                    e,
                    self.settings.error_backoff.as_secs()
                );
                self.settings.error_backoff
            }
        }
    }

    fn log_market_transition(&self, market_open: bool) {
        if market_open {
            info!(
                "Market is open - checking positions every {}s",
                self.settings.position_check_interval.as_secs()
            );
        } else {
            info!(
                "Market is closed - checking positions every {}s",
                self.settings.closed_market_interval.as_secs()
            );
        }
    }

    fn interval_for(&self, market_open: bool) -> Duration {
        if market_open {
            self.settings.position_check_interval
        } else {
            self.settings.closed_market_interval
        }
    }

    /// Perform one monitoring pass.
    pub async fn run_cycle(&self) -> Result<MonitoringCycleResult> {
        let market_open = self.calendar.is_open_for_new_trades(self.clock.now());

        let authenticated = self.call_broker(|b| Ok(b.is_authenticated())).await?;
        if !authenticated {
            debug!("Broker session not authenticated, skipping position check");
            return Ok(MonitoringCycleResult::new(
                false,
                market_open,
                self.settings.unauthenticated_backoff,
            ));
        }

        let mut result =
            MonitoringCycleResult::new(true, market_open, self.interval_for(market_open));

        let positions = self.call_broker(|b| b.get_open_positions()).await?;
        if positions.is_empty() {
            return Ok(result);
        }

        let tracked: HashMap<String, Position> = self
            .store
            .get_open_positions()
            .await?
            .into_iter()
            .map(|p| (p.option_id.clone(), p))
            .collect();

        for position in positions {
            if position.option_id.is_empty() {
                continue;
            }
            result.positions_checked += 1;
            self.check_position(&position, tracked.get(&position.option_id), &mut result)
                .await;
        }

        debug!(
            "Checked {} positions, {} exits",
            result.positions_checked,
            result.exits.len()
        );
        Ok(result)
    }

    async fn check_position(
        &self,
        position: &OpenPosition,
        record: Option<&Position>,
        result: &mut MonitoringCycleResult,
    ) {
        let thresholds = ExitThresholds::resolve(record, &self.settings);
        if thresholds.is_disabled() {
            return;
        }

        let pnl_percent = position.pnl_percent();
        let Some(reason) = evaluate_exit(pnl_percent, &thresholds) else {
            if let Some(record) = record {
                self.record_pnl(record, pnl_percent).await;
            }
            return;
        };

        info!(
            "{} hit: {} {} at {:.2}%",
            reason,
            position.ticker,
            position.option_id,
            pnl_percent * Decimal::ONE_HUNDRED
        );

        let option_id = position.option_id.clone();
        let quantity = position.contracts;
        let exit = self
            .call_broker(move |b| b.place_exit_order(&option_id, quantity))
            .await;
        if let Err(e) = exit {
            warn!("Failed to close position {}: {}", position.option_id, e);
            result.failed_exits.push(position.option_id.clone());
            return;
        }

        let exit_price = exit_premium(position);
        let underlying_price = self.underlying_quote(&position.ticker).await;

        match record {
            Some(record) => {
                if let Err(e) = self
                    .store
                    .close_position(&record.id, exit_price, reason.clone())
                    .await
                {
                    error!(
                        "RECONCILIATION REQUIRED: position {} ({}) closed at broker but not persisted: {}",
                        record.id, position.option_id, e
                    );
                    result.reconciliation_errors.push(position.option_id.clone());
                }
            }
            None => info!(
                "Closed untracked position {} at broker; nothing to persist",
                position.option_id
            ),
        }

        result.exits.push(ExitDecision {
            option_id: position.option_id.clone(),
            ticker: position.ticker.clone(),
            reason,
            pnl_percent,
            exit_price,
            underlying_price,
        });
    }

    async fn record_pnl(&self, record: &Position, pnl_percent: Decimal) {
        let update = PositionUpdate {
            pnl_percent: Some(pnl_percent),
            ..Default::default()
        };
        if let Err(e) = self.store.update_position(&record.id, update).await {
            warn!("Failed to record P&L for position {}: {}", record.id, e);
        }
    }

    async fn underlying_quote(&self, ticker: &str) -> Option<Decimal> {
        let orchestrator = self.quotes.as_ref()?;
        match orchestrator.get_quote(ticker).await {
            Ok(price) => {
                info!("{} underlying at ${}", ticker, price);
                Some(price)
            }
            Err(e) => {
                debug!("No underlying quote for {}: {}", ticker, e);
                None
            }
        }
    }

    /// Run a blocking broker call on the blocking pool.
    async fn call_broker<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn BrokerClient) -> std::result::Result<T, BrokerError> + Send + 'static,
        T: Send + 'static,
    {
        let broker = Arc::clone(&self.broker);
        let outcome = tokio::task::spawn_blocking(move || f(broker.as_ref())).await?;
        outcome.map_err(Error::from)
    }
}

/// Per-share premium implied by the position's market value.
fn exit_premium(position: &OpenPosition) -> Decimal {
    let shares = position.contracts * CONTRACT_MULTIPLIER;
    if shares <= Decimal::ZERO {
        return position.current_price;
    }
    position.current_price / shares
}

/// Handle to a running monitor task.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal the loop to stop. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the loop to exit.
    pub async fn join(self) -> Result<()> {
        self.join.await.map_err(Error::from)
    }

    /// Signal shutdown and wait for the loop to exit.
    pub async fn stop(self) -> Result<()> {
        self.shutdown();
        self.join().await
    }
}
