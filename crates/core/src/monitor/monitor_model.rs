//! Monitoring cycle results. Ephemeral: used for logging and tests only.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::positions::ExitReason;

/// One exit triggered during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitDecision {
    pub option_id: String,
    pub ticker: String,
    pub reason: ExitReason,
    pub pnl_percent: Decimal,
    /// Per-share option premium at exit
    pub exit_price: Decimal,
    /// Underlying quote at exit, when a quote source answered
    pub underlying_price: Option<Decimal>,
}

/// Outcome of one monitoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringCycleResult {
    pub authenticated: bool,
    pub market_open: bool,
    pub positions_checked: usize,
    pub exits: Vec<ExitDecision>,
    /// Option ids whose broker exit order failed
    pub failed_exits: Vec<String>,
    /// Option ids closed at the broker whose persistence failed
    pub reconciliation_errors: Vec<String>,
    pub next_interval: Duration,
}

impl MonitoringCycleResult {
    pub(crate) fn new(authenticated: bool, market_open: bool, next_interval: Duration) -> Self {
        Self {
            authenticated,
            market_open,
            positions_checked: 0,
            exits: Vec::new(),
            failed_exits: Vec::new(),
            reconciliation_errors: Vec::new(),
            next_interval,
        }
    }
}
