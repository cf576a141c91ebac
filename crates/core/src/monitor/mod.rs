//! Position monitor - the background task that closes positions on
//! take-profit / stop-loss.

mod clock;
mod evaluation;
mod monitor_model;
mod position_monitor;

pub use clock::{Clock, SystemClock};
pub use evaluation::{evaluate_exit, ExitThresholds};
pub use monitor_model::{ExitDecision, MonitoringCycleResult};
pub use position_monitor::{MonitorHandle, PositionMonitor};
