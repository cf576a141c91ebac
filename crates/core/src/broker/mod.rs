//! Broker seam - the blocking brokerage client consumed by the monitor.

mod broker_model;
mod broker_traits;

pub use broker_model::{BrokerError, OpenPosition, OptionType, OrderConfirmation};
pub use broker_traits::BrokerClient;
