use rust_decimal::Decimal;

use super::broker_model::{BrokerError, OpenPosition, OrderConfirmation};

/// Blocking brokerage client.
///
/// Calls may block on network I/O; async callers must dispatch them with
/// `tokio::task::spawn_blocking`.
pub trait BrokerClient: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn get_open_positions(&self) -> Result<Vec<OpenPosition>, BrokerError>;

    /// Close `quantity` contracts of the position at market.
    fn place_exit_order(
        &self,
        option_id: &str,
        quantity: Decimal,
    ) -> Result<OrderConfirmation, BrokerError>;
}
