//! Broker adapter shipped with the server.

use rust_decimal::Decimal;
use tradebot_core::broker::{BrokerClient, BrokerError, OpenPosition, OrderConfirmation};

/// A broker that is never authenticated. The position monitor idles on its
/// unauthenticated backoff until a real brokerage client is plugged in.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBroker;

impl BrokerClient for OfflineBroker {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn get_open_positions(&self) -> Result<Vec<OpenPosition>, BrokerError> {
        Err(BrokerError::NotAuthenticated)
    }

    fn place_exit_order(
        &self,
        _option_id: &str,
        _quantity: Decimal,
    ) -> Result<OrderConfirmation, BrokerError> {
        Err(BrokerError::NotAuthenticated)
    }
}
