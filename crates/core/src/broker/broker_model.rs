//! Broker domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a broker client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerError {
    #[error("Broker session is not authenticated")]
    NotAuthenticated,

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Broker transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// An open option position as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub option_id: String,
    pub ticker: String,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub contracts: Decimal,
    /// Total cost basis of the position
    pub entry_price: Decimal,
    /// Current market value of the position
    pub current_price: Decimal,
}

impl OpenPosition {
    /// Unrealized P&L as a fraction of entry.
    ///
    /// A non-positive `current_price` means the broker has no mark for the
    /// contract, not a -100% loss, so the result is zero and no exit fires.
    /// The same holds for a missing cost basis.
    pub fn pnl_percent(&self) -> Decimal {
        if self.entry_price <= Decimal::ZERO || self.current_price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.current_price - self.entry_price) / self.entry_price
    }
}

/// Broker acknowledgement of a closing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub option_id: String,
    pub quantity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(entry: Decimal, current: Decimal) -> OpenPosition {
        OpenPosition {
            option_id: "opt-1".to_string(),
            ticker: "AAPL".to_string(),
            strike: dec!(190),
            expiration: NaiveDate::from_ymd_opt(2024, 4, 19).unwrap(),
            option_type: OptionType::Call,
            contracts: dec!(1),
            entry_price: entry,
            current_price: current,
        }
    }

    #[test]
    fn test_pnl_percent() {
        assert_eq!(position(dec!(10.00), dec!(13.10)).pnl_percent(), dec!(0.31));
        assert_eq!(position(dec!(10.00), dec!(7.40)).pnl_percent(), dec!(-0.26));
    }

    #[test]
    fn test_pnl_percent_missing_prices() {
        assert_eq!(position(dec!(0), dec!(5)).pnl_percent(), Decimal::ZERO);
        assert_eq!(position(dec!(5), dec!(0)).pnl_percent(), Decimal::ZERO);
    }
}
