//! Positions domain models.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::CONTRACT_MULTIPLIER;

/// Direction of the option entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    BuyCall,
    BuyPut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Why a position was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "Take Profit")]
    TakeProfit,
    #[serde(rename = "Stop Loss")]
    StopLoss,
    /// Explicit close by the user or another caller
    Manual(String),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TakeProfit => write!(f, "Take Profit"),
            Self::StopLoss => write!(f, "Stop Loss"),
            Self::Manual(reason) => write!(f, "{}", reason),
        }
    }
}

/// Domain model representing a tracked option position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub ticker: String,
    pub decision: Decision,
    pub option_id: String,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    pub contracts: Decimal,
    /// Option premium per share paid at entry
    pub entry_price: Decimal,
    /// Per-position override of the default take-profit fraction
    pub take_profit_pct: Option<Decimal>,
    /// Per-position override of the default stop-loss fraction
    pub stop_loss_pct: Option<Decimal>,
    pub status: PositionStatus,
    /// Last unrealized P&L fraction observed by the monitor
    pub pnl_percent: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub exit_reason: Option<String>,
    pub realized_pnl: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Realized P&L in dollars for a per-contract exit price.
    pub fn realized_pnl_at(&self, exit_price: Decimal) -> Decimal {
        (exit_price - self.entry_price) * self.contracts * CONTRACT_MULTIPLIER
    }
}

/// Input model for creating a new position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    pub id: Option<String>,
    pub ticker: String,
    pub decision: Decision,
    pub option_id: String,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    pub contracts: Decimal,
    pub entry_price: Decimal,
    pub take_profit_pct: Option<Decimal>,
    pub stop_loss_pct: Option<Decimal>,
}

/// Mutable fields of a position. Identity, strike, expiration and entry
/// price cannot be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub take_profit_pct: Option<Decimal>,
    pub stop_loss_pct: Option<Decimal>,
    pub pnl_percent: Option<Decimal>,
}
