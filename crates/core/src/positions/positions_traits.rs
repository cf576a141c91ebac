use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::positions::positions_model::{ExitReason, NewPosition, Position, PositionUpdate};

/// Trait for position persistence.
///
/// Implementations serialize writes per position id; no multi-row
/// transaction is required by callers.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn get_position(&self, id: &str) -> Result<Option<Position>>;

    async fn get_open_positions(&self) -> Result<Vec<Position>>;

    async fn create_position(&self, new_position: NewPosition) -> Result<Position>;

    async fn update_position(&self, id: &str, update: PositionUpdate) -> Result<Position>;

    /// Mark an open position closed with its realized exit price.
    async fn close_position(
        &self,
        id: &str,
        exit_price: Decimal,
        reason: ExitReason,
    ) -> Result<Position>;
}
