//! In-memory `PositionStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::positions::positions_model::{
    ExitReason, NewPosition, Position, PositionStatus, PositionUpdate,
};
use crate::positions::positions_traits::PositionStore;

/// Process-local position store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    positions: RwLock<HashMap<String, Position>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn get_position(&self, id: &str) -> Result<Option<Position>> {
        Ok(self.positions.read().await.get(id).cloned())
    }

    async fn get_open_positions(&self) -> Result<Vec<Position>> {
        let mut open: Vec<Position> = self
            .positions
            .read()
            .await
            .values()
            .filter(|p| p.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(open)
    }

    async fn create_position(&self, new_position: NewPosition) -> Result<Position> {
        let now = Utc::now();
        let position = Position {
            id: new_position
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            ticker: new_position.ticker.to_uppercase(),
            decision: new_position.decision,
            option_id: new_position.option_id,
            strike: new_position.strike,
            expiration: new_position.expiration,
            contracts: new_position.contracts,
            entry_price: new_position.entry_price,
            take_profit_pct: new_position.take_profit_pct,
            stop_loss_pct: new_position.stop_loss_pct,
            status: PositionStatus::Open,
            pnl_percent: None,
            exit_price: None,
            exit_reason: None,
            realized_pnl: None,
            created_at: now,
            updated_at: now,
        };

        let mut positions = self.positions.write().await;
        if positions.contains_key(&position.id) {
            return Err(Error::Repository(format!(
                "Position {} already exists",
                position.id
            )));
        }
        positions.insert(position.id.clone(), position.clone());
        Ok(position)
    }

    async fn update_position(&self, id: &str, update: PositionUpdate) -> Result<Position> {
        let mut positions = self.positions.write().await;
        let position = positions
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Position {}", id)))?;

        if let Some(tp) = update.take_profit_pct {
            position.take_profit_pct = Some(tp);
        }
        if let Some(sl) = update.stop_loss_pct {
            position.stop_loss_pct = Some(sl);
        }
        if let Some(pnl) = update.pnl_percent {
            position.pnl_percent = Some(pnl);
        }
        position.updated_at = Utc::now();

        Ok(position.clone())
    }

    async fn close_position(
        &self,
        id: &str,
        exit_price: Decimal,
        reason: ExitReason,
    ) -> Result<Position> {
        let mut positions = self.positions.write().await;
        let position = positions
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Position {}", id)))?;

        if !position.is_open() {
            return Err(Error::PositionClosed(id.to_string()));
        }

        let pnl = position.realized_pnl_at(exit_price);
        position.status = PositionStatus::Closed;
        position.exit_price = Some(exit_price);
        position.exit_reason = Some(reason.to_string());
        position.realized_pnl = Some(pnl);
        position.updated_at = Utc::now();

        info!(
            "Closed position {} ({}) - P&L: ${:.2}",
            id, position.ticker, pnl
        );
        Ok(position.clone())
    }
}
