//! Positions module - domain models, the store seam, and an in-memory store.

mod positions_memory_store;
mod positions_model;
mod positions_traits;

pub use positions_memory_store::InMemoryPositionStore;
pub use positions_model::{
    Decision, ExitReason, NewPosition, Position, PositionStatus, PositionUpdate,
};
pub use positions_traits::PositionStore;
