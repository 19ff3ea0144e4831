// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod ladder;
pub mod order;
pub mod order_book;
pub mod trade;

pub use config::{LadderConfig, OrderBookConfig, PipelineConfig};
pub use ladder::{new_ladder, TickLadder, TreeLadder};
pub use order::{ExecutionStatus, Order, OrderId, OrderType, Side};
pub use order_book::{OrderBookSnapshot, PriceLevel};
pub use trade::Trade;
