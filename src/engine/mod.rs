// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod matching_engine;
mod metrics;
mod order_book;
mod price_time;

pub mod factory;

pub use factory::{create_from_config, MatchingEngineBuilder};
pub use matching_engine::{ExecutionReport, MatchingEngine};
pub use metrics::EngineMetrics;
pub use order_book::{MatchOutcome, OrderBook, TradeSink};
pub use price_time::PriceTimePriority;
