// ============================================================================
// Limit Order Book Engine Library
// Price-time matching fed through lock-free ring buffers
// ============================================================================

//! # LOB Engine
//!
//! A single-instrument limit order book with price-time priority matching,
//! wrapped by a reporting engine and fed through bounded lock-free queues.
//!
//! ## Features
//!
//! - **Price-time priority** across multiple price levels with partial fills
//! - **Two ladder layouts**: an unbounded ordered map, or a fixed tick array
//! - **Wait-free SPSC** and **lock-free MPMC** ring buffers
//! - **Execution reports and metrics** for every submitted order
//!
//! ## Example
//!
//! ```rust
//! use lob_engine::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let mut engine =
//!     create_from_config(OrderBookConfig::unbounded("BTC-USD"), Arc::new(NoOpTradeLog)).unwrap();
//!
//! engine.process_order(Order::limit(1, Side::Sell, Decimal::from(50_000), 2));
//! let report = engine.process_order(Order::limit(2, Side::Buy, Decimal::from(50_000), 1));
//! assert_eq!(report.status, ExecutionStatus::Filled);
//!
//! let snapshot = engine.get_snapshot(10);
//! assert_eq!(snapshot.best_ask(), Some(Decimal::from(50_000)));
//! assert_eq!(snapshot.total_ask_quantity(), 1);
//! assert_eq!(snapshot.best_bid(), None);
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod pipeline;
pub mod queue;

#[cfg(feature = "logging")]
pub mod logging;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        ExecutionStatus, LadderConfig, Order, OrderBookConfig, OrderBookSnapshot, OrderId,
        OrderType, PipelineConfig, PriceLevel, Side, Trade,
    };
    pub use crate::engine::{
        create_from_config, EngineMetrics, ExecutionReport, MatchOutcome, MatchingEngine,
        MatchingEngineBuilder, OrderBook, PriceTimePriority,
    };
    pub use crate::error::{BookError, ConfigError, TradeLogError};
    pub use crate::interfaces::{
        BatchSource, MatchingAlgorithm, MemoryTradeLog, NoOpTradeLog, PriceLadder, PushSink,
        TracingTradeLog, TradeLog,
    };
    pub use crate::pipeline::{push_with_backoff, run_consumer, ConsumerStats, ShutdownSignal};
    pub use crate::queue::{spsc, MpmcQueue};
}
