// ============================================================================
// Matching Engine Factory
// Creates matching engines with proper configuration
// ============================================================================

use crate::domain::config::{LadderConfig, OrderBookConfig};
use crate::engine::{MatchingEngine, OrderBook};
use crate::error::ConfigError;
use crate::interfaces::{NoOpTradeLog, TradeLog};
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a matching engine from configuration
///
/// # Arguments
/// * `config` - Order book configuration
/// * `trade_log` - Collaborator that receives every executed trade
///
/// # Example
/// ```
/// use lob_engine::prelude::*;
/// use std::sync::Arc;
///
/// let config = OrderBookConfig::unbounded("AAPL");
/// let engine = create_from_config(config, Arc::new(NoOpTradeLog)).unwrap();
/// assert!(engine.order_book().is_empty());
/// ```
pub fn create_from_config(
    config: OrderBookConfig,
    trade_log: Arc<dyn TradeLog>,
) -> Result<MatchingEngine, ConfigError> {
    let order_book = OrderBook::new(&config)?;

    tracing::debug!(
        instrument = %config.instrument,
        ladder = ?config.ladder,
        "matching engine created"
    );

    Ok(MatchingEngine::new(order_book, trade_log))
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use lob_engine::prelude::*;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let engine = MatchingEngineBuilder::new("BTC-USD")
///     .tick_ladder(Decimal::from(90), Decimal::from(110), Decimal::new(1, 2))
///     .trade_log(Arc::new(TracingTradeLog))
///     .build()
///     .unwrap();
/// assert_eq!(engine.order_book().instrument(), "BTC-USD");
/// ```
pub struct MatchingEngineBuilder {
    config: OrderBookConfig,
    trade_log: Arc<dyn TradeLog>,
}

impl MatchingEngineBuilder {
    /// Create a new builder for the specified instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            config: OrderBookConfig::unbounded(instrument),
            trade_log: Arc::new(NoOpTradeLog),
        }
    }

    /// Use the unbounded ordered-map ladder (the default)
    pub fn tree_ladder(mut self) -> Self {
        self.config.ladder = LadderConfig::Tree;
        self
    }

    /// Use a discretized ladder over `[min_price, max_price)`
    pub fn tick_ladder(mut self, min_price: Decimal, max_price: Decimal, tick_size: Decimal) -> Self {
        self.config.ladder = LadderConfig::tick(min_price, max_price, tick_size);
        self
    }

    pub fn trade_log(mut self, trade_log: Arc<dyn TradeLog>) -> Self {
        self.trade_log = trade_log;
        self
    }

    /// Build the matching engine
    pub fn build(self) -> Result<MatchingEngine, ConfigError> {
        create_from_config(self.config, self.trade_log)
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &OrderBookConfig {
        &self.config
    }
}
