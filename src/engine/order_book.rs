// ============================================================================
// Order Book
// Two price ladders, the matching step and the append-only trade log
// ============================================================================

use crate::domain::ladder::new_ladder;
use crate::domain::{Order, OrderBookConfig, OrderBookSnapshot, OrderId, Side, Trade};
use crate::engine::PriceTimePriority;
use crate::error::{BookError, ConfigError};
use crate::interfaces::{MatchingAlgorithm, PriceLadder, Trades};
use rust_decimal::Decimal;

/// Callback invoked once per trade, in generation order
pub type TradeSink = Box<dyn FnMut(&Trade) + Send>;

/// Result of feeding one order through the book
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub order_id: OrderId,
    pub original_quantity: u64,
    /// Quantity left after matching
    pub remaining_quantity: u64,
    /// Trades in generation order
    pub trades: Trades,
    /// Whether the remainder now rests in the book
    pub rested: bool,
}

impl MatchOutcome {
    pub fn filled_quantity(&self) -> u64 {
        self.original_quantity - self.remaining_quantity
    }
}

/// Single-instrument limit order book.
///
/// Not synchronized: exactly one thread may call `process_order` on a given
/// instance, which `&mut self` enforces. Scale out by running one book per
/// consumer thread.
pub struct OrderBook {
    instrument: String,
    bids: Box<dyn PriceLadder>,
    asks: Box<dyn PriceLadder>,
    algorithm: Box<dyn MatchingAlgorithm>,
    trades: Vec<Trade>,
    trade_sink: Option<TradeSink>,
}

impl OrderBook {
    /// Create an order book with price/time matching
    pub fn new(config: &OrderBookConfig) -> Result<Self, ConfigError> {
        Self::with_algorithm(config, Box::new(PriceTimePriority::new()))
    }

    pub fn with_algorithm(
        config: &OrderBookConfig,
        algorithm: Box<dyn MatchingAlgorithm>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            instrument: config.instrument.clone(),
            bids: new_ladder(Side::Buy, &config.ladder)?,
            asks: new_ladder(Side::Sell, &config.ladder)?,
            algorithm,
            trades: Vec::new(),
            trade_sink: None,
        })
    }

    /// Match `order` against the opposite side and rest any limit remainder.
    ///
    /// An unfilled market remainder is dropped. Invalid orders are rejected
    /// before the book is touched.
    pub fn process_order(&mut self, mut order: Order) -> Result<MatchOutcome, BookError> {
        self.validate_order(&order)?;

        let order_id = order.id;
        let original_quantity = order.quantity;

        let (own_side, opposite_side) = match order.side {
            Side::Buy => (&mut self.bids, &mut self.asks),
            Side::Sell => (&mut self.asks, &mut self.bids),
        };

        let trades = self
            .algorithm
            .match_order(&mut order, &mut **opposite_side);

        let remaining_quantity = order.quantity;
        let rested = order.is_limit_order() && remaining_quantity > 0;
        if rested {
            own_side.insert(order)?;
        } else if remaining_quantity > 0 {
            tracing::debug!(
                instrument = %self.instrument,
                order_id = %order_id,
                dropped = remaining_quantity,
                "market order remainder dropped, no liquidity"
            );
        }

        for trade in &trades {
            tracing::trace!(
                instrument = %self.instrument,
                buy_id = %trade.buy_id,
                sell_id = %trade.sell_id,
                quantity = trade.quantity,
                price = %trade.price,
                "trade"
            );
            if let Some(sink) = self.trade_sink.as_mut() {
                sink(trade);
            }
        }
        self.trades.extend(trades.iter().cloned());

        Ok(MatchOutcome {
            order_id,
            original_quantity,
            remaining_quantity,
            trades,
            rested,
        })
    }

    /// Register a callback that sees every trade this book produces
    pub fn set_trade_sink(&mut self, sink: TradeSink) {
        self.trade_sink = Some(sink);
    }

    pub fn clear_trade_sink(&mut self) {
        self.trade_sink = None;
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Every trade executed by this book, oldest first
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn bids(&self) -> &dyn PriceLadder {
        &*self.bids
    }

    pub fn asks(&self) -> &dyn PriceLadder {
        &*self.asks
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn resting_order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(self.bids.depth(depth), self.asks.depth(depth))
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn validate_order(&self, order: &Order) -> Result<(), BookError> {
        if order.quantity == 0 {
            return Err(BookError::ZeroQuantity);
        }

        if order.is_limit_order() {
            if order.price <= Decimal::ZERO {
                return Err(BookError::NonPositivePrice { price: order.price });
            }
            // Both ladders share one range; the own side is where it would rest
            match order.side {
                Side::Buy => self.bids.validate_price(order.price)?,
                Side::Sell => self.asks.validate_price(order.price)?,
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("instrument", &self.instrument)
            .field("ladder", &self.bids.name())
            .field("bids", &self.bids.depth(usize::MAX))
            .field("asks", &self.asks.depth(usize::MAX))
            .field("trades", &self.trades.len())
            .finish()
    }
}
