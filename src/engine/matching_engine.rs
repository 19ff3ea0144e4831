// ============================================================================
// Matching Engine
// Sequences orders into the book, classifies outcomes and tracks metrics
// ============================================================================

use crate::domain::{ExecutionStatus, Order, OrderBookSnapshot, OrderId, Trade};
use crate::engine::metrics::EngineMetrics;
use crate::engine::order_book::OrderBook;
use crate::error::BookError;
use crate::interfaces::TradeLog;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Execution Report
// ============================================================================

/// One report per submitted order
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExecutionReport {
    pub order_id: OrderId,
    pub status: ExecutionStatus,
    /// Submitted price (zero for market orders)
    pub price: Decimal,
    /// Submitted quantity
    pub quantity: u64,
    pub filled_quantity: u64,
    /// Set only when `status` is `Rejected`
    pub reject_reason: Option<BookError>,
}

impl ExecutionReport {
    fn from_order(order: &Order, status: ExecutionStatus, filled_quantity: u64) -> Self {
        Self {
            order_id: order.id,
            status,
            price: order.price,
            quantity: order.quantity,
            filled_quantity,
            reject_reason: None,
        }
    }

    pub fn leaves_quantity(&self) -> u64 {
        self.quantity - self.filled_quantity
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} [{}] qty={} @ {}",
            self.order_id, self.status, self.quantity, self.price
        )?;
        if let Some(reason) = &self.reject_reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

// ============================================================================
// Matching Engine
// ============================================================================

/// Single-writer matching engine around one `OrderBook`.
///
/// Every mutating call takes `&mut self`; move the engine onto the consumer
/// thread that drains the order queue, or put it behind an external lock.
pub struct MatchingEngine {
    order_book: OrderBook,

    /// Receives every trade after the book call that produced it
    trade_log: Arc<dyn TradeLog>,

    /// Append-only, never pruned
    reports: Vec<ExecutionReport>,

    metrics: EngineMetrics,
}

impl MatchingEngine {
    /// Create a new matching engine
    pub fn new(order_book: OrderBook, trade_log: Arc<dyn TradeLog>) -> Self {
        Self {
            order_book,
            trade_log,
            reports: Vec::new(),
            metrics: EngineMetrics::default(),
        }
    }

    /// Submit an order; always yields exactly one report.
    pub fn process_order(&mut self, order: Order) -> ExecutionReport {
        let submitted = order.clone();

        let start = Instant::now();
        let result = self.order_book.process_order(order);
        let latency_us = start.elapsed().as_secs_f64() * 1_000_000.0;

        self.metrics.record_order(latency_us);

        let report = match result {
            Ok(outcome) => {
                self.metrics.executed_trades = self.order_book.trade_count() as u64;
                self.forward_trades(&outcome.trades);

                let status =
                    ExecutionStatus::classify(outcome.trades.len(), outcome.remaining_quantity);
                ExecutionReport::from_order(&submitted, status, outcome.filled_quantity())
            },
            Err(reason) => {
                self.metrics.rejected_orders += 1;
                tracing::warn!(
                    instrument = %self.order_book.instrument(),
                    order_id = %submitted.id,
                    %reason,
                    "order rejected"
                );
                ExecutionReport {
                    reject_reason: Some(reason),
                    ..ExecutionReport::from_order(&submitted, ExecutionStatus::Rejected, 0)
                }
            },
        };

        tracing::debug!(
            instrument = %self.order_book.instrument(),
            order_id = %report.order_id,
            status = %report.status,
            filled = report.filled_quantity,
            latency_us,
            "order processed"
        );

        self.reports.push(report);
        report
    }

    /// Process orders one after another, in iteration order.
    ///
    /// Returns the reports appended by this call.
    pub fn process_batch_orders<I>(&mut self, orders: I) -> &[ExecutionReport]
    where
        I: IntoIterator<Item = Order>,
    {
        let first = self.reports.len();
        for order in orders {
            self.process_order(order);
        }
        &self.reports[first..]
    }

    /// Every report produced so far, oldest first
    pub fn reports(&self) -> &[ExecutionReport] {
        &self.reports
    }

    pub fn order_book(&self) -> &OrderBook {
        &self.order_book
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.metrics
    }

    /// Get order book snapshot
    pub fn get_snapshot(&self, depth: usize) -> OrderBookSnapshot {
        self.order_book.snapshot(depth)
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn forward_trades(&self, trades: &[Trade]) {
        for trade in trades {
            if let Err(err) = self.trade_log.record(trade) {
                tracing::warn!(
                    buy_id = %trade.buy_id,
                    sell_id = %trade.sell_id,
                    error = %err,
                    "trade log write failed"
                );
            }
        }
    }
}

impl fmt::Debug for MatchingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchingEngine")
            .field("order_book", &self.order_book)
            .field("reports", &self.reports.len())
            .field("metrics", &self.metrics)
            .finish()
    }
}
