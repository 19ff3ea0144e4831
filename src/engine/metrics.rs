// ============================================================================
// Engine Metrics
// ============================================================================

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Running counters owned by one `MatchingEngine`.
///
/// Handed out by value; exporters get a copy, never a shared handle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineMetrics {
    /// Orders submitted, rejected ones included
    pub processed_orders: u64,
    /// Cumulative trade count of the book (a level, not a per-call increment)
    pub executed_trades: u64,
    pub rejected_orders: u64,
    /// Incremental mean of per-order book latency, microseconds
    pub avg_latency_us: f64,
}

impl EngineMetrics {
    /// Count one order and fold its latency into the running mean
    pub fn record_order(&mut self, latency_us: f64) {
        self.processed_orders += 1;
        self.avg_latency_us += (latency_us - self.avg_latency_us) / self.processed_orders as f64;
    }
}
