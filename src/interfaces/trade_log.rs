// ============================================================================
// Trade Log Interface
// Append-only collaborator that receives every executed trade
// ============================================================================

use crate::domain::Trade;
use crate::error::TradeLogError;
use parking_lot::Mutex;

/// Receives formatted trade records from the matching engine.
///
/// Called on the matching thread after each order, once per trade, in
/// generation order. Failures are reported back but never affect matching.
pub trait TradeLog: Send + Sync {
    /// Record a single trade
    fn record(&self, trade: &Trade) -> Result<(), TradeLogError>;
}

/// Discards every trade
pub struct NoOpTradeLog;

impl TradeLog for NoOpTradeLog {
    fn record(&self, _trade: &Trade) -> Result<(), TradeLogError> {
        Ok(())
    }
}

/// Emits each trade record as a `tracing` event on target `lob_engine::trades`
pub struct TracingTradeLog;

impl TradeLog for TracingTradeLog {
    fn record(&self, trade: &Trade) -> Result<(), TradeLogError> {
        tracing::info!(
            target: "lob_engine::trades",
            buy_id = %trade.buy_id,
            sell_id = %trade.sell_id,
            quantity = trade.quantity,
            price = %trade.price,
            "{}",
            trade
        );
        Ok(())
    }
}

/// Keeps formatted records in memory
#[derive(Default)]
pub struct MemoryTradeLog {
    records: Mutex<Vec<String>>,
}

impl MemoryTradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl TradeLog for MemoryTradeLog {
    fn record(&self, trade: &Trade) -> Result<(), TradeLogError> {
        self.records.lock().push(trade.to_string());
        Ok(())
    }
}
