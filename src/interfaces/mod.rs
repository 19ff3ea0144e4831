// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod matching_algorithm;
mod price_ladder;
mod queue;
mod trade_log;

pub use matching_algorithm::{MatchingAlgorithm, Trades};
pub use price_ladder::PriceLadder;
pub use queue::{BatchSource, PushSink};
pub use trade_log::{MemoryTradeLog, NoOpTradeLog, TracingTradeLog, TradeLog};
