// ============================================================================
// Matching Algorithm Interface
// Defines the contract for matching an incoming order against a ladder
// ============================================================================

use crate::domain::{Order, OrderType, Side, Trade};
use crate::interfaces::PriceLadder;
use rust_decimal::Decimal;
use smallvec::SmallVec;

/// Trades produced by a single incoming order; most orders produce few.
pub type Trades = SmallVec<[Trade; 4]>;

/// Strategy interface for matching algorithms
pub trait MatchingAlgorithm: Send {
    /// Match an incoming order against the opposite side of the book
    ///
    /// # Arguments
    /// * `incoming_order` - The new order; its `quantity` is decremented by every fill
    /// * `opposite_side` - The opposite ladder; filled makers are removed from it
    ///
    /// # Returns
    /// Trades in generation order
    fn match_order(&self, incoming_order: &mut Order, opposite_side: &mut dyn PriceLadder)
        -> Trades;

    /// Get the algorithm name for logging/metrics
    fn name(&self) -> &str;

    /// Whether a resting price is acceptable to the incoming order.
    /// Market orders accept any price.
    fn prices_cross(&self, incoming: &Order, book_price: Decimal) -> bool {
        if incoming.order_type == OrderType::Market {
            return true;
        }

        match incoming.side {
            Side::Buy => incoming.price >= book_price,
            Side::Sell => incoming.price <= book_price,
        }
    }
}
