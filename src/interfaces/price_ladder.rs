// ============================================================================
// Price Ladder Interface
// One side of the book: price levels kept in strict priority order
// ============================================================================

use crate::domain::{Order, PriceLevel, Side};
use crate::error::BookError;
use rust_decimal::Decimal;

/// One side (bids or asks) of an order book.
///
/// Bids are ordered highest price first, asks lowest first, with at most one
/// level per price (or per tick bucket). Implementations are not synchronized;
/// the owning book is mutated by a single thread.
pub trait PriceLadder: Send {
    /// Which side this ladder holds
    fn side(&self) -> Side;

    /// Check that a limit price is addressable by this ladder
    fn validate_price(&self, price: Decimal) -> Result<(), BookError>;

    /// Append a resting order to the tail of its price level
    fn insert(&mut self, order: Order) -> Result<(), BookError>;

    /// The best (top-of-book) non-empty level
    fn best_level(&self) -> Option<&PriceLevel>;

    /// Mutable access to the best non-empty level
    fn best_level_mut(&mut self) -> Option<&mut PriceLevel>;

    /// Forget the best level if it has been drained
    fn prune_best(&mut self);

    /// Non-empty levels, best first
    fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_>;

    /// Number of non-empty levels
    fn level_count(&self) -> usize;

    /// Human-readable ladder kind for logging
    fn name(&self) -> &str;

    /// Price of the oldest order on the best level.
    ///
    /// For a discretized ladder this is the order's own price, not the bucket's.
    fn best_price(&self) -> Option<Decimal> {
        self.best_level()
            .and_then(|level| level.front())
            .map(|order| order.price)
    }

    /// Up to `num_levels` (level price, total quantity) pairs, best first
    fn depth(&self, num_levels: usize) -> Vec<(Decimal, u128)> {
        self.levels()
            .take(num_levels)
            .map(|level| (level.price, level.total_quantity()))
            .collect()
    }

    /// Resting orders across all levels
    fn order_count(&self) -> usize {
        self.levels().map(PriceLevel::order_count).sum()
    }

    fn is_empty(&self) -> bool {
        self.best_level().is_none()
    }
}
