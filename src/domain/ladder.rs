// ============================================================================
// Price Ladders
// Ordered-map and discretized-array representations of one book side
// ============================================================================

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::config::{tick_level_count, LadderConfig};
use super::{Order, PriceLevel, Side};
use crate::error::{BookError, ConfigError};
use crate::interfaces::PriceLadder;

/// Build one side of the book from configuration
pub fn new_ladder(side: Side, config: &LadderConfig) -> Result<Box<dyn PriceLadder>, ConfigError> {
    match *config {
        LadderConfig::Tree => Ok(Box::new(TreeLadder::new(side))),
        LadderConfig::Tick {
            min_price,
            max_price,
            tick_size,
        } => Ok(Box::new(TickLadder::new(
            side, min_price, max_price, tick_size,
        )?)),
    }
}

// ============================================================================
// Tree Ladder
// ============================================================================

/// Ladder keyed by exact price in a `BTreeMap`.
///
/// No range limit. Drained levels are erased, so every key present is a
/// non-empty level.
#[derive(Debug)]
pub struct TreeLadder {
    side: Side,
    levels: BTreeMap<Decimal, PriceLevel>,
}

impl TreeLadder {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }
}

impl PriceLadder for TreeLadder {
    fn side(&self) -> Side {
        self.side
    }

    fn validate_price(&self, _price: Decimal) -> Result<(), BookError> {
        Ok(())
    }

    fn insert(&mut self, order: Order) -> Result<(), BookError> {
        self.levels
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price))
            .push_back(order);
        Ok(())
    }

    fn best_level(&self) -> Option<&PriceLevel> {
        match self.side {
            // Highest bid (last in sorted order)
            Side::Buy => self.levels.values().next_back(),
            // Lowest ask (first in sorted order)
            Side::Sell => self.levels.values().next(),
        }
    }

    fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values_mut().next_back(),
            Side::Sell => self.levels.values_mut().next(),
        }
    }

    fn prune_best(&mut self) {
        let best = match self.side {
            Side::Buy => self.levels.last_entry(),
            Side::Sell => self.levels.first_entry(),
        };
        if let Some(entry) = best {
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }

    fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn name(&self) -> &str {
        "tree"
    }
}

// ============================================================================
// Tick Ladder
// ============================================================================

/// Ladder backed by a fixed array of tick-wide buckets.
///
/// Bucket `i` holds price `min + i*tick`; prices off that grid are rejected,
/// so every order in a bucket has the same price. `best` always points
/// at the best non-empty bucket, so top-of-book is O(1); when that bucket
/// drains the scan walks toward worse prices until it finds the next one.
#[derive(Debug)]
pub struct TickLadder {
    side: Side,
    min_price: Decimal,
    max_price: Decimal,
    tick_size: Decimal,
    levels: Vec<PriceLevel>,
    best: Option<usize>,
    non_empty: usize,
}

impl TickLadder {
    pub fn new(
        side: Side,
        min_price: Decimal,
        max_price: Decimal,
        tick_size: Decimal,
    ) -> Result<Self, ConfigError> {
        let count = tick_level_count(min_price, max_price, tick_size)?;
        let levels = (0..count)
            .map(|i| PriceLevel::new(min_price + tick_size * Decimal::from(i)))
            .collect();

        Ok(Self {
            side,
            min_price,
            max_price,
            tick_size,
            levels,
            best: None,
            non_empty: 0,
        })
    }

    /// Bucket index for `price`
    pub fn index_of(&self, price: Decimal) -> Result<usize, BookError> {
        if price < self.min_price || price >= self.max_price {
            return Err(BookError::PriceOutOfRange {
                price,
                min: self.min_price,
                max: self.max_price,
            });
        }

        let offset = price - self.min_price;
        if !(offset % self.tick_size).is_zero() {
            return Err(BookError::OffTickPrice {
                price,
                min: self.min_price,
                tick: self.tick_size,
            });
        }

        let last = self.levels.len() - 1;
        let index = (offset / self.tick_size).to_usize().unwrap_or(last);
        Ok(index.min(last))
    }

    fn is_better(&self, candidate: usize, current: usize) -> bool {
        match self.side {
            Side::Buy => candidate > current,
            Side::Sell => candidate < current,
        }
    }

    fn next_non_empty_after(&self, from: usize) -> Option<usize> {
        match self.side {
            Side::Buy => (0..from).rev().find(|&i| !self.levels[i].is_empty()),
            Side::Sell => (from + 1..self.levels.len()).find(|&i| !self.levels[i].is_empty()),
        }
    }
}

impl PriceLadder for TickLadder {
    fn side(&self) -> Side {
        self.side
    }

    fn validate_price(&self, price: Decimal) -> Result<(), BookError> {
        self.index_of(price).map(|_| ())
    }

    fn insert(&mut self, order: Order) -> Result<(), BookError> {
        let index = self.index_of(order.price)?;
        let level = &mut self.levels[index];
        if level.is_empty() {
            self.non_empty += 1;
        }
        level.push_back(order);

        match self.best {
            Some(best) if !self.is_better(index, best) => {},
            _ => self.best = Some(index),
        }
        Ok(())
    }

    fn best_level(&self) -> Option<&PriceLevel> {
        self.best.map(|i| &self.levels[i])
    }

    fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.best.map(|i| &mut self.levels[i])
    }

    fn prune_best(&mut self) {
        let Some(best) = self.best else {
            return;
        };
        if !self.levels[best].is_empty() {
            return;
        }

        self.non_empty -= 1;
        self.best = if self.non_empty == 0 {
            None
        } else {
            self.next_non_empty_after(best)
        };
    }

    fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        let Some(best) = self.best else {
            return Box::new(std::iter::empty());
        };
        match self.side {
            Side::Buy => Box::new(
                self.levels[..=best]
                    .iter()
                    .rev()
                    .filter(|level| !level.is_empty()),
            ),
            Side::Sell => Box::new(self.levels[best..].iter().filter(|level| !level.is_empty())),
        }
    }

    fn level_count(&self) -> usize {
        self.non_empty
    }

    fn name(&self) -> &str {
        "tick"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn tick_ladder(side: Side) -> TickLadder {
        TickLadder::new(side, Decimal::from(90), Decimal::from(110), px(1)).unwrap()
    }

    fn fill_best(ladder: &mut dyn PriceLadder, quantity: u64) {
        if let Some(level) = ladder.best_level_mut() {
            level.fill_front(quantity);
        }
        ladder.prune_best();
    }

    #[test]
    fn test_tree_ladder_orders_bids_descending() {
        let mut bids = TreeLadder::new(Side::Buy);
        bids.insert(Order::limit(1, Side::Buy, px(10_000), 1)).unwrap();
        bids.insert(Order::limit(2, Side::Buy, px(10_050), 1)).unwrap();
        bids.insert(Order::limit(3, Side::Buy, px(9_950), 1)).unwrap();

        assert_eq!(bids.best_price(), Some(px(10_050)));
        let prices: Vec<_> = bids.levels().map(|l| l.price).collect();
        assert_eq!(prices, vec![px(10_050), px(10_000), px(9_950)]);
    }

    #[test]
    fn test_tree_ladder_orders_asks_ascending() {
        let mut asks = TreeLadder::new(Side::Sell);
        asks.insert(Order::limit(1, Side::Sell, px(10_100), 1)).unwrap();
        asks.insert(Order::limit(2, Side::Sell, px(10_000), 1)).unwrap();

        assert_eq!(asks.best_price(), Some(px(10_000)));
        assert_eq!(asks.depth(5), vec![(px(10_000), 1), (px(10_100), 1)]);
    }

    #[test]
    fn test_tree_ladder_one_level_per_price() {
        let mut asks = TreeLadder::new(Side::Sell);
        asks.insert(Order::limit(1, Side::Sell, Decimal::from(100), 4)).unwrap();
        // Same value at a different scale lands on the same level
        asks.insert(Order::limit(2, Side::Sell, px(10_000), 6)).unwrap();

        assert_eq!(asks.level_count(), 1);
        assert_eq!(asks.order_count(), 2);
        assert_eq!(asks.depth(1), vec![(Decimal::from(100), 10)]);
    }

    #[test]
    fn test_tree_ladder_prunes_drained_level() {
        let mut asks = TreeLadder::new(Side::Sell);
        asks.insert(Order::limit(1, Side::Sell, px(10_000), 5)).unwrap();
        asks.insert(Order::limit(2, Side::Sell, px(10_100), 5)).unwrap();

        fill_best(&mut asks, 5);
        assert_eq!(asks.level_count(), 1);
        assert_eq!(asks.best_price(), Some(px(10_100)));

        fill_best(&mut asks, 5);
        assert!(asks.is_empty());
    }

    #[test]
    fn test_tick_ladder_rejects_out_of_range() {
        let asks = tick_ladder(Side::Sell);

        assert!(asks.validate_price(Decimal::from(90)).is_ok());
        assert!(asks.validate_price(px(10_999)).is_ok());
        assert_eq!(
            asks.validate_price(Decimal::from(110)),
            Err(BookError::PriceOutOfRange {
                price: Decimal::from(110),
                min: Decimal::from(90),
                max: Decimal::from(110),
            })
        );
        assert!(asks.validate_price(px(8_999)).is_err());
    }

    #[test]
    fn test_tick_ladder_bucket_index() {
        let asks = tick_ladder(Side::Sell);
        assert_eq!(asks.index_of(Decimal::from(90)), Ok(0));
        assert_eq!(asks.index_of(px(10_000)), Ok(1000));
        // Trailing zeros do not move a price off the grid
        assert_eq!(asks.index_of(Decimal::new(1_000_000, 4)), Ok(1000));
        assert_eq!(asks.index_of(px(10_999)), Ok(1999));
    }

    #[test]
    fn test_tick_ladder_rejects_off_grid_prices() {
        let mut asks = tick_ladder(Side::Sell);

        assert_eq!(
            asks.validate_price(Decimal::new(100_005, 3)),
            Err(BookError::OffTickPrice {
                price: Decimal::new(100_005, 3),
                min: Decimal::from(90),
                tick: px(1),
            })
        );
        assert!(asks
            .insert(Order::limit(1u64, Side::Sell, Decimal::new(100_009, 3), 1))
            .is_err());
        assert!(asks.is_empty());
        assert_eq!(asks.level_count(), 0);
    }

    #[test]
    fn test_tick_ladder_tracks_best() {
        let mut bids = tick_ladder(Side::Buy);
        bids.insert(Order::limit(1, Side::Buy, px(10_000), 3)).unwrap();
        bids.insert(Order::limit(2, Side::Buy, px(9_900), 3)).unwrap();
        bids.insert(Order::limit(3, Side::Buy, px(10_010), 3)).unwrap();

        assert_eq!(bids.best_price(), Some(px(10_010)));
        assert_eq!(bids.level_count(), 3);

        fill_best(&mut bids, 3);
        assert_eq!(bids.best_price(), Some(px(10_000)));

        fill_best(&mut bids, 3);
        assert_eq!(bids.best_price(), Some(px(9_900)));

        fill_best(&mut bids, 3);
        assert!(bids.is_empty());
        assert_eq!(bids.level_count(), 0);
    }

    #[test]
    fn test_tick_ladder_depth_matches_tree() {
        let mut tick = tick_ladder(Side::Sell);
        let mut tree = TreeLadder::new(Side::Sell);
        for (id, cents) in [(1u64, 10_020), (2, 10_000), (3, 10_020), (4, 10_500)] {
            tick.insert(Order::limit(id, Side::Sell, px(cents), 2)).unwrap();
            tree.insert(Order::limit(id, Side::Sell, px(cents), 2)).unwrap();
        }

        assert_eq!(tick.depth(10), tree.depth(10));
        assert_eq!(tick.order_count(), 4);
        assert_eq!(tick.level_count(), tree.level_count());
    }

    #[test]
    fn test_new_ladder_from_config() {
        let ladder = new_ladder(Side::Buy, &LadderConfig::Tree).unwrap();
        assert_eq!(ladder.name(), "tree");

        let ladder = new_ladder(
            Side::Sell,
            &LadderConfig::tick(Decimal::from(90), Decimal::from(110), px(1)),
        )
        .unwrap();
        assert_eq!(ladder.name(), "tick");
        assert_eq!(ladder.side(), Side::Sell);

        assert!(new_ladder(
            Side::Sell,
            &LadderConfig::tick(Decimal::from(110), Decimal::from(90), px(1)),
        )
        .is_err());
    }
}
