// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// ============================================================================

use crate::domain::{Order, Trade};
use crate::interfaces::{MatchingAlgorithm, PriceLadder, Trades};

/// Price/Time Priority (FIFO) matching algorithm
///
/// Better prices match first; at one price, orders match in arrival order.
/// Each fill executes at the resting (maker) order's price.
///
/// # Example
/// ```text
/// Book:  Sell 10 @ 100.00 (Order A)
///        Sell 15 @ 100.50 (Order B)
///
/// Incoming: Market Buy 20
/// Result: 10 with A @ 100.00, then 10 with B @ 100.50, B keeps 5
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PriceTimePriority;

impl PriceTimePriority {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for PriceTimePriority {
    fn match_order(
        &self,
        incoming_order: &mut Order,
        opposite_side: &mut dyn PriceLadder,
    ) -> Trades {
        let mut trades = Trades::new();

        while incoming_order.quantity > 0 {
            let Some(best_level) = opposite_side.best_level_mut() else {
                break;
            };

            let Some(maker_order) = best_level.front() else {
                // Drained level left behind, drop it and look again
                opposite_side.prune_best();
                continue;
            };

            if !self.prices_cross(incoming_order, maker_order.price) {
                break;
            }

            let trade_quantity = incoming_order.quantity.min(maker_order.quantity);
            let trade = Trade::between(
                incoming_order.side,
                incoming_order.id,
                maker_order.id,
                maker_order.price,
                trade_quantity,
            );

            best_level.fill_front(trade_quantity);
            incoming_order.fill(trade_quantity);

            if best_level.is_empty() {
                opposite_side.prune_best();
            }

            trades.push(trade);
        }

        trades
    }

    fn name(&self) -> &str {
        "PriceTime"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderId, Side, TreeLadder};
    use rust_decimal::Decimal;

    fn px(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_price_time_fifo_order() {
        let algo = PriceTimePriority::new();
        let mut side = TreeLadder::new(Side::Sell);

        side.insert(Order::limit(1, Side::Sell, px(10_000), 1)).unwrap();
        side.insert(Order::limit(2, Side::Sell, px(10_000), 1)).unwrap();

        let mut buy = Order::limit(3, Side::Buy, px(10_000), 1);
        let trades = algo.match_order(&mut buy, &mut side);

        assert_eq!(trades.len(), 1);
        // Should match with the first order due to FIFO
        assert_eq!(trades[0].sell_id, OrderId::new(1));
        assert_eq!(side.best_level().and_then(|l| l.front()).map(|o| o.id), Some(OrderId::new(2)));
    }

    #[test]
    fn test_price_time_partial_fill() {
        let algo = PriceTimePriority::new();
        let mut side = TreeLadder::new(Side::Sell);
        side.insert(Order::limit(1, Side::Sell, px(10_000), 1)).unwrap();

        // Buy more than available
        let mut buy = Order::limit(2, Side::Buy, px(10_000), 2);
        let trades = algo.match_order(&mut buy, &mut side);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 1);
        assert_eq!(buy.quantity, 1);
        assert!(side.is_empty());
    }

    #[test]
    fn test_limit_stops_at_non_crossing_level() {
        let algo = PriceTimePriority::new();
        let mut side = TreeLadder::new(Side::Sell);
        side.insert(Order::limit(1, Side::Sell, px(9_900), 5)).unwrap();
        side.insert(Order::limit(2, Side::Sell, px(10_100), 5)).unwrap();

        let mut buy = Order::limit(3, Side::Buy, px(10_000), 8);
        let trades = algo.match_order(&mut buy, &mut side);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, px(9_900));
        assert_eq!(buy.quantity, 3);
        assert_eq!(side.best_price(), Some(px(10_100)));
    }

    #[test]
    fn test_market_sweeps_levels_at_maker_prices() {
        let algo = PriceTimePriority::new();
        let mut side = TreeLadder::new(Side::Sell);
        side.insert(Order::limit(1, Side::Sell, px(10_000), 10)).unwrap();
        side.insert(Order::limit(2, Side::Sell, px(10_050), 15)).unwrap();

        let mut buy = Order::market(3, Side::Buy, 20);
        let trades = algo.match_order(&mut buy, &mut side);

        let fills: Vec<_> = trades
            .iter()
            .map(|t| (t.sell_id.value(), t.price, t.quantity))
            .collect();
        assert_eq!(fills, vec![(1, px(10_000), 10), (2, px(10_050), 10)]);
        assert_eq!(buy.quantity, 0);
        assert_eq!(side.depth(1), vec![(px(10_050), 5)]);
    }

    #[test]
    fn test_sell_matches_highest_bid_first() {
        let algo = PriceTimePriority::new();
        let mut side = TreeLadder::new(Side::Buy);
        side.insert(Order::limit(1, Side::Buy, px(9_900), 5)).unwrap();
        side.insert(Order::limit(2, Side::Buy, px(10_000), 5)).unwrap();

        let mut sell = Order::limit(3, Side::Sell, px(9_900), 7);
        let trades = algo.match_order(&mut sell, &mut side);

        assert_eq!(trades.len(), 2);
        assert_eq!((trades[0].buy_id, trades[0].price), (OrderId::new(2), px(10_000)));
        assert_eq!((trades[1].buy_id, trades[1].price), (OrderId::new(1), px(9_900)));
        assert_eq!(trades[1].sell_id, OrderId::new(3));
        assert_eq!(side.order_count(), 1);
    }

    #[test]
    fn test_empty_ladder_produces_nothing() {
        let algo = PriceTimePriority::new();
        let mut side = TreeLadder::new(Side::Buy);
        let mut sell = Order::market(1, Side::Sell, 5);

        assert!(algo.match_order(&mut sell, &mut side).is_empty());
        assert_eq!(sell.quantity, 5);
    }
}
