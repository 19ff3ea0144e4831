// ============================================================================
// Order Book Domain Model
// ============================================================================

use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::Order;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Price Level
// ============================================================================

/// FIFO of resting orders at one price (or one tick bucket).
///
/// Orders are owned by value; the front is the oldest and matches first.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    pub price: Decimal,
    orders: VecDeque<Order>,
    /// Sum of remaining quantity across `orders`; wider than one order's
    /// quantity so many large orders at one price cannot overflow it
    total_quantity: u128,
}

impl PriceLevel {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: 0,
        }
    }

    /// Append to the tail (newest, lowest time priority)
    pub fn push_back(&mut self, order: Order) {
        self.total_quantity += u128::from(order.quantity);
        self.orders.push_back(order);
    }

    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Fill the front order by `quantity`, popping it once it reaches zero.
    ///
    /// Returns the popped order when it was fully filled.
    pub fn fill_front(&mut self, quantity: u64) -> Option<Order> {
        let front = self.orders.front_mut()?;
        let quantity = quantity.min(front.quantity);
        front.fill(quantity);
        self.total_quantity -= u128::from(quantity);

        if front.is_filled() {
            self.orders.pop_front()
        } else {
            None
        }
    }

    pub fn total_quantity(&self) -> u128 {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable depth view of the book, best levels first
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    /// Bid levels (price, quantity), highest first
    pub bids: Vec<(Decimal, u128)>,
    /// Ask levels (price, quantity), lowest first
    pub asks: Vec<(Decimal, u128)>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    pub mid_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    pub fn with_depth(bids: Vec<(Decimal, u128)>, asks: Vec<(Decimal, u128)>) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => {
                (Some(ask - bid), Some((bid + ask) / Decimal::TWO))
            },
            _ => (None, None),
        };

        Self {
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_quantity(&self) -> u128 {
        total_of(&self.bids)
    }

    pub fn total_ask_quantity(&self) -> u128 {
        total_of(&self.asks)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn total_of(levels: &[(Decimal, u128)]) -> u128 {
    levels
        .iter()
        .fold(0u128, |total, (_, qty)| total.saturating_add(*qty))
}
