// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

use super::{OrderId, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fill between an incoming (taker) order and a resting (maker) order.
///
/// Immutable once produced; the book appends it to its trade log and never
/// touches it again.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    pub buy_id: OrderId,
    pub sell_id: OrderId,

    /// Maker's price (the taker gets any price improvement)
    pub price: Decimal,

    pub quantity: u64,

    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(buy_id: OrderId, sell_id: OrderId, price: Decimal, quantity: u64) -> Self {
        Self {
            buy_id,
            sell_id,
            price,
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// Build a trade from the taker's point of view.
    pub fn between(
        taker_side: Side,
        taker_id: OrderId,
        maker_id: OrderId,
        maker_price: Decimal,
        quantity: u64,
    ) -> Self {
        match taker_side {
            Side::Buy => Self::new(taker_id, maker_id, maker_price, quantity),
            Side::Sell => Self::new(maker_id, taker_id, maker_price, quantity),
        }
    }
}

/// Trade log record: `TRADE {buy}->{sell} qty={qty} price={price}`
impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRADE {}->{} qty={} price={}",
            self.buy_id, self.sell_id, self.quantity, self.price
        )
    }
}
