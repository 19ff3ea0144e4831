// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Caller-assigned order identifier. Uniqueness is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    /// Matches while the opposite best price crosses, rests the remainder
    Limit,
    /// Sweeps the opposite side at any price, drops the remainder
    Market,
}

// ============================================================================
// Execution Status
// ============================================================================

/// Terminal outcome of one submission: `submitted -> {accepted | partially_filled | filled}`.
///
/// `Rejected` is only produced by validation failures (zero quantity,
/// bad limit price, price outside a discretized ladder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionStatus {
    Accepted,
    PartiallyFilled,
    Filled,
    Rejected,
}

impl ExecutionStatus {
    /// Classify a processed order from its trade count and remaining quantity.
    pub fn classify(trade_count: usize, remaining_quantity: u64) -> Self {
        match (trade_count, remaining_quantity) {
            (0, _) => ExecutionStatus::Accepted,
            (_, 0) => ExecutionStatus::Filled,
            _ => ExecutionStatus::PartiallyFilled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Accepted => "accepted",
            ExecutionStatus::PartiallyFilled => "partially_filled",
            ExecutionStatus::Filled => "filled",
            ExecutionStatus::Rejected => "rejected",
        }
    }

}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// An order as it travels producer -> queue slot -> price level.
///
/// Plain value: the book owns resting orders directly inside their level,
/// and `quantity` is decremented in place as fills happen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    /// Ignored for market orders
    pub price: Decimal,
    /// Remaining quantity
    pub quantity: u64,
    pub original_quantity: u64,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: impl Into<OrderId>,
        side: Side,
        order_type: OrderType,
        price: Decimal,
        quantity: u64,
    ) -> Self {
        Self {
            id: id.into(),
            side,
            order_type,
            price,
            quantity,
            original_quantity: quantity,
            timestamp: Utc::now(),
        }
    }

    pub fn limit(id: impl Into<OrderId>, side: Side, price: Decimal, quantity: u64) -> Self {
        Self::new(id, side, OrderType::Limit, price, quantity)
    }

    pub fn market(id: impl Into<OrderId>, side: Side, quantity: u64) -> Self {
        Self::new(id, side, OrderType::Market, Decimal::ZERO, quantity)
    }

    pub fn filled_quantity(&self) -> u64 {
        self.original_quantity - self.quantity
    }

    pub fn is_filled(&self) -> bool {
        self.quantity == 0
    }

    /// Reduce remaining quantity by `quantity`.
    ///
    /// Callers size fills with `min(taker, maker)`, so this never underflows
    /// on the matching path; a larger request saturates at zero.
    pub fn fill(&mut self, quantity: u64) {
        debug_assert!(quantity <= self.quantity, "fill exceeds remaining");
        self.quantity = self.quantity.saturating_sub(quantity);
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.order_type, OrderType::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.order_type, OrderType::Limit)
    }
}
