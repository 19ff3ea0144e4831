// ============================================================================
// Error Types
// Failure values returned across the book, configuration and logging seams
// ============================================================================

use rust_decimal::Decimal;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reasons the order book refuses an order before any matching happens.
///
/// A rejected order never touches ladder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BookError {
    #[error("order quantity must be positive")]
    ZeroQuantity,

    #[error("limit price must be positive, got {price}")]
    NonPositivePrice { price: Decimal },

    /// The discretized ladder only addresses `[min, max)`
    #[error("price {price} outside ladder range [{min}, {max})")]
    PriceOutOfRange {
        price: Decimal,
        min: Decimal,
        max: Decimal,
    },

    /// Discretized ladders only take prices on `min + k * tick`
    #[error("price {price} is not on the {tick} tick grid starting at {min}")]
    OffTickPrice {
        price: Decimal,
        min: Decimal,
        tick: Decimal,
    },
}

/// Invalid construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tick size must be positive, got {0}")]
    NonPositiveTick(Decimal),

    #[error("min price {min} must be below max price {max}")]
    EmptyPriceRange { min: Decimal, max: Decimal },

    #[error("min price must not be negative, got {0}")]
    NegativeMinPrice(Decimal),

    #[error("price range [{min}, {max}) at tick {tick} needs {levels} levels, limit is {limit}")]
    TooManyLevels {
        min: Decimal,
        max: Decimal,
        tick: Decimal,
        levels: u128,
        limit: usize,
    },

    #[error("{name} must be at least {min}, got {value}")]
    CapacityTooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },
}

/// Failure reported by a trade log collaborator. Never propagated into matching.
#[derive(Debug, Error)]
pub enum TradeLogError {
    #[error("trade log write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("trade log unavailable: {0}")]
    Unavailable(String),
}
