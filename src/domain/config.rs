// ============================================================================
// Order Book Configuration
// Ladder representation, pipeline sizing and their validation
// ============================================================================

use crate::error::ConfigError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on buckets a discretized ladder may allocate per side
pub const MAX_TICK_LEVELS: usize = 1 << 22;

// ============================================================================
// Ladder Configuration
// ============================================================================

/// How each side of the book stores its price levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LadderConfig {
    /// Ordered map keyed by exact price
    /// - Any positive price is addressable
    /// - O(log n) best-level lookup
    Tree,

    /// Fixed array of tick-wide buckets over `[min_price, max_price)`
    /// - Prices outside the range are rejected
    /// - O(1) amortized best-level lookup on a liquid book
    /// - Prices off the `min + k * tick` grid are rejected
    Tick {
        min_price: Decimal,
        max_price: Decimal,
        tick_size: Decimal,
    },
}

impl LadderConfig {
    pub fn tick(min_price: Decimal, max_price: Decimal, tick_size: Decimal) -> Self {
        LadderConfig::Tick {
            min_price,
            max_price,
            tick_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            LadderConfig::Tree => Ok(()),
            LadderConfig::Tick {
                min_price,
                max_price,
                tick_size,
            } => tick_level_count(min_price, max_price, tick_size).map(|_| ()),
        }
    }
}

/// Number of buckets needed to cover `[min_price, max_price)` at `tick_size`.
pub fn tick_level_count(
    min_price: Decimal,
    max_price: Decimal,
    tick_size: Decimal,
) -> Result<usize, ConfigError> {
    if tick_size <= Decimal::ZERO {
        return Err(ConfigError::NonPositiveTick(tick_size));
    }
    if min_price < Decimal::ZERO {
        return Err(ConfigError::NegativeMinPrice(min_price));
    }
    if min_price >= max_price {
        return Err(ConfigError::EmptyPriceRange {
            min: min_price,
            max: max_price,
        });
    }

    let too_many = |levels: u128| ConfigError::TooManyLevels {
        min: min_price,
        max: max_price,
        tick: tick_size,
        levels,
        limit: MAX_TICK_LEVELS,
    };

    let levels = (max_price - min_price)
        .checked_div(tick_size)
        .map(|span| span.ceil())
        .and_then(|span| span.to_u128())
        .ok_or_else(|| too_many(u128::MAX))?;

    match usize::try_from(levels) {
        Ok(count) if count <= MAX_TICK_LEVELS => Ok(count),
        _ => Err(too_many(levels)),
    }
}

// ============================================================================
// Complete Order Book Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookConfig {
    /// Instrument label, used in log fields only
    pub instrument: String,

    pub ladder: LadderConfig,
}

impl OrderBookConfig {
    pub fn new(instrument: impl Into<String>, ladder: LadderConfig) -> Self {
        Self {
            instrument: instrument.into(),
            ladder,
        }
    }

    /// Builder method: switch to the unbounded ordered-map ladder
    pub fn with_tree_ladder(mut self) -> Self {
        self.ladder = LadderConfig::Tree;
        self
    }

    /// Builder method: switch to a discretized ladder
    pub fn with_tick_ladder(
        mut self,
        min_price: Decimal,
        max_price: Decimal,
        tick_size: Decimal,
    ) -> Self {
        self.ladder = LadderConfig::tick(min_price, max_price, tick_size);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ladder.validate()
    }
}

impl Default for OrderBookConfig {
    fn default() -> Self {
        Self::new("DEFAULT", LadderConfig::Tree)
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl OrderBookConfig {
    /// Unbounded price range, exact price levels
    pub fn unbounded(instrument: impl Into<String>) -> Self {
        Self::new(instrument, LadderConfig::Tree)
    }

    /// Cent-tick band over `[min_price, max_price)`
    /// - Tick size: 0.01
    pub fn cents_band(
        instrument: impl Into<String>,
        min_price: Decimal,
        max_price: Decimal,
    ) -> Self {
        Self::new(
            instrument,
            LadderConfig::tick(min_price, max_price, Decimal::new(1, 2)),
        )
    }
}

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// Sizing for a producer/consumer pipeline around one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Ring buffer slots
    pub queue_capacity: usize,

    /// Maximum orders drained per consumer wake-up
    pub batch_size: usize,

    /// Core to pin the consumer thread to (feature `numa`)
    pub pin_core: Option<usize>,
}

impl PipelineConfig {
    pub fn new(queue_capacity: usize, batch_size: usize) -> Self {
        Self {
            queue_capacity,
            batch_size,
            pin_core: None,
        }
    }

    pub fn with_pinned_core(mut self, core: usize) -> Self {
        self.pin_core = Some(core);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // The multi-producer ring cannot tell full from empty with one slot
        if self.queue_capacity < 2 {
            return Err(ConfigError::CapacityTooSmall {
                name: "queue_capacity",
                min: 2,
                value: self.queue_capacity,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::CapacityTooSmall {
                name: "batch_size",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(1024, 64)
    }
}
