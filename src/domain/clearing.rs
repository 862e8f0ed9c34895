// ============================================================================
// Clearing Results
// ============================================================================

use super::{Fill, Price, Quantity};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a call auction: `(clearing price, matched volume, residual)`.
///
/// The all-zero value means no cross was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuctionResult {
    pub price: Price,
    pub volume: Quantity,
    /// Unmatched volume left on the heavier side at the clearing price
    pub residual: Quantity,
}

impl AuctionResult {
    pub const NONE: AuctionResult = AuctionResult {
        price: 0,
        volume: 0,
        residual: 0,
    };

    pub fn new(price: Price, volume: Quantity, residual: Quantity) -> Self {
        Self {
            price,
            volume,
            residual,
        }
    }

    pub fn is_crossed(&self) -> bool {
        self.volume > 0
    }

    pub fn as_tuple(&self) -> (Price, Quantity, Quantity) {
        (self.price, self.volume, self.residual)
    }
}

impl From<AuctionResult> for (Price, Quantity, Quantity) {
    fn from(result: AuctionResult) -> Self {
        result.as_tuple()
    }
}

impl fmt::Display for AuctionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "price {} volume {} residual {}",
            self.price, self.volume, self.residual
        )
    }
}

/// Aggregated remaining volume of consecutive same-price orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Price,
    pub volume: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price, volume: Quantity) -> Self {
        Self { price, volume }
    }
}

/// What a clearing algorithm hands back to the engine.
///
/// Read-only algorithms leave `fills` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clearing {
    pub result: AuctionResult,
    pub fills: Vec<Fill>,
}

impl Clearing {
    pub fn price_only(result: AuctionResult) -> Self {
        Self {
            result,
            fills: Vec::new(),
        }
    }
}
