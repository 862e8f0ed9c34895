// ============================================================================
// Deal Domain Model
// ============================================================================

use super::{OrderId, Price, Quantity, Side};
use chrono::{DateTime, Utc};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One side of an execution, produced by the matching algorithms before the
/// engine numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fill {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub volume: Quantity,
}

impl Fill {
    pub fn new(order_id: OrderId, side: Side, price: Price, volume: Quantity) -> Self {
        Self {
            order_id,
            side,
            price,
            volume,
        }
    }
}

/// Fills of a single matching call. Most incoming orders touch few resting orders.
pub type Fills = SmallVec<[Fill; 4]>;

/// A numbered entry of the engine's deal log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deal {
    /// 1-based, engine-wide sequence number
    pub no: u64,

    pub order_id: OrderId,

    pub side: Side,

    /// Execution price
    pub price: Price,

    /// Executed volume
    pub volume: Quantity,

    pub timestamp: DateTime<Utc>,
}

impl Deal {
    pub fn new(no: u64, fill: Fill) -> Self {
        Self {
            no,
            order_id: fill.order_id,
            side: fill.side,
            price: fill.price,
            volume: fill.volume,
            timestamp: Utc::now(),
        }
    }
}
