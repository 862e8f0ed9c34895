// ============================================================================
// Order Domain Model
// ============================================================================

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Price in minor units. `0` is the market-order sentinel.
pub type Price = u64;

/// Order volume in lots.
pub type Quantity = u64;

/// Engine-assigned order identifier, 1-based and monotonically increasing.
///
/// Ids double as the time-priority sequence: a smaller id was accepted earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn value(self) -> u64 {
        self.0
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
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// A limit (or market, when `price == 0`) order.
///
/// The record outlives its membership in the book: a cancelled or fully
/// filled order is still reachable by id for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub symbol: Arc<str>,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    filled: Quantity,
    fill_price: Price,
}

impl Order {
    pub fn new(
        id: OrderId,
        symbol: Arc<str>,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            symbol,
            side,
            price,
            quantity,
            filled: 0,
            fill_price: 0,
        }
    }

    /// Cumulative executed volume.
    pub fn filled(&self) -> Quantity {
        self.filled
    }

    /// Price of the most recent execution, `0` until the first fill.
    pub fn fill_price(&self) -> Price {
        self.fill_price
    }

    pub fn remaining(&self) -> Quantity {
        self.quantity.saturating_sub(self.filled)
    }

    pub fn is_filled(&self) -> bool {
        self.filled >= self.quantity
    }

    pub fn is_market(&self) -> bool {
        self.price == 0
    }

    /// Whether this order would execute at `price`: a bid at or above it, an
    /// ask at or below it.
    pub fn crosses(&self, price: Price) -> bool {
        match self.side {
            Side::Buy => self.price >= price,
            Side::Sell => self.price <= price,
        }
    }

    /// Executes up to `quantity` at `price`, clamped to the remaining volume.
    ///
    /// Returns the volume actually executed; `filled` accumulates across calls
    /// and never exceeds `quantity`.
    pub fn fill(&mut self, quantity: Quantity, price: Price) -> Quantity {
        let executed = quantity.min(self.remaining());
        if executed > 0 {
            self.filled += executed;
            self.fill_price = price;
        }
        executed
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No:{} {} {} {} {}",
            self.id, self.symbol, self.price, self.side, self.quantity
        )?;
        if self.filled > 0 {
            write!(f, " filled {}@{}", self.filled, self.fill_price)?;
        }
        Ok(())
    }
}
