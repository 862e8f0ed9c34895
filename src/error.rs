// ============================================================================
// Error Types
// ============================================================================

use crate::domain::{MarketState, OrderId, Quantity, Side};
use thiserror::Error;

/// Errors returned by the engine's order and state operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Order id was never issued
    #[error("no such order: {0}")]
    NoSuchOrder(u64),

    #[error("no order book for symbol {0}")]
    NoOrderBook(String),

    /// Operation not permitted in the current market state
    #[error("operation not permitted while market is {0}")]
    WrongState(MarketState),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Consistency violations reported by `verify_order_book`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("no order book for symbol {0}")]
    NoOrderBook(String),

    #[error("{side} order {order_id} is out of price order")]
    PriceDisorder { side: Side, order_id: OrderId },

    #[error("{side} order {order_id} is out of time order within its price level")]
    SequenceDisorder { side: Side, order_id: OrderId },

    #[error("order {order_id} resting with filled {filled} of quantity {quantity}")]
    BadFillVolume {
        order_id: OrderId,
        filled: Quantity,
        quantity: Quantity,
    },
}

/// Convenience type alias for engine results
pub type ExchangeResult<T> = Result<T, ExchangeError>;
