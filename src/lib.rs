// ============================================================================
// Auction Engine Library
// Order books with opening call auction and continuous price/time matching
// ============================================================================

//! # Auction Engine
//!
//! An order matching engine for exchange-style markets. Orders gathered
//! before the open are crossed by a call auction at the single price that
//! maximises executed volume; afterwards every incoming order is matched
//! against the book on arrival.
//!
//! ## Features
//!
//! - **Skip-list order index** keyed by price and arrival order, with a
//!   cursor per side that survives removal of the order it points at
//! - **Call auction** clearing price, volume and residual with a reference
//!   price tie-break, in a read-only and an executing variant
//! - **Continuous matching** with price/time priority
//! - **Market phases** gating order entry, cancels and auctions
//! - **Event stream** and deal log for audit
//!
//! ## Example
//!
//! ```rust
//! use auction_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let mut engine = MatchingEngine::new(EngineConfig::default(), Arc::new(NoOpEventHandler));
//!
//! engine.send_order("cu1906", Side::Buy, 50, 44000);
//! engine.send_order("cu1906", Side::Sell, 45, 43500);
//!
//! let result = engine.call_auction("cu1906", 40000);
//! assert_eq!(result.as_tuple(), (43500, 45, 5));
//!
//! engine.market_start().unwrap();
//! let id = engine.send_order("cu1906", Side::Sell, 5, 43000).unwrap();
//! assert!(engine.order(id).unwrap().is_filled());
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        AuctionResult, BookSnapshot, Clearing, Deal, EngineConfig, Fill, Fills, MarketState,
        Order, OrderBook, OrderId, Price, Quantity, Side,
    };
    pub use crate::engine::{
        create_from_config, fill_resting, CrossFill, MatchingEngine, MatchingEngineBuilder,
        PriceLevelCross, PriceTimePriority,
    };
    pub use crate::error::{ExchangeError, ExchangeResult, VerifyError};
    pub use crate::interfaces::{
        ClearingAlgorithm, EventHandler, ExchangeEvent, LoggingEventHandler, MatchingAlgorithm,
        NoOpEventHandler, RecordingEventHandler,
    };
}
