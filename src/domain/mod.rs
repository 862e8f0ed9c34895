// ============================================================================
// Domain Models Module
// Orders, the ordered book and the values the engine reports
// ============================================================================

pub mod clearing;
pub mod config;
pub mod deal;
pub mod index;
pub mod market_state;
pub mod order;
pub mod order_book;
pub mod registry;

pub use clearing::{AuctionResult, Clearing, PriceLevel};
pub use config::EngineConfig;
pub use deal::{Deal, Fill, Fills};
pub use index::{AskPriority, BidPriority, Cursor, OrderedIndex, PriorityKey, SidePriority};
pub use market_state::{MarketState, MarketTransition};
pub use order::{Order, OrderId, Price, Quantity, Side};
pub use order_book::{BookSnapshot, OrderBook};
pub use registry::BookRegistry;
