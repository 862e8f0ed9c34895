// ============================================================================
// Engine Module
// Contains the matching engine, continuous matching and auction clearing
// ============================================================================

mod cross_fill;
mod matching_engine;
mod price_level_cross;
mod price_time;

pub mod factory;

#[cfg(test)]
pub(crate) mod oracle;

pub use cross_fill::CrossFill;
pub use factory::{create_from_config, MatchingEngineBuilder};
pub use matching_engine::MatchingEngine;
pub use price_level_cross::PriceLevelCross;
pub use price_time::{fill_resting, PriceTimePriority};
