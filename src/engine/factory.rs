// ============================================================================
// Engine Factory
// Creates matching engines with validated configuration
// ============================================================================

use crate::domain::{EngineConfig, MarketState};
use crate::engine::{MatchingEngine, PriceTimePriority};
use crate::error::ExchangeResult;
use crate::interfaces::{EventHandler, MatchingAlgorithm};
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a matching engine from configuration
///
/// # Example
/// ```
/// use auction_engine::prelude::*;
/// use std::sync::Arc;
///
/// let config = EngineConfig::auction_session();
/// let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.state(), MarketState::PreAuction);
/// ```
pub fn create_from_config(
    config: EngineConfig,
    event_handler: Arc<dyn EventHandler>,
) -> ExchangeResult<MatchingEngine> {
    config.validate()?;
    Ok(MatchingEngine::new(config, event_handler))
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use auction_engine::prelude::*;
/// use std::sync::Arc;
///
/// let engine = MatchingEngineBuilder::new()
///     .with_max_orders(1024)
///     .continuous_session()
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(engine.state(), MarketState::Trading);
/// ```
pub struct MatchingEngineBuilder {
    config: EngineConfig,
    algorithm: Option<Box<dyn MatchingAlgorithm>>,
}

impl MatchingEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            algorithm: None,
        }
    }

    pub fn with_max_orders(mut self, max_orders: u64) -> Self {
        self.config.max_orders = max_orders;
        self
    }

    pub fn with_fill_log_limit(mut self, limit: usize) -> Self {
        self.config.fill_log_limit = limit;
        self
    }

    pub fn with_initial_state(mut self, state: MarketState) -> Self {
        self.config.initial_state = state;
        self
    }

    /// Start with continuous trading open, skipping the opening auction
    pub fn continuous_session(self) -> Self {
        self.with_initial_state(MarketState::Trading)
    }

    /// Replace price/time priority for continuous matching
    pub fn matching_algorithm(mut self, algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Build the matching engine
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> ExchangeResult<MatchingEngine> {
        self.config.validate()?;
        let algorithm = self
            .algorithm
            .unwrap_or_else(|| Box::new(PriceTimePriority::new()));
        Ok(MatchingEngine::with_algorithm(self.config, algorithm, event_handler))
    }

    /// Get the configuration without building (for inspection)
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for MatchingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
