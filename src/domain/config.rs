// ============================================================================
// Engine Configuration
// ============================================================================

use super::MarketState;
use crate::error::{ExchangeError, ExchangeResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default order-id capacity.
pub const DEFAULT_MAX_ORDERS: u64 = 1 << 24;

/// Default number of fills reported at info level.
pub const DEFAULT_FILL_LOG_LIMIT: usize = 10;

/// Configuration for a matching engine instance
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Number of order ids the engine will issue before rejecting orders
    pub max_orders: u64,

    /// Fills beyond this count are logged at trace level only
    pub fill_log_limit: usize,

    /// Market state the engine starts in
    pub initial_state: MarketState,
}

impl EngineConfig {
    pub fn new(max_orders: u64) -> Self {
        Self {
            max_orders,
            ..Self::default()
        }
    }

    /// Builder method: Set order-id capacity
    pub fn with_max_orders(mut self, max_orders: u64) -> Self {
        self.max_orders = max_orders;
        self
    }

    /// Builder method: Set how many fills are logged at info level
    pub fn with_fill_log_limit(mut self, limit: usize) -> Self {
        self.fill_log_limit = limit;
        self
    }

    /// Builder method: Set the starting market state
    pub fn with_initial_state(mut self, state: MarketState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        if self.max_orders == 0 {
            return Err(ExchangeError::InvalidConfig(
                "max_orders must be positive".to_string(),
            ));
        }

        if self.initial_state == MarketState::Stopped {
            return Err(ExchangeError::InvalidConfig(
                "engine cannot start stopped".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_orders: DEFAULT_MAX_ORDERS,
            fill_log_limit: DEFAULT_FILL_LOG_LIMIT,
            initial_state: MarketState::PreAuction,
        }
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl EngineConfig {
    /// Collect orders for an opening call auction
    pub fn auction_session() -> Self {
        Self::default()
    }

    /// Skip the auction and match every incoming order on arrival
    pub fn continuous_session() -> Self {
        Self::default().with_initial_state(MarketState::Trading)
    }
}
