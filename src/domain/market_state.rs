// ============================================================================
// Market State Machine
// ============================================================================

use crate::error::{ExchangeError, ExchangeResult};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trading phase of the engine. Progresses one way only:
/// `PreAuction -> CallAuction -> Trading -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarketState {
    /// Collecting orders, nothing executes
    #[default]
    PreAuction,
    /// Order book frozen while the clearing price is computed
    CallAuction,
    /// Continuous matching of incoming orders
    Trading,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTransition {
    OpenCallAuction,
    StartTrading,
    Stop,
}

impl MarketState {
    pub fn transition(&self, transition: MarketTransition) -> ExchangeResult<MarketState> {
        match (self, transition) {
            (MarketState::PreAuction, MarketTransition::OpenCallAuction) => {
                Ok(MarketState::CallAuction)
            },

            (MarketState::PreAuction, MarketTransition::StartTrading)
            | (MarketState::CallAuction, MarketTransition::StartTrading) => Ok(MarketState::Trading),

            (MarketState::PreAuction, MarketTransition::Stop)
            | (MarketState::CallAuction, MarketTransition::Stop)
            | (MarketState::Trading, MarketTransition::Stop) => Ok(MarketState::Stopped),

            _ => Err(ExchangeError::WrongState(*self)),
        }
    }

    pub fn accepts_orders(&self) -> bool {
        matches!(self, MarketState::PreAuction | MarketState::Trading)
    }

    /// Cancels are refused only while the auction is being computed.
    pub fn accepts_cancels(&self) -> bool {
        !matches!(self, MarketState::CallAuction)
    }

    pub fn matches_continuously(&self) -> bool {
        matches!(self, MarketState::Trading)
    }

    pub fn permits_auction(&self) -> bool {
        matches!(self, MarketState::PreAuction | MarketState::CallAuction)
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketState::PreAuction => "pre-auction",
            MarketState::CallAuction => "call-auction",
            MarketState::Trading => "trading",
            MarketState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
