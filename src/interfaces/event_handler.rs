// ============================================================================
// Event Handler Interface
// Defines the contract for handling order, deal and market events
// ============================================================================

use crate::domain::{AuctionResult, Deal, MarketState, OrderId, Price, Quantity, Side};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExchangeEvent {
    /// Order accepted and assigned an id
    OrderAccepted {
        order_id: OrderId,
        symbol: String,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order refused before an id was assigned
    OrderRejected {
        symbol: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Order (or its unfilled remainder) added to the book
    OrderRested {
        order_id: OrderId,
        price: Price,
        remaining: Quantity,
        timestamp: DateTime<Utc>,
    },

    OrderCancelled {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Execution recorded in the deal log
    DealReported {
        deal: Deal,
        timestamp: DateTime<Utc>,
    },

    /// Call auction computed a clearing price
    AuctionCleared {
        symbol: String,
        result: AuctionResult,
        timestamp: DateTime<Utc>,
    },

    MarketStateChanged {
        from: MarketState,
        to: MarketState,
        timestamp: DateTime<Utc>,
    },

    /// Order book destroyed by an explicit cleanup
    BookTornDown {
        symbol: String,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, auditing, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an engine event
    fn on_event(&self, event: ExchangeEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<ExchangeEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: ExchangeEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: ExchangeEvent) {
        tracing::debug!(?event, "engine event");
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<ExchangeEvent>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExchangeEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventHandler for RecordingEventHandler {
    fn on_event(&self, event: ExchangeEvent) {
        self.events.lock().push(event);
    }

    fn on_events(&self, events: Vec<ExchangeEvent>) {
        self.events.lock().extend(events);
    }
}
