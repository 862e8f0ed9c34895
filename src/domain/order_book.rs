// ============================================================================
// Order Book
// Two priority-ordered sides plus the order records they point at
// ============================================================================

use super::index::{AskPriority, BidPriority, Cursor, OrderedIndex, PriorityKey, SidePriority};
use super::{Order, OrderId, Price, Quantity, Side};
use crate::error::VerifyError;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Book Side
// ============================================================================

/// One side's index together with its scan cursor.
///
/// The cursor is created on the first `first()` call; before that `next` and
/// `get` report nothing.
struct BookSide<P: SidePriority> {
    index: OrderedIndex<P>,
    cursor: Option<Cursor<P>>,
}

impl<P: SidePriority> BookSide<P> {
    fn new() -> Self {
        Self {
            index: OrderedIndex::new(),
            cursor: None,
        }
    }

    fn insert(&mut self, order: &Order) -> bool {
        self.index.insert(PriorityKey::of(order))
    }

    fn remove(&mut self, order: &Order) -> bool {
        self.index.remove(&PriorityKey::of(order))
    }

    fn contains(&self, order: &Order) -> bool {
        self.index.contains(&PriorityKey::of(order))
    }

    fn first(&mut self) -> Option<OrderId> {
        let cursor = self.cursor.get_or_insert_with(Cursor::new);
        cursor.first(&self.index).map(|key| key.id())
    }

    fn next(&mut self) -> Option<OrderId> {
        let cursor = self.cursor.as_mut()?;
        cursor.next(&self.index).map(|key| key.id())
    }

    fn get(&self) -> Option<OrderId> {
        let cursor = self.cursor.as_ref()?;
        cursor.get(&self.index).map(|key| key.id())
    }

    fn remove_current(&mut self) -> Option<OrderId> {
        let cursor = self.cursor.as_mut()?;
        cursor.remove_current(&mut self.index).map(|key| key.id())
    }

    fn best_price(&self) -> Option<Price> {
        self.index.first().map(|key| key.price())
    }

    fn keys(&self) -> impl Iterator<Item = (Price, OrderId)> + '_ {
        self.index.iter().map(|key| (key.price(), key.id()))
    }

    fn clear(&mut self) {
        self.index.clear();
        self.cursor = None;
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Resting orders of one symbol.
///
/// Records are kept for every order the book has seen. Removing an order
/// takes it out of its side's index but leaves the record queryable.
///
/// Resting orders can only be changed by the engine's own algorithms, so an
/// order's price and side always match its index key:
///
/// ```compile_fail
/// use auction_engine::domain::{Order, OrderBook, OrderId, Side};
///
/// let mut book = OrderBook::new("cu1906".into());
/// book.insert(Order::new(OrderId::new(1), "cu1906".into(), Side::Buy, 100, 1));
/// if let Some(order) = book.order_mut(OrderId::new(1)) {
///     order.price = 200;
/// }
/// ```
pub struct OrderBook {
    symbol: Arc<str>,
    orders: HashMap<OrderId, Order>,
    bids: BookSide<BidPriority>,
    asks: BookSide<AskPriority>,
}

impl OrderBook {
    pub fn new(symbol: Arc<str>) -> Self {
        Self {
            symbol,
            orders: HashMap::new(),
            bids: BookSide::new(),
            asks: BookSide::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn shared_symbol(&self) -> Arc<str> {
        Arc::clone(&self.symbol)
    }

    /// Rests `order` on its side. Returns `false` if it was already resting.
    pub fn insert(&mut self, order: Order) -> bool {
        let inserted = match order.side {
            Side::Buy => self.bids.insert(&order),
            Side::Sell => self.asks.insert(&order),
        };
        self.orders.insert(order.id, order);
        inserted
    }

    /// Keeps the record of an order that never rests, such as an incoming
    /// order filled on arrival.
    pub fn archive(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    /// Takes the order out of its side. Returns `false` if it was not resting.
    pub fn remove(&mut self, id: OrderId) -> bool {
        let Some(order) = self.orders.get(&id) else {
            return false;
        };
        match order.side {
            Side::Buy => self.bids.remove(order),
            Side::Sell => self.asks.remove(order),
        }
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub(crate) fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    pub fn is_resting(&self, id: OrderId) -> bool {
        self.orders.get(&id).is_some_and(|order| match order.side {
            Side::Buy => self.bids.contains(order),
            Side::Sell => self.asks.contains(order),
        })
    }

    // ------------------------------------------------------------------------
    // Cursor scans
    // ------------------------------------------------------------------------

    /// Rewinds the side's cursor to its highest-priority order.
    pub fn first(&mut self, side: Side) -> Option<&Order> {
        let id = match side {
            Side::Buy => self.bids.first(),
            Side::Sell => self.asks.first(),
        }?;
        self.orders.get(&id)
    }

    pub fn next(&mut self, side: Side) -> Option<&Order> {
        let id = match side {
            Side::Buy => self.bids.next(),
            Side::Sell => self.asks.next(),
        }?;
        self.orders.get(&id)
    }

    /// The order under the side's cursor, if it is still resting.
    pub fn get(&self, side: Side) -> Option<&Order> {
        let id = self.current_id(side)?;
        self.orders.get(&id)
    }

    pub(crate) fn get_mut(&mut self, side: Side) -> Option<&mut Order> {
        let id = self.current_id(side)?;
        self.orders.get_mut(&id)
    }

    /// Removes the order `get(side)` returns and moves to its successor.
    pub fn remove_current(&mut self, side: Side) -> Option<&Order> {
        let id = match side {
            Side::Buy => self.bids.remove_current(),
            Side::Sell => self.asks.remove_current(),
        }?;
        self.orders.get(&id)
    }

    fn current_id(&self, side: Side) -> Option<OrderId> {
        match side {
            Side::Buy => self.bids.get(),
            Side::Sell => self.asks.get(),
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Resting order counts `(bids, asks)`.
    pub fn book_len(&self) -> (usize, usize) {
        (self.bids.index.len(), self.asks.index.len())
    }

    pub fn is_empty(&self) -> bool {
        self.bids.index.is_empty() && self.asks.index.is_empty()
    }

    /// Number of order records, resting or not.
    pub fn record_count(&self) -> usize {
        self.orders.len()
    }

    /// Price of the highest-priority resting order. Does not move the cursor.
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.best_price(),
            Side::Sell => self.asks.best_price(),
        }
    }

    /// Resting orders of one side in priority order, independent of the
    /// side's cursor.
    pub fn orders(&self, side: Side) -> Box<dyn Iterator<Item = &Order> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.keys().filter_map(|(_, id)| self.orders.get(&id))),
            Side::Sell => Box::new(self.asks.keys().filter_map(|(_, id)| self.orders.get(&id))),
        }
    }

    /// Remaining volume aggregated by price for the first `num_levels` levels.
    pub fn depth(&self, side: Side, num_levels: usize) -> Vec<(Price, Quantity)> {
        let mut levels: Vec<(Price, Quantity)> = Vec::with_capacity(num_levels);
        for order in self.orders(side) {
            if let Some((price, volume)) = levels.last_mut() {
                if *price == order.price {
                    *volume += order.remaining();
                    continue;
                }
            }
            if levels.len() == num_levels {
                break;
            }
            levels.push((order.price, order.remaining()));
        }
        levels
    }

    pub fn snapshot(&self, num_levels: usize) -> BookSnapshot {
        BookSnapshot::with_depth(
            self.symbol.to_string(),
            self.depth(Side::Buy, num_levels),
            self.depth(Side::Sell, num_levels),
        )
    }

    /// Checks side ordering and fill bookkeeping of every resting order.
    pub fn verify(&self) -> Result<(), VerifyError> {
        check_side_order(Side::Buy, self.bids.keys())?;
        check_side_order(Side::Sell, self.asks.keys())?;

        for order in self.orders(Side::Buy).chain(self.orders(Side::Sell)) {
            if order.filled() > order.quantity || order.is_filled() {
                return Err(VerifyError::BadFillVolume {
                    order_id: order.id,
                    filled: order.filled(),
                    quantity: order.quantity,
                });
            }
        }
        Ok(())
    }

    /// Drops every resting order and record.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
    }
}

/// Bids must be non-increasing in price (a zero price may only trail), asks
/// non-decreasing, and equal prices must be in ascending id order.
fn check_side_order(
    side: Side,
    keys: impl IntoIterator<Item = (Price, OrderId)>,
) -> Result<(), VerifyError> {
    let mut previous: Option<(Price, OrderId)> = None;
    for (price, order_id) in keys {
        if let Some((prev_price, prev_id)) = previous {
            let out_of_order = match side {
                Side::Buy => price > prev_price,
                Side::Sell => price < prev_price,
            };
            if out_of_order {
                return Err(VerifyError::PriceDisorder { side, order_id });
            }
            if price == prev_price && order_id < prev_id {
                return Err(VerifyError::SequenceDisorder { side, order_id });
            }
        }
        previous = Some((price, order_id));
    }
    Ok(())
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable snapshot of aggregated price levels
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookSnapshot {
    pub symbol: String,
    /// Bid levels (price, remaining volume)
    pub bids: Vec<(Price, Quantity)>,
    /// Ask levels (price, remaining volume)
    pub asks: Vec<(Price, Quantity)>,
    /// Best ask minus best bid, `None` when one side is empty or the book is crossed
    pub spread: Option<Price>,
}

impl BookSnapshot {
    pub fn with_depth(
        symbol: String,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
    ) -> Self {
        let spread = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => ask.checked_sub(*bid),
            _ => None,
        };

        Self {
            symbol,
            bids,
            asks,
            spread,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    /// Best bid at or above best ask.
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid > 0 && bid >= ask)
    }

    pub fn total_bid_quantity(&self) -> Quantity {
        self.bids.iter().map(|(_, qty)| qty).sum()
    }

    pub fn total_ask_quantity(&self) -> Quantity {
        self.asks.iter().map(|(_, qty)| qty).sum()
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
