// ============================================================================
// Cross Fill
// Order-by-order call auction that executes while it searches
// ============================================================================

use super::price_level_cross::{uncross, LevelSource};
use crate::domain::{Clearing, Fill, OrderBook, OrderId, Price, PriceLevel, Quantity, Side};
use crate::interfaces::ClearingAlgorithm;
use tracing::debug;

/// Level source that takes matched volume off the front of each side as the
/// search goes.
///
/// A level is summed in full from the side's first order before any of it is
/// consumed, and a side is only asked for its next level once the current
/// one is used up. Orders are removed as soon as they are fully matched; the
/// head of a partially matched level stays and `bid_taken`/`ask_taken` record
/// how much of it is spoken for.
struct ConsumingLevels<'a> {
    book: &'a mut OrderBook,
    bid_taken: Quantity,
    ask_taken: Quantity,
    executions: Vec<(OrderId, Side, Quantity)>,
}

impl<'a> ConsumingLevels<'a> {
    fn new(book: &'a mut OrderBook) -> Self {
        Self {
            book,
            bid_taken: 0,
            ask_taken: 0,
            executions: Vec::new(),
        }
    }

    fn taken(&self, side: Side) -> Quantity {
        match side {
            Side::Buy => self.bid_taken,
            Side::Sell => self.ask_taken,
        }
    }

    fn set_taken(&mut self, side: Side, taken: Quantity) {
        match side {
            Side::Buy => self.bid_taken = taken,
            Side::Sell => self.ask_taken = taken,
        }
    }

    /// Matches `volume` against the orders at the front of `side`.
    fn consume(&mut self, side: Side, volume: Quantity) {
        let mut left = volume;
        while left > 0 {
            let taken = self.taken(side);
            let Some(head) = self.book.first(side) else {
                break;
            };
            let (id, remaining) = (head.id, head.remaining());

            let take = remaining.saturating_sub(taken).min(left);
            if take > 0 {
                self.executions.push((id, side, take));
            }
            left -= take;

            if taken + take >= remaining {
                self.book.remove_current(side);
                self.set_taken(side, 0);
            } else {
                self.set_taken(side, taken + take);
            }
        }
    }
}

impl LevelSource for ConsumingLevels<'_> {
    fn next_level(&mut self, side: Side) -> Option<PriceLevel> {
        let taken = self.taken(side);
        let head = self.book.first(side)?;
        if head.price == 0 {
            return None;
        }

        let price = head.price;
        let mut volume = head.remaining().saturating_sub(taken);
        while let Some(order) = self.book.next(side) {
            if order.price != price {
                break;
            }
            volume += order.remaining();
        }
        Some(PriceLevel::new(price, volume))
    }

    fn matched(&mut self, volume: Quantity) {
        self.consume(Side::Buy, volume);
        self.consume(Side::Sell, volume);
    }
}

/// Call auction that fills and removes orders while it searches.
///
/// Walks the same price levels as [`PriceLevelCross`](super::PriceLevelCross)
/// and so produces the same clearing price, volume and residual. Every
/// matched order is filled at the final clearing price.
#[derive(Debug, Default)]
pub struct CrossFill;

impl CrossFill {
    pub fn new() -> Self {
        Self
    }
}

impl ClearingAlgorithm for CrossFill {
    fn clear(&self, book: &mut OrderBook, reference_price: Price) -> Clearing {
        let mut levels = ConsumingLevels::new(book);
        let result = uncross(&mut levels, reference_price);
        let ConsumingLevels {
            book, executions, ..
        } = levels;

        if !result.is_crossed() {
            return Clearing::price_only(result);
        }

        let price = result.price;
        let mut fills = Vec::with_capacity(executions.len());
        for (order_id, side, volume) in executions {
            if let Some(order) = book.order_mut(order_id) {
                let executed = order.fill(volume, price);
                fills.push(Fill::new(order_id, side, price, executed));
            }
        }
        debug!(price, volume = result.volume, fills = fills.len(), "auction fills applied");

        Clearing { result, fills }
    }

    fn name(&self) -> &str {
        "CrossFill"
    }

    fn is_destructive(&self) -> bool {
        true
    }
}
