// ============================================================================
// Price/Time Priority Continuous Matching
// Incoming orders sweep the opposite side best price first, oldest first
// ============================================================================

use crate::domain::{Fill, Fills, Order, OrderBook, Price, Quantity, Side};
use crate::interfaces::MatchingAlgorithm;

/// Price/Time priority matching of incoming orders.
///
/// Executions happen at the incoming order's limit price. An incoming market
/// order takes each resting order's own price instead.
///
/// # Example
/// ```text
/// Bids:  44000 x 50 (No 4)
///        43900 x 25 (No 9)
///
/// Incoming: Sell 10 @ 43200
/// Result: No 4 fills 10 @ 43200, then No 10 fills 10 @ 43200
/// ```
#[derive(Debug, Default)]
pub struct PriceTimePriority;

impl PriceTimePriority {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for PriceTimePriority {
    fn match_order(&self, incoming: &mut Order, book: &mut OrderBook) -> Fills {
        let mut fills = Fills::new();
        let opposite = incoming.side.opposite();

        book.first(opposite);
        while !incoming.is_filled() {
            let Some(resting) = book.get_mut(opposite) else {
                break;
            };

            if !self.prices_cross(incoming, resting) {
                break;
            }

            let price = if incoming.is_market() {
                resting.price
            } else {
                incoming.price
            };
            let volume = incoming.remaining().min(resting.remaining());

            resting.fill(volume, price);
            incoming.fill(volume, price);

            // Resting side is reported first
            fills.push(Fill::new(resting.id, resting.side, price, volume));
            fills.push(Fill::new(incoming.id, incoming.side, price, volume));

            if resting.is_filled() {
                book.remove_current(opposite);
            }
        }

        fills
    }

    fn name(&self) -> &str {
        "PriceTime"
    }
}

/// Fills resting orders on `side` that are marketable at `price`, in priority
/// order, until `volume` is exhausted.
///
/// Each order is filled at `price` for `min(remaining volume, order remaining)`.
/// Only fully filled orders leave the book; a partial fill ends the walk.
pub fn fill_resting(book: &mut OrderBook, side: Side, price: Price, volume: Quantity) -> Fills {
    let mut fills = Fills::new();
    let mut left = volume;

    book.first(side);
    while left > 0 {
        let Some(order) = book.get_mut(side) else {
            break;
        };
        if !order.crosses(price) {
            break;
        }

        let executed = order.fill(left, price);
        left -= executed;
        fills.push(Fill::new(order.id, order.side, price, executed));

        if !order.is_filled() {
            break;
        }
        book.remove_current(side);
    }

    fills
}
