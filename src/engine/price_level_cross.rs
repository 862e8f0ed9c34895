// ============================================================================
// Price-Level Cross
// Call-auction clearing price search over aggregated price levels
// ============================================================================

use crate::domain::{AuctionResult, Clearing, OrderBook, Price, PriceLevel, Quantity, Side};
use crate::interfaces::ClearingAlgorithm;
use std::cmp::Ordering;
use tracing::debug;

/// Supplies the price levels of each side in priority order.
pub(crate) trait LevelSource {
    /// Next level of `side`, or `None` once the side is exhausted or reaches
    /// a zero (market) price.
    fn next_level(&mut self, side: Side) -> Option<PriceLevel>;

    /// Called once per step with the volume the step matched on both sides,
    /// before any exhausted level is replaced.
    fn matched(&mut self, _volume: Quantity) {}
}

/// Reads levels straight off the book's side cursors.
pub(crate) struct BookLevels<'a> {
    book: &'a mut OrderBook,
}

impl<'a> BookLevels<'a> {
    /// Rewinds both cursors.
    pub(crate) fn new(book: &'a mut OrderBook) -> Self {
        book.first(Side::Buy);
        book.first(Side::Sell);
        Self { book }
    }
}

impl LevelSource for BookLevels<'_> {
    /// Sums consecutive same-price orders starting at the cursor and leaves
    /// the cursor on the first order of the following level.
    fn next_level(&mut self, side: Side) -> Option<PriceLevel> {
        let head = self.book.get(side)?;
        if head.price == 0 {
            return None;
        }

        let price = head.price;
        let mut volume = head.remaining();
        while let Some(order) = self.book.next(side) {
            if order.price != price {
                break;
            }
            volume += order.remaining();
        }
        Some(PriceLevel::new(price, volume))
    }
}

/// Settles a price band against the reference price: the reference itself if
/// it lies within `[low, high]`, otherwise the nearer bound.
fn settle_against_reference(low: Price, high: Price, reference_price: Price) -> Price {
    if low > reference_price {
        low
    } else if high < reference_price {
        high
    } else {
        reference_price
    }
}

/// Prices a cross that ended on an exact volume match while the next bid and
/// ask levels are both in range but no longer cross each other.
///
/// Any price above the next bid and below the next ask executes the same
/// volume with nothing left over. When those levels are one tick apart there
/// is no such price; the trade then happens at the lighter of the two levels,
/// whose volume becomes the residual.
fn settle_gap(
    last_bid: Price,
    last_ask: Price,
    next_bid: PriceLevel,
    next_ask: PriceLevel,
    reference_price: Price,
) -> (Price, Quantity) {
    let low = last_ask.max(next_bid.price + 1);
    let high = last_bid.min(next_ask.price - 1);
    if low <= high {
        return (settle_against_reference(low, high, reference_price), 0);
    }

    match next_bid.volume.cmp(&next_ask.volume) {
        Ordering::Less => (next_bid.price, next_bid.volume),
        Ordering::Greater => (next_ask.price, next_ask.volume),
        Ordering::Equal => (
            settle_against_reference(next_bid.price, next_ask.price, reference_price),
            next_bid.volume,
        ),
    }
}

/// Walks bid levels downwards and ask levels upwards, consuming the smaller
/// level each step, until the sides stop crossing.
pub(crate) fn uncross<S: LevelSource>(levels: &mut S, reference_price: Price) -> AuctionResult {
    let (mut bid, mut ask) = match (levels.next_level(Side::Buy), levels.next_level(Side::Sell)) {
        (Some(bid), Some(ask)) if bid.price >= ask.price => (bid, ask),
        _ => return AuctionResult::NONE,
    };
    let (best_bid, best_ask) = (bid.price, ask.price);
    let mut result = AuctionResult::NONE;

    loop {
        match bid.volume.cmp(&ask.volume) {
            Ordering::Greater => {
                levels.matched(ask.volume);
                result.volume += ask.volume;
                bid.volume -= ask.volume;
                result.residual = bid.volume;
                result.price = ask.price;
                match levels.next_level(Side::Sell) {
                    Some(next) => ask = next,
                    None => break,
                }
            },
            Ordering::Less => {
                levels.matched(bid.volume);
                result.volume += bid.volume;
                ask.volume -= bid.volume;
                result.residual = ask.volume;
                result.price = bid.price;
                match levels.next_level(Side::Buy) {
                    Some(next) => bid = next,
                    None => break,
                }
            },
            Ordering::Equal => {
                levels.matched(bid.volume);
                result.volume += bid.volume;
                result.residual = 0;
                if bid.price == ask.price {
                    result.price = bid.price;
                    break;
                }

                let (last_bid, last_ask) = (bid.price, ask.price);
                let next_ask = levels
                    .next_level(Side::Sell)
                    .filter(|level| level.price <= best_bid);
                let next_bid = levels
                    .next_level(Side::Buy)
                    .filter(|level| level.price >= best_ask);

                match (next_bid, next_ask) {
                    (None, None) => {
                        result.price = settle_against_reference(last_ask, last_bid, reference_price);
                        break;
                    },
                    (None, Some(_)) => {
                        result.price = last_ask;
                        break;
                    },
                    (Some(_), None) => {
                        result.price = last_bid;
                        break;
                    },
                    (Some(next_bid), Some(next_ask)) if next_bid.price < next_ask.price => {
                        let (price, residual) =
                            settle_gap(last_bid, last_ask, next_bid, next_ask, reference_price);
                        result.price = price;
                        result.residual = residual;
                        break;
                    },
                    (Some(next_bid), Some(next_ask)) => {
                        bid = next_bid;
                        ask = next_ask;
                    },
                }
            },
        }

        debug!(
            price = result.price,
            volume = result.volume,
            residual = result.residual,
            bid_price = bid.price,
            ask_price = ask.price,
            "auction step"
        );

        if bid.price < ask.price {
            break;
        }
    }

    result
}

/// Canonical clearing search: maximises executable volume, minimises residual
/// and falls back to the reference price when several prices tie.
///
/// Reads the book without modifying any order; only the side cursors move.
#[derive(Debug, Default)]
pub struct PriceLevelCross;

impl PriceLevelCross {
    pub fn new() -> Self {
        Self
    }
}

impl ClearingAlgorithm for PriceLevelCross {
    fn clear(&self, book: &mut OrderBook, reference_price: Price) -> Clearing {
        let result = uncross(&mut BookLevels::new(book), reference_price);
        Clearing::price_only(result)
    }

    fn name(&self) -> &str {
        "PriceLevelCross"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderId};
    use std::sync::Arc;

    fn book_with(orders: &[(Side, Quantity, Price)]) -> OrderBook {
        let mut book = OrderBook::new(Arc::from("cu1906"));
        for (i, &(side, quantity, price)) in orders.iter().enumerate() {
            book.insert(Order::new(
                OrderId::new(i as u64 + 1),
                Arc::from("cu1906"),
                side,
                price,
                quantity,
            ));
        }
        book
    }

    fn clear(orders: &[(Side, Quantity, Price)], reference_price: Price) -> (Price, Quantity, Quantity) {
        let mut book = book_with(orders);
        PriceLevelCross::new()
            .clear(&mut book, reference_price)
            .result
            .as_tuple()
    }

    use Side::{Buy as B, Sell as S};

    #[test]
    fn test_empty_book() {
        assert_eq!(clear(&[], 40000), (0, 0, 0));
    }

    #[test]
    fn test_one_sided_book() {
        assert_eq!(clear(&[(B, 10, 100), (B, 5, 99)], 100), (0, 0, 0));
        assert_eq!(clear(&[(S, 10, 100)], 100), (0, 0, 0));
    }

    #[test]
    fn test_uncrossed_book() {
        assert_eq!(clear(&[(B, 10, 99), (S, 10, 100)], 100), (0, 0, 0));
    }

    #[test]
    fn test_single_price_equal_volume_terminates() {
        assert_eq!(clear(&[(B, 10, 100), (S, 10, 100)], 50), (100, 10, 0));
    }

    #[test]
    fn test_bid_heavier() {
        assert_eq!(clear(&[(B, 30, 105), (S, 10, 100)], 0), (100, 10, 20));
    }

    #[test]
    fn test_ask_heavier() {
        assert_eq!(clear(&[(B, 10, 105), (S, 30, 100)], 0), (105, 10, 20));
    }

    #[test]
    fn test_equal_exhaustion_uses_reference() {
        let orders = [(B, 10, 105), (S, 10, 100)];
        assert_eq!(clear(&orders, 102), (102, 10, 0));
        assert_eq!(clear(&orders, 90), (100, 10, 0));
        assert_eq!(clear(&orders, 110), (105, 10, 0));
        assert_eq!(clear(&orders, 100), (100, 10, 0));
        assert_eq!(clear(&orders, 105), (105, 10, 0));
    }

    #[test]
    fn test_equal_with_only_asks_left() {
        assert_eq!(
            clear(&[(B, 10, 105), (S, 10, 100), (S, 5, 104)], 0),
            (100, 10, 0)
        );
    }

    #[test]
    fn test_equal_with_only_bids_left() {
        assert_eq!(
            clear(&[(B, 10, 105), (B, 5, 101), (S, 10, 100)], 0),
            (105, 10, 0)
        );
    }

    #[test]
    fn test_equal_with_non_crossing_remainder() {
        // Any price in [102, 103] clears 10 leaving nothing over
        let orders = [(B, 10, 105), (B, 5, 101), (S, 10, 100), (S, 5, 104)];
        assert_eq!(clear(&orders, 0), (102, 10, 0));
        assert_eq!(clear(&orders, 110), (103, 10, 0));
        assert_eq!(clear(&orders, 103), (103, 10, 0));
    }

    #[test]
    fn test_equal_with_adjacent_remainder() {
        // 102 bid and 103 ask: every price leaves one of them unmatched
        let orders = [(B, 10, 105), (B, 5, 102), (S, 10, 100), (S, 8, 103)];
        assert_eq!(clear(&orders, 0), (102, 10, 5));

        let orders = [(B, 10, 105), (B, 9, 102), (S, 10, 100), (S, 8, 103)];
        assert_eq!(clear(&orders, 0), (103, 10, 8));

        let orders = [(B, 10, 105), (B, 5, 102), (S, 10, 100), (S, 5, 103)];
        assert_eq!(clear(&orders, 0), (102, 10, 5));
        assert_eq!(clear(&orders, 200), (103, 10, 5));
    }

    #[test]
    fn test_market_orders_do_not_set_price() {
        assert_eq!(clear(&[(B, 10, 0), (S, 10, 100)], 100), (0, 0, 0));
        assert_eq!(clear(&[(B, 10, 100), (S, 10, 0)], 100), (0, 0, 0));
    }

    #[test]
    fn test_cursor_state_does_not_change_result() {
        let orders = [(B, 30, 105), (B, 10, 104), (S, 10, 100), (S, 25, 103)];
        let mut book = book_with(&orders);

        let first = PriceLevelCross::new().clear(&mut book, 100).result;
        book.next(Side::Buy);
        let second = PriceLevelCross::new().clear(&mut book, 100).result;
        assert_eq!(first, second);
        assert_eq!(book.book_len(), (2, 2));
    }

    #[test]
    fn test_book_levels_aggregate() {
        let mut book = book_with(&[(S, 10, 43200), (S, 20, 43200), (S, 45, 43500)]);
        let mut levels = BookLevels::new(&mut book);

        assert_eq!(levels.next_level(Side::Sell), Some(PriceLevel::new(43200, 30)));
        assert_eq!(levels.next_level(Side::Sell), Some(PriceLevel::new(43500, 45)));
        assert_eq!(levels.next_level(Side::Sell), None);
        assert_eq!(levels.next_level(Side::Buy), None);
    }
}
