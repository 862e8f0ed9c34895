// ============================================================================
// Matching Algorithm Interfaces
// Contracts for continuous matching and call-auction clearing
// ============================================================================

use crate::domain::{Clearing, Fills, Order, OrderBook, Price};

/// Matches an incoming order against the opposite side of a book.
pub trait MatchingAlgorithm: Send + Sync {
    /// Executes `incoming` against resting orders and returns the fills in
    /// execution order. `incoming` is updated in place; resting orders that
    /// become fully filled are removed from the book.
    fn match_order(&self, incoming: &mut Order, book: &mut OrderBook) -> Fills;

    /// Get the algorithm name for logging
    fn name(&self) -> &str;

    /// Whether `incoming` may execute against `resting`.
    ///
    /// A market order (price 0) is marketable against any priced order but
    /// never against another market order.
    fn prices_cross(&self, incoming: &Order, resting: &Order) -> bool {
        if incoming.is_market() {
            return !resting.is_market();
        }
        resting.crosses(incoming.price)
    }
}

/// Searches a book for the call-auction clearing price.
pub trait ClearingAlgorithm: Send + Sync {
    /// Computes the clearing price, matched volume and residual.
    ///
    /// Both side cursors are moved. Destructive implementations also fill and
    /// remove orders and report what they executed in [`Clearing::fills`].
    fn clear(&self, book: &mut OrderBook, reference_price: Price) -> Clearing;

    fn name(&self) -> &str;

    /// Whether `clear` changes the book. The engine only runs such
    /// algorithms while the market permits an auction.
    fn is_destructive(&self) -> bool {
        false
    }
}
