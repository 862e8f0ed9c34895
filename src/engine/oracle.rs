// ============================================================================
// Reference Clearing Searches
// Slow, independent auction searches used to cross-check the real ones
// ============================================================================

use super::price_level_cross::{uncross, LevelSource};
use crate::domain::{AuctionResult, Clearing, OrderBook, Price, PriceLevel, Quantity, Side};
use crate::interfaces::ClearingAlgorithm;

use Side::{Buy as B, Sell as S};

/// `(side, quantity, price)` in submission order.
pub(crate) type Dataset = &'static [(Side, Quantity, Price)];

pub(crate) const ORDERS1: Dataset = &[
    (B, 10, 42000),
    (B, 20, 43000),
    (B, 30, 41000),
    (B, 50, 44000),
    (S, 10, 45000),
    (S, 20, 48000),
    (S, 30, 46000),
    (S, 45, 43500),
    (B, 25, 43900),
    (S, 10, 43200),
    (B, 15, 43800),
    (S, 20, 43200),
];

pub(crate) const ORDERS2: Dataset = &[
    (B, 20, 43000),
    (B, 50, 44000),
    (S, 10, 45000),
    (S, 45, 43500),
    (S, 10, 43200),
    (B, 25, 43900),
    (S, 20, 43200),
];

pub(crate) const ORDERS3: Dataset = &[
    (B, 20, 43000),
    (B, 50, 44000),
    (B, 15, 43900),
    (S, 10, 45000),
    (S, 45, 43500),
    (S, 10, 43200),
    (S, 20, 43200),
];

pub(crate) const ORDERS4: Dataset = &[
    (B, 20, 43000),
    (B, 50, 44000),
    (B, 20, 43900),
    (B, 30, 43900),
    (S, 10, 45000),
    (S, 40, 43500),
    (S, 10, 43200),
    (S, 20, 43200),
];

pub(crate) const ORDERS5: Dataset = &[
    (B, 20, 43000),
    (B, 50, 44000),
    (B, 20, 43900),
    (S, 10, 45000),
    (S, 15, 43500),
    (S, 40, 43500),
    (S, 10, 43200),
    (S, 20, 43200),
];

/// Datasets with their expected `(price, volume, residual)` at reference
/// prices 40000 and 50000.
pub(crate) const DATASETS: &[(Dataset, (Price, Quantity, Quantity), (Price, Quantity, Quantity))] = &[
    (ORDERS1, (43900, 75, 0), (43900, 75, 0)),
    (ORDERS2, (43500, 75, 0), (43900, 75, 0)),
    (ORDERS3, (43900, 65, 10), (43900, 65, 10)),
    (ORDERS4, (43500, 70, 30), (43500, 70, 30)),
    (ORDERS5, (43900, 70, 15), (43900, 70, 15)),
];

/// Volume of `side` marketable at `price`, plus the price of the first order
/// that is not (0 if every order is).
fn volume_at(book: &OrderBook, side: Side, price: Price) -> (Quantity, Price) {
    let mut volume = 0;
    for order in book.orders(side).filter(|o| !o.is_market()) {
        if !order.crosses(price) {
            return (volume, order.price);
        }
        volume += order.remaining();
    }
    (volume, 0)
}

/// Candidate-price scan: walks ask prices upwards while executable volume
/// grows, then bid prices downwards to settle ties on residual and the
/// reference price.
///
/// Always finds the same volume as the level search. The price can differ:
/// when the last ask level is lighter than the bid level it meets, the level
/// search trades at the ask price while this scan moves up to the bid price
/// with the smaller residual.
pub(crate) struct TwoPassScan;

impl ClearingAlgorithm for TwoPassScan {
    fn clear(&self, book: &mut OrderBook, reference_price: Price) -> Clearing {
        let best_bid = book.best_price(Side::Buy).filter(|p| *p != 0);
        let best_ask = book.best_price(Side::Sell).filter(|p| *p != 0);
        let (best_bid, best_ask) = match (best_bid, best_ask) {
            (Some(bid), Some(ask)) if bid >= ask => (bid, ask),
            _ => return Clearing::default(),
        };

        let mut max_volume = 0;
        let mut last = 0;
        let mut residual = 0;

        let mut price = best_ask;
        while price != 0 && price <= best_bid {
            let (bid_volume, _) = volume_at(book, Side::Buy, price);
            let (ask_volume, next) = volume_at(book, Side::Sell, price);
            let volume = bid_volume.min(ask_volume);
            if volume <= max_volume {
                break;
            }
            max_volume = volume;
            last = price;
            residual = bid_volume.abs_diff(ask_volume);
            price = next;
        }

        let floor = last;
        let mut price = best_bid;
        while price != 0 && price > floor {
            let (bid_volume, next) = volume_at(book, Side::Buy, price);
            let (ask_volume, _) = volume_at(book, Side::Sell, price);
            let volume = bid_volume.min(ask_volume);
            let left = bid_volume.abs_diff(ask_volume);

            if volume > max_volume {
                max_volume = volume;
                last = price;
                residual = left;
            } else if volume == max_volume {
                if left < residual {
                    residual = left;
                    last = price;
                } else if left == residual {
                    if bid_volume < ask_volume {
                        last = price;
                    } else if bid_volume == ask_volume && last < reference_price {
                        last = reference_price.min(price);
                    }
                }
            }
            price = next;
        }

        Clearing::price_only(AuctionResult::new(last, max_volume, residual))
    }

    fn name(&self) -> &str {
        "TwoPassScan"
    }
}

/// Materialised price levels of both sides.
struct QuoteLevels {
    bids: std::vec::IntoIter<PriceLevel>,
    asks: std::vec::IntoIter<PriceLevel>,
}

impl QuoteLevels {
    fn build(book: &OrderBook, side: Side) -> Vec<PriceLevel> {
        let mut levels: Vec<PriceLevel> = Vec::new();
        for order in book.orders(side).take_while(|o| !o.is_market()) {
            match levels.last_mut() {
                Some(level) if level.price == order.price => level.volume += order.remaining(),
                _ => levels.push(PriceLevel::new(order.price, order.remaining())),
            }
        }
        levels
    }

    fn new(book: &OrderBook) -> Self {
        Self {
            bids: Self::build(book, Side::Buy).into_iter(),
            asks: Self::build(book, Side::Sell).into_iter(),
        }
    }
}

impl LevelSource for QuoteLevels {
    fn next_level(&mut self, side: Side) -> Option<PriceLevel> {
        match side {
            Side::Buy => self.bids.next(),
            Side::Sell => self.asks.next(),
        }
    }
}

/// Level search over a copy of the book's levels; leaves the cursors alone.
pub(crate) struct QuoteLevelScan;

impl ClearingAlgorithm for QuoteLevelScan {
    fn clear(&self, book: &mut OrderBook, reference_price: Price) -> Clearing {
        Clearing::price_only(uncross(&mut QuoteLevels::new(book), reference_price))
    }

    fn name(&self) -> &str {
        "QuoteLevelScan"
    }
}

pub(crate) fn book_from(dataset: &[(Side, Quantity, Price)]) -> OrderBook {
    use crate::domain::{Order, OrderId};
    use std::sync::Arc;

    let symbol: Arc<str> = Arc::from("cu1906");
    let mut book = OrderBook::new(Arc::clone(&symbol));
    for (i, &(side, quantity, price)) in dataset.iter().enumerate() {
        book.insert(Order::new(
            OrderId::new(i as u64 + 1),
            Arc::clone(&symbol),
            side,
            price,
            quantity,
        ));
    }
    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CrossFill, PriceLevelCross};

    fn run(algorithm: &dyn ClearingAlgorithm, dataset: Dataset, reference_price: Price) -> (Price, Quantity, Quantity) {
        algorithm
            .clear(&mut book_from(dataset), reference_price)
            .result
            .as_tuple()
    }

    #[test]
    fn test_all_searches_agree_on_datasets() {
        let algorithms: [&dyn ClearingAlgorithm; 4] =
            [&PriceLevelCross, &CrossFill, &TwoPassScan, &QuoteLevelScan];

        for (n, &(dataset, at_40000, at_50000)) in DATASETS.iter().enumerate() {
            for algorithm in algorithms {
                assert_eq!(
                    run(algorithm, dataset, 40000),
                    at_40000,
                    "orders{} {} @40000",
                    n + 1,
                    algorithm.name()
                );
                assert_eq!(
                    run(algorithm, dataset, 50000),
                    at_50000,
                    "orders{} {} @50000",
                    n + 1,
                    algorithm.name()
                );
            }
        }
    }

    #[test]
    fn test_two_pass_scan_prices_at_lighter_residual() {
        let dataset: Dataset = &[(S, 1, 95), (B, 2, 96), (B, 4, 95)];

        assert_eq!(run(&TwoPassScan, dataset, 90), (96, 1, 1));
        assert_eq!(run(&PriceLevelCross, dataset, 90), (95, 1, 1));
        assert_eq!(run(&CrossFill, dataset, 90), (95, 1, 1));
        assert_eq!(run(&QuoteLevelScan, dataset, 90), (95, 1, 1));
    }

    #[test]
    fn test_volume_at() {
        let book = book_from(ORDERS2);
        assert_eq!(volume_at(&book, Side::Buy, 43500), (75, 43000));
        assert_eq!(volume_at(&book, Side::Sell, 43500), (75, 45000));
        assert_eq!(volume_at(&book, Side::Sell, 50000), (85, 0));
    }

    #[test]
    fn test_quote_levels() {
        let book = book_from(ORDERS4);
        assert_eq!(
            QuoteLevels::build(&book, Side::Buy),
            vec![
                PriceLevel::new(44000, 50),
                PriceLevel::new(43900, 50),
                PriceLevel::new(43000, 20),
            ]
        );
    }
}
