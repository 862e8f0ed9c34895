// ============================================================================
// Matching Engine
// Order entry, market phases, auctions and the deal log
// ============================================================================

use super::price_time::fill_resting;
use super::{CrossFill, PriceLevelCross, PriceTimePriority};
use crate::domain::{
    AuctionResult, BookRegistry, BookSnapshot, Deal, EngineConfig, Fill, Fills, MarketState,
    MarketTransition, Order, OrderBook, OrderId, Price, Quantity, Side,
};
use crate::error::{ExchangeError, ExchangeResult, VerifyError};
use crate::interfaces::{ClearingAlgorithm, EventHandler, ExchangeEvent, MatchingAlgorithm};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Multi-symbol matching engine.
///
/// Orders collected before the market opens are crossed by a call auction;
/// once trading starts every incoming order is matched on arrival.
pub struct MatchingEngine {
    config: EngineConfig,

    state: MarketState,

    /// One order book per symbol
    books: BookRegistry,

    /// Symbol of every issued order id, at index `id - 1`
    order_symbols: Vec<Arc<str>>,

    /// Every execution, in order
    deals: Vec<Deal>,

    /// Continuous matching algorithm
    algorithm: Box<dyn MatchingAlgorithm>,

    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngine {
    /// Create a new matching engine with price/time continuous matching
    pub fn new(config: EngineConfig, event_handler: Arc<dyn EventHandler>) -> Self {
        Self::with_algorithm(config, Box::new(PriceTimePriority::new()), event_handler)
    }

    pub fn with_algorithm(
        config: EngineConfig,
        algorithm: Box<dyn MatchingAlgorithm>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            state: config.initial_state,
            config,
            books: BookRegistry::new(),
            order_symbols: Vec::new(),
            deals: Vec::new(),
            algorithm,
            event_handler,
        }
    }

    // ========================================================================
    // Order entry
    // ========================================================================

    /// Submits an order. A `price` of 0 is a market order.
    ///
    /// Returns the new order id, or `None` if the order was rejected because of
    /// the market state, exhausted id capacity, or a zero quantity.
    pub fn send_order(
        &mut self,
        symbol: &str,
        side: Side,
        quantity: Quantity,
        price: Price,
    ) -> Option<OrderId> {
        let mut events = Vec::new();

        if let Err(reason) = self.validate_order(symbol, quantity) {
            warn!(symbol, %side, quantity, price, %reason, "order rejected");
            events.push(ExchangeEvent::OrderRejected {
                symbol: symbol.to_string(),
                reason,
                timestamp: Utc::now(),
            });
            self.event_handler.on_events(events);
            return None;
        }

        let id = OrderId::new(self.order_symbols.len() as u64 + 1);
        let book = self.books.get_or_create(symbol);
        let shared_symbol = book.shared_symbol();
        let mut order = Order::new(id, Arc::clone(&shared_symbol), side, price, quantity);
        events.push(ExchangeEvent::OrderAccepted {
            order_id: id,
            symbol: symbol.to_string(),
            side,
            price,
            quantity,
            timestamp: Utc::now(),
        });

        let fills = if self.state.matches_continuously() {
            self.algorithm.match_order(&mut order, book)
        } else {
            Fills::new()
        };

        if order.is_filled() {
            book.archive(order);
        } else {
            let remaining = order.remaining();
            book.insert(order);
            events.push(ExchangeEvent::OrderRested {
                order_id: id,
                price,
                remaining,
                timestamp: Utc::now(),
            });
        }

        self.order_symbols.push(shared_symbol);
        self.record_fills(fills, &mut events);
        self.event_handler.on_events(events);

        Some(id)
    }

    /// Takes a resting order off its book.
    ///
    /// Cancelling an order that already left the book (filled or cancelled)
    /// succeeds without effect.
    pub fn cancel_order(&mut self, order_id: OrderId) -> ExchangeResult<()> {
        if !self.state.accepts_cancels() {
            return Err(ExchangeError::WrongState(self.state));
        }

        let symbol = self
            .symbol_of(order_id)
            .cloned()
            .ok_or(ExchangeError::NoSuchOrder(order_id.value()))?;

        let removed = self
            .books
            .get_mut(&symbol)
            .is_some_and(|book| book.remove(order_id));

        if removed {
            debug!(%order_id, symbol = %symbol, "order cancelled");
            self.event_handler.on_event(ExchangeEvent::OrderCancelled {
                order_id,
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Market phases
    // ========================================================================

    pub fn state(&self) -> MarketState {
        self.state
    }

    /// Freezes order entry while the opening auction is computed.
    pub fn open_call_auction(&mut self) -> ExchangeResult<()> {
        self.apply_transition(MarketTransition::OpenCallAuction)
    }

    /// Opens continuous trading.
    pub fn market_start(&mut self) -> ExchangeResult<()> {
        self.apply_transition(MarketTransition::StartTrading)
    }

    pub fn market_stop(&mut self) -> ExchangeResult<()> {
        self.apply_transition(MarketTransition::Stop)
    }

    fn apply_transition(&mut self, transition: MarketTransition) -> ExchangeResult<()> {
        let next = self.state.transition(transition)?;
        info!(from = %self.state, to = %next, "market state changed");
        self.event_handler.on_event(ExchangeEvent::MarketStateChanged {
            from: self.state,
            to: next,
            timestamp: Utc::now(),
        });
        self.state = next;
        Ok(())
    }

    // ========================================================================
    // Auctions
    // ========================================================================

    /// Computes the call-auction clearing price of `symbol` without executing
    /// anything. An unknown symbol or uncrossed book yields all zeros.
    pub fn call_auction(&mut self, symbol: &str, reference_price: Price) -> AuctionResult {
        self.run_clearing(symbol, &PriceLevelCross::new(), reference_price)
            .unwrap_or(AuctionResult::NONE)
    }

    /// Computes the clearing price, then executes it: bids at or above the
    /// price and asks at or below it are filled in priority order up to the
    /// matched volume.
    pub fn execute_auction(
        &mut self,
        symbol: &str,
        reference_price: Price,
    ) -> ExchangeResult<AuctionResult> {
        if !self.state.permits_auction() {
            return Err(ExchangeError::WrongState(self.state));
        }

        let result = self
            .run_clearing(symbol, &PriceLevelCross::new(), reference_price)
            .ok_or_else(|| ExchangeError::NoOrderBook(symbol.to_string()))?;
        if result.is_crossed() {
            self.match_continuous(symbol, result.price, result.volume, Side::Buy);
            self.match_continuous(symbol, result.price, result.volume, Side::Sell);
        }
        Ok(result)
    }

    /// Runs the order-by-order auction, which fills and removes orders as it
    /// searches. Every execution is recorded at the final clearing price.
    pub fn call_auction_fill(
        &mut self,
        symbol: &str,
        reference_price: Price,
    ) -> ExchangeResult<AuctionResult> {
        self.clear_with(symbol, &CrossFill::new(), reference_price)
    }

    /// Runs `algorithm` on the book of `symbol` and records any fills it
    /// reports. Algorithms that change the book are only accepted while the
    /// market permits an auction.
    pub fn clear_with(
        &mut self,
        symbol: &str,
        algorithm: &dyn ClearingAlgorithm,
        reference_price: Price,
    ) -> ExchangeResult<AuctionResult> {
        if algorithm.is_destructive() && !self.state.permits_auction() {
            return Err(ExchangeError::WrongState(self.state));
        }
        self.run_clearing(symbol, algorithm, reference_price)
            .ok_or_else(|| ExchangeError::NoOrderBook(symbol.to_string()))
    }

    fn run_clearing(
        &mut self,
        symbol: &str,
        algorithm: &dyn ClearingAlgorithm,
        reference_price: Price,
    ) -> Option<AuctionResult> {
        let book = self.books.get_mut(symbol)?;

        let (bids, asks) = book.book_len();
        info!(
            symbol,
            algorithm = algorithm.name(),
            reference_price,
            bids,
            asks,
            "call auction started"
        );
        let clearing = algorithm.clear(book, reference_price);
        let result = clearing.result;
        info!(
            symbol,
            price = result.price,
            volume = result.volume,
            residual = result.residual,
            "call auction finished"
        );

        let mut events = vec![ExchangeEvent::AuctionCleared {
            symbol: symbol.to_string(),
            result,
            timestamp: Utc::now(),
        }];
        self.record_fills(clearing.fills, &mut events);
        self.event_handler.on_events(events);

        Some(result)
    }

    /// Fills resting orders on `side` of `symbol` that are marketable at
    /// `price` until `volume` is used up.
    pub fn match_continuous(&mut self, symbol: &str, price: Price, volume: Quantity, side: Side) {
        let Some(book) = self.books.get_mut(symbol) else {
            return;
        };

        let fills = fill_resting(book, side, price, volume);
        let mut events = Vec::with_capacity(fills.len());
        self.record_fills(fills, &mut events);
        self.event_handler.on_events(events);
    }

    fn record_fills(&mut self, fills: impl IntoIterator<Item = Fill>, events: &mut Vec<ExchangeEvent>) {
        for fill in fills {
            let deal = Deal::new(self.deals.len() as u64 + 1, fill);
            if self.deals.len() < self.config.fill_log_limit {
                info!(
                    deal_no = deal.no,
                    order_id = %deal.order_id,
                    side = %deal.side,
                    price = deal.price,
                    volume = deal.volume,
                    "filled"
                );
            } else {
                trace!(
                    deal_no = deal.no,
                    order_id = %deal.order_id,
                    price = deal.price,
                    volume = deal.volume,
                    "filled"
                );
            }
            events.push(ExchangeEvent::DealReported {
                deal: deal.clone(),
                timestamp: deal.timestamp,
            });
            self.deals.push(deal);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Resting order counts `(bids, asks)`; `(0, 0)` for an unknown symbol.
    pub fn order_book_len(&self, symbol: &str) -> (usize, usize) {
        self.books
            .get(symbol)
            .map_or((0, 0), |book| book.book_len())
    }

    pub fn best_price(&self, symbol: &str, side: Side) -> Option<Price> {
        self.books.get(symbol)?.best_price(side)
    }

    pub fn book(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    pub fn snapshot(&self, symbol: &str, depth: usize) -> Option<BookSnapshot> {
        self.books.get(symbol).map(|book| book.snapshot(depth))
    }

    /// Order record by id, whether or not it is still resting.
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let symbol = self.symbol_of(order_id)?;
        self.books.get(symbol)?.order(order_id)
    }

    /// Number of order ids issued so far.
    pub fn order_count(&self) -> usize {
        self.order_symbols.len()
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    /// Deal by its 1-based number.
    pub fn deal(&self, no: u64) -> Option<&Deal> {
        let index = usize::try_from(no.checked_sub(1)?).ok()?;
        self.deals.get(index)
    }

    pub fn deal_count(&self) -> usize {
        self.deals.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn verify_order_book(&self, symbol: &str) -> Result<(), VerifyError> {
        self.books
            .get(symbol)
            .ok_or_else(|| VerifyError::NoOrderBook(symbol.to_string()))?
            .verify()
    }

    /// Destroys the book of `symbol`. Returns `false` if there was none.
    ///
    /// Order ids issued for the symbol stay issued; cancelling one afterwards
    /// is a no-op.
    pub fn cleanup(&mut self, symbol: &str) -> bool {
        let removed = self.books.cleanup(symbol);
        if removed {
            info!(symbol, "order book torn down");
            self.event_handler.on_event(ExchangeEvent::BookTornDown {
                symbol: symbol.to_string(),
                timestamp: Utc::now(),
            });
        }
        removed
    }

    /// Logs resting order counts per symbol.
    pub fn log_stats(&self) {
        let mut total = 0;
        for (symbol, book) in self.books.iter() {
            let (bids, asks) = book.book_len();
            total += bids + asks;
            info!(symbol, bids, asks, "order book");
        }
        info!(
            books = self.books.len(),
            resting = total,
            issued = self.order_symbols.len(),
            deals = self.deals.len(),
            "order stats"
        );
    }

    /// Logs every resting order of `symbol` in priority order.
    pub fn dump_order_book(&self, symbol: &str) {
        let Some(book) = self.books.get(symbol) else {
            info!(symbol, "no order book");
            return;
        };
        for side in [Side::Buy, Side::Sell] {
            for order in book.orders(side) {
                info!(symbol, %side, "{}", order);
            }
        }
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn symbol_of(&self, order_id: OrderId) -> Option<&Arc<str>> {
        let index = usize::try_from(order_id.value().checked_sub(1)?).ok()?;
        self.order_symbols.get(index)
    }

    fn validate_order(&self, symbol: &str, quantity: Quantity) -> Result<(), String> {
        if !self.state.accepts_orders() {
            return Err(format!("market is {}", self.state));
        }

        if self.order_symbols.len() as u64 >= self.config.max_orders {
            return Err(format!(
                "order id capacity {} exhausted",
                self.config.max_orders
            ));
        }

        if quantity == 0 {
            return Err("quantity must be positive".to_string());
        }

        if symbol.is_empty() {
            return Err("symbol must not be empty".to_string());
        }

        Ok(())
    }
}
