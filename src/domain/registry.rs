// ============================================================================
// Book Registry
// Symbol -> order book, created on first use
// ============================================================================

use super::OrderBook;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct BookRegistry {
    books: HashMap<Arc<str>, OrderBook>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut OrderBook> {
        self.books.get_mut(symbol)
    }

    /// Returns the book for `symbol`, creating an empty one if needed.
    pub fn get_or_create(&mut self, symbol: &str) -> &mut OrderBook {
        self.books
            .entry(Arc::from(symbol))
            .or_insert_with_key(|key| OrderBook::new(Arc::clone(key)))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol)
    }

    /// Tears down the book for `symbol`. Returns `false` if there was none.
    pub fn cleanup(&mut self, symbol: &str) -> bool {
        match self.books.remove(symbol) {
            Some(mut book) => {
                book.clear();
                true
            },
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OrderBook)> {
        self.books.iter().map(|(symbol, book)| (symbol.as_ref(), book))
    }
}
