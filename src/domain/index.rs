// ============================================================================
// Ordered Index
// Priority-ordered skip list of resting orders with a deletion-safe cursor
// ============================================================================

use crate::domain::order::{Order, OrderId, Price, Side};
use crossbeam_skiplist::SkipSet;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Bound;

// ============================================================================
// Side Priority
// ============================================================================

/// Price ordering of one book side. Ties on price always fall back to the
/// order id, ascending.
pub trait SidePriority: Send + Sync + 'static {
    const SIDE: Side;

    fn compare_price(a: Price, b: Price) -> Ordering;
}

/// Bids: higher price first. A zero (market) price is the lowest priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidPriority;

/// Asks: lower price first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskPriority;

impl SidePriority for BidPriority {
    const SIDE: Side = Side::Buy;

    fn compare_price(a: Price, b: Price) -> Ordering {
        match (a, b) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            _ => b.cmp(&a),
        }
    }
}

impl SidePriority for AskPriority {
    const SIDE: Side = Side::Sell;

    fn compare_price(a: Price, b: Price) -> Ordering {
        a.cmp(&b)
    }
}

// ============================================================================
// Priority Key
// ============================================================================

/// Skip list key: `(price, id)` ordered by the side's priority.
pub struct PriorityKey<P> {
    price: Price,
    id: OrderId,
    _priority: PhantomData<fn() -> P>,
}

impl<P: SidePriority> PriorityKey<P> {
    pub fn new(price: Price, id: OrderId) -> Self {
        Self {
            price,
            id,
            _priority: PhantomData,
        }
    }

    pub fn of(order: &Order) -> Self {
        Self::new(order.price, order.id)
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn id(&self) -> OrderId {
        self.id
    }
}

impl<P> Clone for PriorityKey<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PriorityKey<P> {}

impl<P> PartialEq for PriorityKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.price == other.price && self.id == other.id
    }
}

impl<P> Eq for PriorityKey<P> {}

impl<P: SidePriority> PartialOrd for PriorityKey<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: SidePriority> Ord for PriorityKey<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        P::compare_price(self.price, other.price).then_with(|| self.id.cmp(&other.id))
    }
}

impl<P> fmt::Debug for PriorityKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityKey")
            .field("price", &self.price)
            .field("id", &self.id)
            .finish()
    }
}

// ============================================================================
// Ordered Index
// ============================================================================

/// Sorted set of resting order keys for one book side.
pub struct OrderedIndex<P: SidePriority> {
    entries: SkipSet<PriorityKey<P>>,
}

impl<P: SidePriority> OrderedIndex<P> {
    pub fn new() -> Self {
        Self {
            entries: SkipSet::new(),
        }
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: PriorityKey<P>) -> bool {
        if self.entries.contains(&key) {
            return false;
        }
        self.entries.insert(key);
        true
    }

    pub fn find(&self, key: &PriorityKey<P>) -> Option<PriorityKey<P>> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    pub fn contains(&self, key: &PriorityKey<P>) -> bool {
        self.entries.contains(key)
    }

    /// Returns `false` if the key was not present.
    pub fn remove(&mut self, key: &PriorityKey<P>) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn first(&self) -> Option<PriorityKey<P>> {
        self.entries.front().map(|entry| *entry.value())
    }

    /// Smallest key strictly after `key`. `key` itself need not be present.
    pub fn successor(&self, key: &PriorityKey<P>) -> Option<PriorityKey<P>> {
        self.entries
            .lower_bound(Bound::Excluded(key))
            .map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries = SkipSet::new();
    }

    /// Keys in priority order.
    pub fn iter(&self) -> impl Iterator<Item = PriorityKey<P>> + '_ {
        self.entries.iter().map(|entry| *entry.value())
    }
}

impl<P: SidePriority> Default for OrderedIndex<P> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Position within an [`OrderedIndex`].
///
/// The cursor remembers the key it points at rather than a node, so removing
/// that key (through the cursor or directly on the index) never invalidates
/// it: `get` reports nothing and `next` moves on to the successor.
pub struct Cursor<P: SidePriority> {
    current: Option<PriorityKey<P>>,
}

impl<P: SidePriority> Cursor<P> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Rewinds to the highest-priority key.
    pub fn first(&mut self, index: &OrderedIndex<P>) -> Option<PriorityKey<P>> {
        self.current = index.first();
        self.current
    }

    /// The current key, if it is still present in `index`.
    pub fn get(&self, index: &OrderedIndex<P>) -> Option<PriorityKey<P>> {
        self.current.filter(|key| index.contains(key))
    }

    /// Advances to the successor. Stays exhausted once past the end.
    pub fn next(&mut self, index: &OrderedIndex<P>) -> Option<PriorityKey<P>> {
        let current = self.current?;
        self.current = index.successor(&current);
        self.current
    }

    /// Removes the current key and moves to its successor, which is returned.
    ///
    /// Does nothing when the current key is no longer in the index.
    pub fn remove_current(&mut self, index: &mut OrderedIndex<P>) -> Option<PriorityKey<P>> {
        let current = self.get(index)?;
        let successor = index.successor(&current);
        index.remove(&current);
        self.current = successor;
        successor
    }
}

impl<P: SidePriority> Default for Cursor<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(price: Price, id: u64) -> PriorityKey<BidPriority> {
        PriorityKey::new(price, OrderId::new(id))
    }

    fn ask(price: Price, id: u64) -> PriorityKey<AskPriority> {
        PriorityKey::new(price, OrderId::new(id))
    }

    fn ids<P: SidePriority>(index: &OrderedIndex<P>) -> Vec<u64> {
        index.iter().map(|key| key.id().value()).collect()
    }

    #[test]
    fn test_bid_order() {
        let mut index = OrderedIndex::new();
        index.insert(bid(42000, 1));
        index.insert(bid(43000, 2));
        index.insert(bid(0, 3));
        index.insert(bid(44000, 4));
        index.insert(bid(43000, 5));

        assert_eq!(ids(&index), vec![4, 2, 5, 1, 3]);
        assert_eq!(index.first().map(|k| k.price()), Some(44000));
    }

    #[test]
    fn test_ask_order() {
        let mut index = OrderedIndex::new();
        index.insert(ask(45000, 5));
        index.insert(ask(43200, 10));
        index.insert(ask(43500, 8));
        index.insert(ask(43200, 12));

        assert_eq!(ids(&index), vec![10, 12, 8, 5]);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut index = OrderedIndex::new();
        assert!(index.insert(ask(100, 1)));
        assert!(!index.insert(ask(100, 1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_find_and_remove() {
        let mut index = OrderedIndex::new();
        index.insert(bid(100, 1));
        index.insert(bid(101, 2));

        assert_eq!(index.find(&bid(100, 1)), Some(bid(100, 1)));
        assert!(index.remove(&bid(100, 1)));
        assert!(!index.remove(&bid(100, 1)));
        assert!(index.find(&bid(100, 1)).is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_cursor_walk() {
        let mut index = OrderedIndex::new();
        for (price, id) in [(101, 1), (100, 2), (102, 3)] {
            index.insert(ask(price, id));
        }

        let mut cursor = Cursor::new();
        assert!(cursor.get(&index).is_none());
        assert!(cursor.next(&index).is_none());

        assert_eq!(cursor.first(&index).map(|k| k.id().value()), Some(2));
        assert_eq!(cursor.next(&index).map(|k| k.id().value()), Some(1));
        assert_eq!(cursor.next(&index).map(|k| k.id().value()), Some(3));
        assert!(cursor.next(&index).is_none());
        assert!(cursor.next(&index).is_none());
        assert!(cursor.get(&index).is_none());
    }

    #[test]
    fn test_remove_during_scan() {
        let mut index = OrderedIndex::new();
        for id in 1..=6 {
            index.insert(ask(100 + id % 3, id));
        }
        let expected = ids(&index);

        let mut cursor = Cursor::new();
        let mut visited = Vec::new();
        let mut current = cursor.first(&index);
        while let Some(key) = current {
            visited.push(key.id().value());
            current = if key.id().value() % 2 == 0 {
                cursor.remove_current(&mut index)
            } else {
                cursor.next(&index)
            };
        }

        assert_eq!(visited, expected);
        let survivors: Vec<u64> = expected.iter().copied().filter(|id| id % 2 == 1).collect();
        assert_eq!(ids(&index), survivors);
    }

    #[test]
    fn test_external_remove_invalidates_get() {
        let mut index = OrderedIndex::new();
        index.insert(bid(105, 1));
        index.insert(bid(104, 2));
        index.insert(bid(103, 3));

        let mut cursor = Cursor::new();
        cursor.first(&index);
        cursor.next(&index);
        index.remove(&bid(104, 2));

        assert!(cursor.get(&index).is_none());
        assert!(cursor.remove_current(&mut index).is_none());
        assert_eq!(cursor.next(&index).map(|k| k.id().value()), Some(3));
    }

    #[test]
    fn test_remove_current_at_end() {
        let mut index = OrderedIndex::new();
        index.insert(bid(105, 1));

        let mut cursor = Cursor::new();
        cursor.first(&index);
        assert!(cursor.remove_current(&mut index).is_none());
        assert!(index.is_empty());
        assert!(cursor.get(&index).is_none());
    }
}
