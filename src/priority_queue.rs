/*
Min-priority queue keyed by an orderable weight.

A thin wrapper over std's BinaryHeap (a max-heap) with the ordering of the
stored entries reversed, so the root is always an entry of least weight.
Push and pop are O(log n), len is O(1). Entries of equal weight come out in
no particular order.
*/

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An item together with a weight value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WeightedItem<T, D> {
    pub item: T,
    pub weight: D,
}

impl<T, D> WeightedItem<T, D> {
    pub fn new(item: T, weight: D) -> Self {
        Self { item, weight }
    }
}

// Only the weight participates in ordering; the item is opaque.
#[derive(Debug)]
struct Entry<T, D>(WeightedItem<T, D>);

impl<T, D: Ord> PartialEq for Entry<T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.0.weight == other.0.weight
    }
}

impl<T, D: Ord> Eq for Entry<T, D> {}

impl<T, D: Ord> Ord for Entry<T, D> {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse ordering for min-heap
        other.0.weight.cmp(&self.0.weight)
    }
}

impl<T, D: Ord> PartialOrd for Entry<T, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub struct PriQueue<T, D> {
    heap: BinaryHeap<Entry<T, D>>,
}

impl<T, D: Ord> Default for PriQueue<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: Ord> PriQueue<T, D> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Adds an item to the queue with a priority.
    pub fn push(&mut self, item: T, weight: D) {
        self.heap.push(Entry(WeightedItem::new(item, weight)));
    }

    /// Removes an item with the least weight and returns it with its weight.
    /// Returns `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<(T, D)> {
        self.heap.pop().map(|Entry(wi)| (wi.item, wi.weight))
    }

    /// The least weight currently queued, without removing anything.
    pub fn peek_weight(&self) -> Option<&D> {
        self.heap.peek().map(|entry| &entry.0.weight)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T, D: Ord> Extend<WeightedItem<T, D>> for PriQueue<T, D> {
    fn extend<I: IntoIterator<Item = WeightedItem<T, D>>>(&mut self, iter: I) {
        self.heap.extend(iter.into_iter().map(Entry));
    }
}

impl<T, D: Ord> FromIterator<WeightedItem<T, D>> for PriQueue<T, D> {
    fn from_iter<I: IntoIterator<Item = WeightedItem<T, D>>>(iter: I) -> Self {
        let mut pq = Self::new();
        pq.extend(iter);
        pq
    }
}
