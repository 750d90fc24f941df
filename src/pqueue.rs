use std::collections::{BTreeMap, VecDeque};

/// A bucketed priority queue with first-in first-out order inside a bucket.
/// Only non-empty buckets are kept, so priorities are unbounded.
pub struct PriorityQueue<T> {
    buckets: BTreeMap<u64, VecDeque<T>>,
    len: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, priority: u64, item: T) {
        self.buckets.entry(priority).or_default().push_back(item);
        self.len += 1;
    }

    pub fn pop_min(&mut self) -> Option<T> {
        let mut bucket = self.buckets.first_entry()?;
        let item = bucket.get_mut().pop_front();

        // Drop the bucket once drained
        if bucket.get().is_empty() {
            bucket.remove();
        }

        if item.is_some() {
            self.len -= 1;
        }
        item
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
